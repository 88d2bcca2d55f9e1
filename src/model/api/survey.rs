use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::survey::{ItemRequired, ItemType, OptionId, QuestionId, SurveyId},
    db::survey::{Question, QuestionOption, Survey},
};

/// A request to create a new survey.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyCreateRequest {
    /// Survey name.
    pub name: String,
    /// Survey description.
    #[serde(default)]
    pub description: String,
    /// Question specifications; absent or `null` is rejected.
    pub questions: Option<Vec<QuestionRequest>>,
}

/// A request to replace the contents of an existing survey.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyUpdateRequest {
    /// The survey to replace.
    pub id: SurveyId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub questions: Option<Vec<QuestionRequest>>,
}

/// A question specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    /// Question text.
    pub question: String,
    /// Longer explanation shown alongside the question.
    #[serde(default)]
    pub description: String,
    /// What shape of answer the question accepts.
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Whether an answer must be given.
    pub required: ItemRequired,
    /// Possible answers, for select questions.
    #[serde(default)]
    pub options: Option<Vec<OptionRequest>>,
}

/// An option specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionRequest {
    /// Option text.
    pub option: String,
}

impl From<QuestionRequest> for Question {
    fn from(request: QuestionRequest) -> Self {
        Self {
            id: None,
            item_name: request.question,
            item_description: request.description,
            item_type: request.item_type,
            required: request.required,
            options: request
                .options
                .unwrap_or_default()
                .into_iter()
                .map(|o| QuestionOption::new(o.option))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyCreateResponse {
    pub survey_id: SurveyId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyUpdateResponse {
    pub survey_id: SurveyId,
    pub updated_at: DateTime<Utc>,
}

/// An API-friendly survey description, exposing the IDs respondents answer with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDescription {
    pub id: SurveyId,
    pub name: String,
    pub description: String,
    pub questions: Vec<QuestionDescription>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDescription {
    pub id: QuestionId,
    pub question: String,
    pub description: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub required: ItemRequired,
    pub options: Vec<OptionDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDescription {
    pub id: OptionId,
    pub option: String,
}

// The `expect`s below hold because descriptions are only built from surveys
// returned by a store, which assigns every ID.
impl From<Survey> for SurveyDescription {
    fn from(survey: Survey) -> Self {
        Self {
            id: survey.id.expect("saved survey has an ID"),
            name: survey.name,
            description: survey.description,
            questions: survey.questions.into_iter().map(Into::into).collect(),
            created_at: survey.created_at,
            updated_at: survey.updated_at,
        }
    }
}

impl From<Question> for QuestionDescription {
    fn from(question: Question) -> Self {
        Self {
            id: question.id.expect("saved question has an ID"),
            question: question.item_name,
            description: question.item_description,
            item_type: question.item_type,
            required: question.required,
            options: question
                .options
                .into_iter()
                .map(|o| OptionDescription {
                    id: o.id.expect("saved option has an ID"),
                    option: o.text,
                })
                .collect(),
        }
    }
}
