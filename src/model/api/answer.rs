use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::survey::{QuestionId, SubmissionId, SurveyId},
    db::answer::SurveyAnswer,
};

/// One answer as submitted by a respondent.
///
/// For select questions, each value names an option by its text; for text
/// questions, the values are the free-text answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSurveyAnswer {
    pub question_id: QuestionId,
    #[serde(default)]
    pub answer: Vec<String>,
}

impl SubmitSurveyAnswer {
    pub fn new<S: Into<String>>(question_id: QuestionId, answer: impl IntoIterator<Item = S>) -> Self {
        Self {
            question_id,
            answer: answer.into_iter().map(Into::into).collect(),
        }
    }
}

/// A query over the submissions of a survey.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSurveyAnswerRequest {
    pub survey_id: SurveyId,
    /// Keep only submissions answering a question with exactly this name.
    pub question_name: Option<String>,
    /// Keep only submissions containing exactly this answer value.
    pub answer_value: Option<String>,
}

impl SearchSurveyAnswerRequest {
    pub fn new(survey_id: SurveyId) -> Self {
        Self {
            survey_id,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSurveyAnswerResponse {
    pub survey_id: SurveyId,
    pub answer_list: Vec<SubmissionDescription>,
}

/// An API-friendly view of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDescription {
    pub id: SubmissionId,
    pub submitted_at: DateTime<Utc>,
    /// One row per answer value.
    pub answers: Vec<AnswerDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDescription {
    pub question_name: String,
    /// The matched option, for select questions.
    pub option_text: Option<String>,
    pub answer: String,
}

impl From<SurveyAnswer> for SubmissionDescription {
    fn from(submission: SurveyAnswer) -> Self {
        let mut answers = Vec::new();
        for entry in submission.answers {
            if entry.item_type.is_select() {
                answers.extend(entry.options.into_iter().map(|option| AnswerDescription {
                    question_name: entry.question_name.clone(),
                    option_text: Some(option.text.clone()),
                    answer: option.text,
                }));
            } else {
                answers.extend(entry.values.into_iter().map(|value| AnswerDescription {
                    question_name: entry.question_name.clone(),
                    option_text: None,
                    answer: value,
                }));
            }
        }

        Self {
            // Valid because only stored submissions are described.
            id: submission.id.expect("saved submission has an ID"),
            submitted_at: submission.submitted_at,
            answers,
        }
    }
}
