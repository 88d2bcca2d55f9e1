use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{
    common::survey::{ItemType, OptionId, QuestionId, SubmissionId, SurveyId},
    db::survey::{Question, QuestionOption, Survey},
};

/// One respondent's complete set of answers to a survey, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAnswer {
    /// Unique ID, assigned on save.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<SubmissionId>,
    /// Foreign Key survey ID.
    pub survey_id: SurveyId,
    /// Submission time.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub submitted_at: DateTime<Utc>,
    /// One entry per submitted answer, in submission order.
    pub answers: Vec<AnswerEntry>,
}

impl SurveyAnswer {
    /// Bundle already-validated entries into a new, unsaved submission for the given survey.
    ///
    /// Panics if the survey has never been saved.
    pub fn new(survey: &Survey, answers: Vec<AnswerEntry>) -> Self {
        Self {
            id: None,
            survey_id: survey.id.clone().expect("survey has been saved"),
            submitted_at: Utc::now(),
            answers,
        }
    }

    /// Whether any entry answers a question with exactly this name.
    pub fn has_question_named(&self, name: &str) -> bool {
        self.answers.iter().any(|entry| entry.question_name == name)
    }

    /// Whether any entry carries exactly this answer value.
    pub fn has_answer_value(&self, value: &str) -> bool {
        self.answers
            .iter()
            .any(|entry| entry.values.iter().any(|v| v == value))
    }
}

/// A single answer within a submission.
///
/// The question name and option texts are copied from the survey at
/// submission time, so the entry stays readable after the survey's questions
/// are replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    /// The answered question.
    pub question_id: QuestionId,
    /// Question text at submission time.
    pub question_name: String,
    /// Question type at submission time.
    pub item_type: ItemType,
    /// Matched options; empty for text questions.
    pub options: Vec<SelectedOption>,
    /// The literal submitted values.
    pub values: Vec<String>,
}

impl AnswerEntry {
    /// An entry for a select question.
    pub fn selected(question: &Question, options: &[&QuestionOption], values: Vec<String>) -> Self {
        Self {
            options: options.iter().copied().map(SelectedOption::from).collect(),
            ..Self::text(question, values)
        }
    }

    /// An entry for a text question.
    pub fn text(question: &Question, values: Vec<String>) -> Self {
        Self {
            question_id: question.id.expect("question has been saved"),
            question_name: question.item_name.clone(),
            item_type: question.item_type,
            options: Vec::new(),
            values,
        }
    }
}

/// A reference to a chosen option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub option_id: OptionId,
    pub text: String,
}

impl From<&QuestionOption> for SelectedOption {
    fn from(option: &QuestionOption) -> Self {
        Self {
            option_id: option.id.expect("option has been saved"),
            text: option.text.clone(),
        }
    }
}
