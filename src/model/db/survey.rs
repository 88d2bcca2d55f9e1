use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::common::survey::{ItemRequired, ItemType, OptionId, QuestionId, SurveyId};

/// A survey, as stored in the database.
///
/// The survey owns its questions, which own their options; the whole
/// aggregate is always written and replaced as a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    /// Unique ID, assigned on first save.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<SurveyId>,
    /// Survey name.
    pub name: String,
    /// Survey description.
    pub description: String,
    /// Questions, in the order they are presented to respondents.
    pub questions: Vec<Question>,
    /// Creation time.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    /// Time of the last update; equal to `created_at` until the first update.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Survey {
    /// Create a new, unsaved survey.
    pub fn new(
        name: String,
        description: String,
        questions: Vec<Question>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            name,
            description,
            questions,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace everything but the identity and creation time of this survey.
    ///
    /// The new questions carry no IDs, so saving the result assigns fresh ones
    /// and the previous questions and options become unreachable.
    pub fn replace(
        self,
        name: String,
        description: String,
        questions: Vec<Question>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: self.id,
            name,
            description,
            questions,
            created_at: self.created_at,
            updated_at: now,
        }
    }

    /// Get the question with the given ID, if it belongs to this survey.
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == Some(id))
    }

    /// Count the questions and options that have not been assigned an ID yet.
    pub fn unassigned_ids(&self) -> (usize, usize) {
        let questions = self.questions.iter().filter(|q| q.id.is_none()).count();
        let options = self
            .questions
            .iter()
            .flat_map(|q| q.options.iter())
            .filter(|o| o.id.is_none())
            .count();
        (questions, options)
    }

    /// Assign IDs to every question and option that lacks one, drawing from
    /// the given sources in order.
    ///
    /// Panics if either source runs dry; callers size them with [`Self::unassigned_ids`].
    pub fn assign_ids(
        &mut self,
        mut question_ids: impl Iterator<Item = QuestionId>,
        mut option_ids: impl Iterator<Item = OptionId>,
    ) {
        for question in self.questions.iter_mut() {
            if question.id.is_none() {
                question.id = Some(question_ids.next().expect("enough question IDs"));
            }
            for option in question.options.iter_mut() {
                if option.id.is_none() {
                    option.id = Some(option_ids.next().expect("enough option IDs"));
                }
            }
        }
    }
}

/// A single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique ID, assigned on save.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<QuestionId>,
    /// Question text.
    pub item_name: String,
    /// Longer explanation shown alongside the question.
    pub item_description: String,
    /// What shape of answer the question accepts.
    pub item_type: ItemType,
    /// Whether an answer must be given.
    pub required: ItemRequired,
    /// Possible answers, for select questions.
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn is_required(&self) -> bool {
        self.required == ItemRequired::Required
    }

    /// Get the option with exactly the given text.
    pub fn option_by_text(&self, text: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.text == text)
    }
}

/// One selectable answer to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Unique ID, assigned on save.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<OptionId>,
    /// Option text.
    pub text: String,
}

impl QuestionOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
        }
    }
}
