use serde::{Deserialize, Serialize};

/// Our survey IDs are hex strings of MongoDB object IDs.
pub type SurveyId = String;
/// Our question IDs are integers.
pub type QuestionId = u64;
/// Our option IDs are integers.
pub type OptionId = u64;
/// Our submission IDs are hex strings of MongoDB object IDs.
pub type SubmissionId = String;

/// The maximum number of questions a survey may hold.
pub const MAX_QUESTIONS: usize = 10;

/// The shape of answer a question accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    /// Exactly one of the question's options.
    SingleSelect,
    /// Any number of the question's options.
    MultiSelect,
    /// Free text.
    Text,
}

impl ItemType {
    /// Whether answers to this question are chosen from its options.
    pub fn is_select(self) -> bool {
        match self {
            Self::SingleSelect | Self::MultiSelect => true,
            Self::Text => false,
        }
    }
}

/// Whether a question demands a non-empty answer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemRequired {
    Required,
    Optional,
}
