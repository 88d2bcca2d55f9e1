use mongodb::error::Error as DbError;
use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Request,
};
use thiserror::Error;

use crate::model::api::response::ServiceResponse;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Code reported for any failure outside the domain taxonomy.
pub const INTERNAL_ERROR_CODE: &str = "9001";

/// Domain failures. Every variant is caller-visible and never transient.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("The survey creation request is invalid.")]
    InvalidRequest,
    #[error("A survey must have at least 1 and at most 10 questions.")]
    InsufficientQuestions,
    #[error("Select questions need at least one option, and options cannot be blank.")]
    InsufficientOptions,
    #[error("The requested survey could not be found.")]
    SurveyNotFound,
    #[error("The answered question does not belong to this survey.")]
    InvalidQuestionId,
    #[error("The selected option does not belong to the answered question.")]
    InvalidQuestionOptionId,
    #[error("A required question was left unanswered.")]
    RequiredAnswerMissing,
    #[error("A single-select question can only take one option.")]
    MultipleOptionsForSingleSelect,
}

impl ServiceError {
    /// Stable code that callers may branch on.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "1001",
            Self::InsufficientQuestions => "1002",
            Self::InsufficientOptions => "1003",
            Self::SurveyNotFound => "2001",
            Self::InvalidQuestionId => "3001",
            Self::InvalidQuestionOptionId => "3002",
            Self::RequiredAnswerMissing => "3003",
            Self::MultipleOptionsForSingleSelect => "3004",
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::SurveyNotFound => Status::NotFound,
            _ => Status::BadRequest,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The domain error, if this is one.
    pub fn as_service(&self) -> Option<ServiceError> {
        match self {
            Self::Service(err) => Some(*err),
            _ => None,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let (status, body) = match self {
            Self::Service(err) => {
                debug!("Rejected {} {}: {err}", req.method(), req.uri());
                (
                    err.status(),
                    ServiceResponse::<()>::fail(err.code(), err.to_string()),
                )
            }
            Self::Db(_) | Self::Internal(_) => {
                error!("Failed {} {}: {self}", req.method(), req.uri());
                (
                    Status::InternalServerError,
                    ServiceResponse::<()>::fail(
                        INTERNAL_ERROR_CODE,
                        "Oops! We encountered an unexpected error on our end.".to_string(),
                    ),
                )
            }
        };
        (status, Json(body)).respond_to(req)
    }
}
