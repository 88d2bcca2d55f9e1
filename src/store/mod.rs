//! Persistence of the survey and submission aggregates.
//!
//! The rest of the crate only talks to the [`SurveyStore`] and
//! [`SubmissionStore`] traits, so the MongoDB backend can be swapped for the
//! in-memory one (in tests, or via configuration).

use std::sync::Arc;

use mongodb::Database;

use crate::error::Result;
use crate::model::db::{answer::SurveyAnswer, survey::Survey};

mod memory;
mod mongo;

pub use memory::{MemorySubmissionStore, MemorySurveyStore};
pub use mongo::{MongoSubmissionStore, MongoSurveyStore};

#[rocket::async_trait]
pub trait SurveyStore: Send + Sync {
    /// Insert or fully replace a survey, assigning IDs to the survey and any
    /// question or option that lacks one. Returns the survey as stored.
    async fn save(&self, survey: Survey) -> Result<Survey>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Survey>>;

    /// Returns whether a survey was deleted.
    async fn delete_by_id(&self, id: &str) -> Result<bool>;
}

#[rocket::async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Insert a new submission with all its entries, assigning its ID.
    async fn save(&self, submission: SurveyAnswer) -> Result<SurveyAnswer>;

    /// All submissions of the given survey, oldest first.
    async fn find_all_by_survey_id(&self, survey_id: &str) -> Result<Vec<SurveyAnswer>>;

    /// Returns the number of submissions deleted.
    async fn delete_all_by_survey_id(&self, survey_id: &str) -> Result<u64>;
}

/// The stores backing the service, held in managed state.
#[derive(Clone)]
pub struct Stores {
    pub surveys: Arc<dyn SurveyStore>,
    pub submissions: Arc<dyn SubmissionStore>,
}

impl Stores {
    /// Stores backed by the given MongoDB database.
    pub fn mongo(db: &Database) -> Self {
        Self {
            surveys: Arc::new(MongoSurveyStore::new(db)),
            submissions: Arc::new(MongoSubmissionStore::new(db)),
        }
    }

    /// Fresh, empty stores held in process memory.
    pub fn in_memory() -> Self {
        Self {
            surveys: Arc::new(MemorySurveyStore::default()),
            submissions: Arc::new(MemorySubmissionStore::default()),
        }
    }
}
