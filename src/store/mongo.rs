use mongodb::{
    bson::{doc, oid::ObjectId},
    options::{FindOptions, ReplaceOptions},
    Database,
};
use rocket::futures::TryStreamExt;

use crate::error::Result;
use crate::model::{
    db::{answer::SurveyAnswer, survey::Survey},
    mongodb::{Coll, Counter, OPTION_ID_COUNTER_ID, QUESTION_ID_COUNTER_ID},
};

use super::{SubmissionStore, SurveyStore};

/// Surveys stored one document per survey, questions and options embedded.
pub struct MongoSurveyStore {
    surveys: Coll<Survey>,
    counters: Coll<Counter>,
}

impl MongoSurveyStore {
    pub fn new(db: &Database) -> Self {
        Self {
            surveys: Coll::from_db(db),
            counters: Coll::from_db(db),
        }
    }
}

#[rocket::async_trait]
impl SurveyStore for MongoSurveyStore {
    async fn save(&self, mut survey: Survey) -> Result<Survey> {
        // Reserve IDs for anything new.
        let (new_questions, new_options) = survey.unassigned_ids();
        let question_ids =
            Counter::reserve(&self.counters, QUESTION_ID_COUNTER_ID, new_questions).await?;
        let option_ids = Counter::reserve(&self.counters, OPTION_ID_COUNTER_ID, new_options).await?;
        survey.assign_ids(question_ids, option_ids);

        let id = survey
            .id
            .get_or_insert_with(|| ObjectId::new().to_hex())
            .clone();

        // The whole aggregate is one document, so this write is atomic.
        let upsert = ReplaceOptions::builder().upsert(true).build();
        self.surveys
            .replace_one(doc! { "_id": &id }, &survey, upsert)
            .await?;
        debug!("Saved survey {id}");
        Ok(survey)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Survey>> {
        Ok(self.surveys.find_one(doc! { "_id": id }, None).await?)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let result = self.surveys.delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count == 1)
    }
}

/// Submissions stored one document per submission, entries embedded.
pub struct MongoSubmissionStore {
    submissions: Coll<SurveyAnswer>,
}

impl MongoSubmissionStore {
    pub fn new(db: &Database) -> Self {
        Self {
            submissions: Coll::from_db(db),
        }
    }
}

#[rocket::async_trait]
impl SubmissionStore for MongoSubmissionStore {
    async fn save(&self, mut submission: SurveyAnswer) -> Result<SurveyAnswer> {
        let id = submission
            .id
            .get_or_insert_with(|| ObjectId::new().to_hex())
            .clone();
        self.submissions.insert_one(&submission, None).await?;
        debug!("Saved submission {id} for survey {}", submission.survey_id);
        Ok(submission)
    }

    async fn find_all_by_survey_id(&self, survey_id: &str) -> Result<Vec<SurveyAnswer>> {
        let options = FindOptions::builder()
            .sort(doc! { "submitted_at": 1, "_id": 1 })
            .build();
        let submissions: Vec<SurveyAnswer> = self
            .submissions
            .find(doc! { "survey_id": survey_id }, options)
            .await?
            .try_collect()
            .await?;
        Ok(submissions)
    }

    async fn delete_all_by_survey_id(&self, survey_id: &str) -> Result<u64> {
        let result = self
            .submissions
            .delete_many(doc! { "survey_id": survey_id }, None)
            .await?;
        Ok(result.deleted_count)
    }
}
