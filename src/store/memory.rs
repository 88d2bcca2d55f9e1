use std::collections::HashMap;
use std::sync::Mutex;

use mongodb::bson::oid::ObjectId;

use crate::error::Result;
use crate::model::{
    common::survey::{OptionId, QuestionId, SurveyId},
    db::{answer::SurveyAnswer, survey::Survey},
};

use super::{SubmissionStore, SurveyStore};

#[derive(Debug)]
struct SurveyState {
    surveys: HashMap<SurveyId, Survey>,
    next_question_id: QuestionId,
    next_option_id: OptionId,
}

impl Default for SurveyState {
    fn default() -> Self {
        Self {
            surveys: HashMap::new(),
            next_question_id: 1,
            next_option_id: 1,
        }
    }
}

/// Surveys held in process memory.
#[derive(Debug, Default)]
pub struct MemorySurveyStore(Mutex<SurveyState>);

// The locks below are never held across an `.await`, and a poisoned lock means
// another request panicked mid-write; propagating the panic is the only option.
#[rocket::async_trait]
impl SurveyStore for MemorySurveyStore {
    async fn save(&self, mut survey: Survey) -> Result<Survey> {
        let mut state = self.0.lock().unwrap();

        let (new_questions, new_options) = survey.unassigned_ids();
        let first_question = state.next_question_id;
        let first_option = state.next_option_id;
        state.next_question_id += new_questions as QuestionId;
        state.next_option_id += new_options as OptionId;
        survey.assign_ids(first_question.., first_option..);

        let id = survey
            .id
            .get_or_insert_with(|| ObjectId::new().to_hex())
            .clone();
        state.surveys.insert(id, survey.clone());
        Ok(survey)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Survey>> {
        Ok(self.0.lock().unwrap().surveys.get(id).cloned())
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        Ok(self.0.lock().unwrap().surveys.remove(id).is_some())
    }
}

/// Submissions held in process memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemorySubmissionStore(Mutex<Vec<SurveyAnswer>>);

#[rocket::async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn save(&self, mut submission: SurveyAnswer) -> Result<SurveyAnswer> {
        submission
            .id
            .get_or_insert_with(|| ObjectId::new().to_hex());
        self.0.lock().unwrap().push(submission.clone());
        Ok(submission)
    }

    async fn find_all_by_survey_id(&self, survey_id: &str) -> Result<Vec<SurveyAnswer>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.survey_id == survey_id)
            .cloned()
            .collect())
    }

    async fn delete_all_by_survey_id(&self, survey_id: &str) -> Result<u64> {
        let mut submissions = self.0.lock().unwrap();
        let before = submissions.len();
        submissions.retain(|s| s.survey_id != survey_id);
        Ok((before - submissions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::db::{
        answer::AnswerEntry,
        survey::{Question, QuestionOption},
    };

    fn unsaved_survey() -> Survey {
        let mut survey = Survey::example();
        survey.id = None;
        for question in survey.questions.iter_mut() {
            question.id = None;
            question.options.iter_mut().for_each(|o| o.id = None);
        }
        survey
    }

    #[rocket::async_test]
    async fn save_assigns_ids() {
        let store = MemorySurveyStore::default();
        let saved = store.save(unsaved_survey()).await.unwrap();

        let id = saved.id.clone().unwrap();
        assert!(!id.trim().is_empty());
        assert_eq!(saved.questions[0].id, Some(1));
        assert_eq!(saved.questions[1].id, Some(2));
        let options: Vec<_> = saved.questions[0].options.iter().map(|o| o.id).collect();
        assert_eq!(options, vec![Some(1), Some(2)]);

        assert_eq!(store.find_by_id(&id).await.unwrap(), Some(saved));
        assert_eq!(store.find_by_id("missing").await.unwrap(), None);
    }

    #[rocket::async_test]
    async fn ids_are_never_reused() {
        let store = MemorySurveyStore::default();
        let first = store.save(unsaved_survey()).await.unwrap();
        let second = store.save(unsaved_survey()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(second.questions[0].id, Some(3));
        assert_eq!(second.questions[0].options[0].id, Some(3));
    }

    #[rocket::async_test]
    async fn resave_replaces() {
        let store = MemorySurveyStore::default();
        let saved = store.save(unsaved_survey()).await.unwrap();
        let id = saved.id.clone().unwrap();

        let mut question = Question::example2();
        question.options.push(QuestionOption::new("ignored"));
        let replaced = saved.replace(
            "Renamed".to_string(),
            String::new(),
            vec![question],
            chrono::Utc::now(),
        );
        let resaved = store.save(replaced).await.unwrap();

        assert_eq!(resaved.id.as_deref(), Some(id.as_str()));
        assert_eq!(resaved.questions.len(), 1);
        assert_eq!(resaved.questions[0].id, Some(3));
        let stored = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Renamed");
        assert!(stored.question(1).is_none());

        assert!(store.delete_by_id(&id).await.unwrap());
        assert!(!store.delete_by_id(&id).await.unwrap());
    }

    #[rocket::async_test]
    async fn submissions_by_survey() {
        let store = MemorySubmissionStore::default();
        let survey = Survey::example();
        let other = Survey::other_example();
        let entry = AnswerEntry::text(&survey.questions[1], vec!["text".to_string()]);

        let saved = store
            .save(SurveyAnswer::new(&survey, vec![entry.clone()]))
            .await
            .unwrap();
        store.save(SurveyAnswer::new(&survey, vec![entry])).await.unwrap();
        store.save(SurveyAnswer::new(&other, vec![])).await.unwrap();
        assert!(saved.id.is_some());

        let survey_id = survey.id.unwrap();
        let found = store.find_all_by_survey_id(&survey_id).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], saved);

        assert_eq!(store.delete_all_by_survey_id(&survey_id).await.unwrap(), 2);
        assert!(store.find_all_by_survey_id(&survey_id).await.unwrap().is_empty());
        assert_eq!(
            store
                .find_all_by_survey_id(&other.id.unwrap())
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
