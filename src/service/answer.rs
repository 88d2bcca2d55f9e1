use crate::error::{Result, ServiceError};
use crate::model::{
    api::answer::{SearchSurveyAnswerRequest, SearchSurveyAnswerResponse, SubmitSurveyAnswer},
    common::survey::ItemType,
    db::{
        answer::{AnswerEntry, SurveyAnswer},
        survey::{Question, QuestionOption, Survey},
    },
};
use crate::service::survey::get_survey;
use crate::store::Stores;

/// Check every raw answer against the survey, turning them into entries.
///
/// Answers are checked in order and the first failure is returned. Within one
/// answer, the question is resolved first, then the required check, then the
/// cardinality check, and finally the option lookup.
pub fn validate_survey_answers(
    survey: &Survey,
    answers: &[SubmitSurveyAnswer],
) -> Result<Vec<AnswerEntry>, ServiceError> {
    answers
        .iter()
        .map(|answer| validate_answer(survey, answer))
        .collect()
}

fn validate_answer(survey: &Survey, answer: &SubmitSurveyAnswer) -> Result<AnswerEntry, ServiceError> {
    let question = survey
        .question(answer.question_id)
        .ok_or(ServiceError::InvalidQuestionId)?;
    let values = &answer.answer;

    match question.item_type {
        ItemType::SingleSelect | ItemType::MultiSelect => {
            if question.is_required() && values.is_empty() {
                return Err(ServiceError::RequiredAnswerMissing);
            }
            if question.item_type == ItemType::SingleSelect && values.len() > 1 {
                return Err(ServiceError::MultipleOptionsForSingleSelect);
            }
            let options = resolve_options(question, values)?;
            Ok(AnswerEntry::selected(question, &options, values.clone()))
        }
        ItemType::Text => {
            if question.is_required() && values.iter().all(|v| v.trim().is_empty()) {
                return Err(ServiceError::RequiredAnswerMissing);
            }
            Ok(AnswerEntry::text(question, values.clone()))
        }
    }
}

fn resolve_options<'q>(
    question: &'q Question,
    texts: &[String],
) -> Result<Vec<&'q QuestionOption>, ServiceError> {
    texts
        .iter()
        .map(|text| {
            question
                .option_by_text(text)
                .ok_or(ServiceError::InvalidQuestionOptionId)
        })
        .collect()
}

/// Validate and record one respondent's answers to a survey.
pub async fn submit_survey_answer(
    stores: &Stores,
    survey_id: &str,
    answers: Vec<SubmitSurveyAnswer>,
) -> Result<SurveyAnswer> {
    let survey = get_survey(stores, survey_id).await?;
    let entries = validate_survey_answers(&survey, &answers)?;

    let submission = stores
        .submissions
        .save(SurveyAnswer::new(&survey, entries))
        .await?;
    info!(
        "Recorded submission {} to survey {survey_id} with {} answers",
        submission.id.as_deref().unwrap_or_default(),
        submission.answers.len()
    );
    Ok(submission)
}

/// List the submissions of a survey, narrowed by the optional filters.
pub async fn get_survey_answers(
    stores: &Stores,
    request: SearchSurveyAnswerRequest,
) -> Result<SearchSurveyAnswerResponse> {
    let mut submissions = stores
        .submissions
        .find_all_by_survey_id(&request.survey_id)
        .await?;

    if let Some(name) = &request.question_name {
        submissions.retain(|s| s.has_question_named(name));
    }
    if let Some(value) = &request.answer_value {
        submissions.retain(|s| s.has_answer_value(value));
    }

    Ok(SearchSurveyAnswerResponse {
        survey_id: request.survey_id,
        answer_list: submissions.into_iter().map(Into::into).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::api::survey::{QuestionRequest, SurveyCreateRequest};
    use crate::service::survey::create_survey;

    fn answer(question_id: u64, values: &[&str]) -> SubmitSurveyAnswer {
        SubmitSurveyAnswer::new(question_id, values.iter().copied())
    }

    #[test]
    fn accepts_valid_answers() {
        let survey = Survey::example();
        let entries =
            validate_survey_answers(&survey, &[answer(1, &["Option 2"]), answer(2, &["hello"])])
                .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].question_id, 1);
        assert_eq!(entries[0].options.len(), 1);
        assert_eq!(entries[0].options[0].option_id, 2);
        assert_eq!(entries[0].values, vec!["Option 2"]);
        assert_eq!(entries[1].question_name, "Question 2");
        assert!(entries[1].options.is_empty());
        assert_eq!(entries[1].values, vec!["hello"]);
    }

    #[test]
    fn optional_questions_may_be_left_empty() {
        let survey = Survey::example();
        let entries = validate_survey_answers(&survey, &[answer(2, &[])]).unwrap();
        assert!(entries[0].values.is_empty());

        let other = Survey::other_example();
        let entries = validate_survey_answers(&other, &[answer(100, &[])]).unwrap();
        assert!(entries[0].options.is_empty());
    }

    #[test]
    fn multi_select_takes_several_options() {
        let survey = Survey::other_example();
        let entries = validate_survey_answers(&survey, &[answer(100, &["Red", "Blue"])]).unwrap();
        let ids: Vec<_> = entries[0].options.iter().map(|o| o.option_id).collect();
        assert_eq!(ids, vec![100, 102]);
    }

    #[test]
    fn rejects_question_from_another_survey() {
        let survey = Survey::example();
        let foreign = Survey::other_example().questions[0].id.unwrap();
        assert_eq!(
            validate_survey_answers(&survey, &[answer(foreign, &["Red"])]),
            Err(ServiceError::InvalidQuestionId)
        );
    }

    #[test]
    fn rejects_missing_required_answer() {
        let survey = Survey::example();
        assert_eq!(
            validate_survey_answers(&survey, &[answer(1, &[])]),
            Err(ServiceError::RequiredAnswerMissing)
        );
    }

    #[test]
    fn required_text_needs_a_non_blank_value() {
        let mut survey = Survey::example();
        survey.questions[1].required = crate::model::common::survey::ItemRequired::Required;

        assert_eq!(
            validate_survey_answers(&survey, &[answer(2, &["", "  "])]),
            Err(ServiceError::RequiredAnswerMissing)
        );
        assert!(validate_survey_answers(&survey, &[answer(2, &["", "ok"])]).is_ok());
    }

    #[test]
    fn rejects_several_options_for_single_select() {
        let survey = Survey::example();
        assert_eq!(
            validate_survey_answers(&survey, &[answer(1, &["Option 1", "Option 2"])]),
            Err(ServiceError::MultipleOptionsForSingleSelect)
        );
    }

    #[test]
    fn rejects_unknown_option() {
        let survey = Survey::example();
        assert_eq!(
            validate_survey_answers(&survey, &[answer(1, &["Red"])]),
            Err(ServiceError::InvalidQuestionOptionId)
        );
        // Matching is exact.
        assert_eq!(
            validate_survey_answers(&survey, &[answer(1, &["option 1"])]),
            Err(ServiceError::InvalidQuestionOptionId)
        );
    }

    #[test]
    fn first_failure_wins() {
        let survey = Survey::example();
        assert_eq!(
            validate_survey_answers(&survey, &[answer(1, &[]), answer(99, &["x"])]),
            Err(ServiceError::RequiredAnswerMissing)
        );
        assert_eq!(
            validate_survey_answers(&survey, &[answer(99, &["x"]), answer(1, &[])]),
            Err(ServiceError::InvalidQuestionId)
        );
        // Cardinality is checked before the options are resolved.
        assert_eq!(
            validate_survey_answers(&survey, &[answer(1, &["Red", "Blue"])]),
            Err(ServiceError::MultipleOptionsForSingleSelect)
        );
    }

    #[test]
    fn empty_submission_is_accepted() {
        assert_eq!(validate_survey_answers(&Survey::example(), &[]), Ok(vec![]));
    }

    /// Create the mixed survey and return its ID with the IDs of its two questions.
    async fn create_mixed(stores: &Stores) -> (String, u64, u64) {
        let created = create_survey(stores, SurveyCreateRequest::example_mixed())
            .await
            .unwrap();
        let survey = get_survey(stores, &created.survey_id).await.unwrap();
        (
            created.survey_id,
            survey.questions[0].id.unwrap(),
            survey.questions[1].id.unwrap(),
        )
    }

    #[backend_test]
    async fn submit_and_query(stores: Stores) {
        let (survey_id, q1, q2) = create_mixed(&stores).await;

        let submission = submit_survey_answer(
            &stores,
            &survey_id,
            vec![answer(q1, &["Option 2"]), answer(q2, &["hello"])],
        )
        .await
        .unwrap();
        assert!(submission.id.is_some());
        assert_eq!(submission.survey_id, survey_id);

        let all = get_survey_answers(&stores, SearchSurveyAnswerRequest::new(survey_id.clone()))
            .await
            .unwrap();
        assert_eq!(all.survey_id, survey_id);
        assert_eq!(all.answer_list.len(), 1);
        let rows = &all.answer_list[0].answers;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].question_name, "Question 1");
        assert_eq!(rows[0].option_text.as_deref(), Some("Option 2"));
        assert_eq!(rows[0].answer, "Option 2");
        assert_eq!(rows[1].question_name, "Question 2");
        assert_eq!(rows[1].option_text, None);
        assert_eq!(rows[1].answer, "hello");

        let by_first_question = get_survey_answers(
            &stores,
            SearchSurveyAnswerRequest {
                question_name: Some("Question 1".to_string()),
                ..SearchSurveyAnswerRequest::new(survey_id.clone())
            },
        )
        .await
        .unwrap();
        assert_eq!(by_first_question.answer_list, all.answer_list);

        let by_name = get_survey_answers(
            &stores,
            SearchSurveyAnswerRequest {
                question_name: Some("Question 2".to_string()),
                ..SearchSurveyAnswerRequest::new(survey_id.clone())
            },
        )
        .await
        .unwrap();
        assert_eq!(by_name.answer_list.len(), 1);

        let by_other_answer = get_survey_answers(
            &stores,
            SearchSurveyAnswerRequest {
                answer_value: Some("Option 1".to_string()),
                ..SearchSurveyAnswerRequest::new(survey_id)
            },
        )
        .await
        .unwrap();
        assert!(by_other_answer.answer_list.is_empty());
    }

    async fn count(stores: &Stores, request: SearchSurveyAnswerRequest) -> usize {
        get_survey_answers(stores, request)
            .await
            .unwrap()
            .answer_list
            .len()
    }

    #[backend_test]
    async fn filters_combine(stores: Stores) {
        let (survey_id, q1, q2) = create_mixed(&stores).await;
        for (option, text) in [("Option 1", "a"), ("Option 2", "b"), ("Option 1", "b")] {
            submit_survey_answer(
                &stores,
                &survey_id,
                vec![answer(q1, &[option]), answer(q2, &[text])],
            )
            .await
            .unwrap();
        }
        // Answers only the required question.
        submit_survey_answer(&stores, &survey_id, vec![answer(q1, &["Option 1"])])
            .await
            .unwrap();

        let search = |name: Option<&str>, value: Option<&str>| SearchSurveyAnswerRequest {
            survey_id: survey_id.clone(),
            question_name: name.map(str::to_string),
            answer_value: value.map(str::to_string),
        };

        assert_eq!(count(&stores, search(None, None)).await, 4);
        assert_eq!(count(&stores, search(Some("Question 1"), None)).await, 4);
        assert_eq!(count(&stores, search(Some("Question 2"), None)).await, 3);
        assert_eq!(count(&stores, search(None, Some("Option 1"))).await, 3);
        assert_eq!(count(&stores, search(Some("Question 2"), Some("Option 1"))).await, 2);
        assert_eq!(count(&stores, search(Some("Question 2"), Some("b"))).await, 2);
        assert_eq!(count(&stores, search(Some("Nope"), None)).await, 0);
    }

    #[backend_test]
    async fn rejected_submission_is_not_stored(stores: Stores) {
        let (survey_id, q1, q2) = create_mixed(&stores).await;

        let err = submit_survey_answer(
            &stores,
            &survey_id,
            vec![answer(q2, &["fine"]), answer(q1, &["Option 1", "Option 2"])],
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.as_service(),
            Some(ServiceError::MultipleOptionsForSingleSelect)
        );

        let all = get_survey_answers(&stores, SearchSurveyAnswerRequest::new(survey_id))
            .await
            .unwrap();
        assert!(all.answer_list.is_empty());
    }

    #[backend_test]
    async fn submit_to_unknown_survey(stores: Stores) {
        // Fails on the survey even though the answers are nonsense too.
        let err = submit_survey_answer(&stores, "missing", vec![answer(99, &["x"])])
            .await
            .unwrap_err();
        assert_eq!(err.as_service(), Some(ServiceError::SurveyNotFound));
    }

    #[backend_test]
    async fn question_ids_are_scoped_to_their_survey(stores: Stores) {
        let (first_id, q1, _) = create_mixed(&stores).await;
        let second = create_survey(
            &stores,
            SurveyCreateRequest {
                questions: Some(vec![QuestionRequest::example_multi()]),
                ..SurveyCreateRequest::example()
            },
        )
        .await
        .unwrap();

        let err = submit_survey_answer(&stores, &second.survey_id, vec![answer(q1, &["Option 1"])])
            .await
            .unwrap_err();
        assert_eq!(err.as_service(), Some(ServiceError::InvalidQuestionId));

        assert!(submit_survey_answer(&stores, &first_id, vec![answer(q1, &["Option 1"])])
            .await
            .is_ok());
    }

    #[backend_test]
    async fn old_question_ids_stop_working_after_update(stores: Stores) {
        let (survey_id, q1, _) = create_mixed(&stores).await;
        crate::service::survey::update_survey(
            &stores,
            crate::model::api::survey::SurveyUpdateRequest {
                id: survey_id.clone(),
                name: "Survey 1".to_string(),
                description: String::new(),
                questions: Some(vec![QuestionRequest::example_single()]),
            },
        )
        .await
        .unwrap();

        let err = submit_survey_answer(&stores, &survey_id, vec![answer(q1, &["Option 1"])])
            .await
            .unwrap_err();
        assert_eq!(err.as_service(), Some(ServiceError::InvalidQuestionId));

        let survey = get_survey(&stores, &survey_id).await.unwrap();
        let new_q1 = survey.questions[0].id.unwrap();
        assert_ne!(new_q1, q1);
        assert!(submit_survey_answer(&stores, &survey_id, vec![answer(new_q1, &["Option 1"])])
            .await
            .is_ok());
    }
}
