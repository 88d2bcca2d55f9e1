use chrono::Utc;

use crate::error::{Error, Result, ServiceError};
use crate::model::{
    api::survey::{
        QuestionRequest, SurveyCreateRequest, SurveyCreateResponse, SurveyUpdateRequest,
        SurveyUpdateResponse,
    },
    common::survey::MAX_QUESTIONS,
    db::survey::{Question, Survey},
};
use crate::store::Stores;

/// Check the structural invariants of a survey's question list.
pub fn validate_questions(questions: Option<&[QuestionRequest]>) -> Result<(), ServiceError> {
    let questions = questions.ok_or(ServiceError::InvalidRequest)?;
    if questions.is_empty() || questions.len() > MAX_QUESTIONS {
        return Err(ServiceError::InsufficientQuestions);
    }

    for question in questions {
        let options = question.options.as_deref().unwrap_or_default();
        if question.item_type.is_select() && options.is_empty() {
            return Err(ServiceError::InsufficientOptions);
        }
        if options.iter().any(|o| o.option.trim().is_empty()) {
            return Err(ServiceError::InsufficientOptions);
        }
    }

    Ok(())
}

/// Validate the request and convert its questions into unsaved model questions.
fn into_questions(questions: Option<Vec<QuestionRequest>>) -> Result<Vec<Question>, ServiceError> {
    validate_questions(questions.as_deref())?;
    Ok(questions
        .unwrap_or_default()
        .into_iter()
        .map(Question::from)
        .collect())
}

pub async fn create_survey(
    stores: &Stores,
    request: SurveyCreateRequest,
) -> Result<SurveyCreateResponse> {
    let questions = into_questions(request.questions)?;
    let survey = Survey::new(request.name, request.description, questions, Utc::now());
    let survey = stores.surveys.save(survey).await?;

    let survey_id = survey
        .id
        .ok_or_else(|| Error::Internal("Store returned a survey without an ID".to_string()))?;
    info!("Created survey {survey_id} with {} questions", survey.questions.len());
    Ok(SurveyCreateResponse {
        survey_id,
        created_at: survey.created_at,
    })
}

/// Replace the name, description and entire question set of a survey.
pub async fn update_survey(
    stores: &Stores,
    request: SurveyUpdateRequest,
) -> Result<SurveyUpdateResponse> {
    let questions = into_questions(request.questions)?;
    let existing = get_survey(stores, &request.id).await?;

    let survey = existing.replace(request.name, request.description, questions, Utc::now());
    let survey = stores.surveys.save(survey).await?;

    info!("Replaced survey {} with {} questions", request.id, survey.questions.len());
    Ok(SurveyUpdateResponse {
        survey_id: request.id,
        updated_at: survey.updated_at,
    })
}

pub async fn get_survey(stores: &Stores, id: &str) -> Result<Survey> {
    Ok(stores
        .surveys
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::SurveyNotFound)?)
}

/// Delete a survey along with every submission made to it.
pub async fn delete_survey(stores: &Stores, id: &str) -> Result<()> {
    // Remove the survey first so no new submissions can target it.
    if !stores.surveys.delete_by_id(id).await? {
        return Err(ServiceError::SurveyNotFound.into());
    }
    let deleted = stores.submissions.delete_all_by_survey_id(id).await?;
    info!("Deleted survey {id} and {deleted} submissions");
    Ok(())
}
