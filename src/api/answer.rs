use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::api::{
        answer::{SearchSurveyAnswerRequest, SearchSurveyAnswerResponse, SubmitSurveyAnswer},
        response::ServiceResponse,
    },
    service,
    store::Stores,
};

pub fn routes() -> Vec<Route> {
    routes![submit_survey_answer, get_survey_answers]
}

/// Optional filters for the submission listing.
#[derive(Debug, Default, FromForm)]
struct AnswerFilter {
    #[field(name = "questionName")]
    question_name: Option<String>,
    answer: Option<String>,
}

#[post("/v1/survey/<survey_id>/answer", data = "<answers>", format = "json")]
async fn submit_survey_answer(
    survey_id: &str,
    answers: Json<Vec<SubmitSurveyAnswer>>,
    stores: &State<Stores>,
) -> Result<Json<ServiceResponse<()>>> {
    service::answer::submit_survey_answer(stores, survey_id, answers.0).await?;
    Ok(Json(ServiceResponse::empty()))
}

#[get("/v1/survey/<survey_id>/answer/all?<filter..>")]
async fn get_survey_answers(
    survey_id: &str,
    filter: AnswerFilter,
    stores: &State<Stores>,
) -> Result<Json<ServiceResponse<SearchSurveyAnswerResponse>>> {
    let request = SearchSurveyAnswerRequest {
        survey_id: survey_id.to_string(),
        question_name: filter.question_name,
        answer_value: filter.answer,
    };
    let answers = service::answer::get_survey_answers(stores, request).await?;
    Ok(Json(ServiceResponse::success(answers)))
}
