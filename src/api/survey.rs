use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::api::{
        response::ServiceResponse,
        survey::{
            SurveyCreateRequest, SurveyCreateResponse, SurveyDescription, SurveyUpdateRequest,
            SurveyUpdateResponse,
        },
    },
    service,
    store::Stores,
};

pub fn routes() -> Vec<Route> {
    routes![create_survey, update_survey, get_survey, delete_survey]
}

#[post("/v1/survey", data = "<request>", format = "json")]
async fn create_survey(
    request: Json<SurveyCreateRequest>,
    stores: &State<Stores>,
) -> Result<Json<ServiceResponse<SurveyCreateResponse>>> {
    let created = service::survey::create_survey(stores, request.0).await?;
    Ok(Json(ServiceResponse::success(created)))
}

#[put("/v1/survey", data = "<request>", format = "json")]
async fn update_survey(
    request: Json<SurveyUpdateRequest>,
    stores: &State<Stores>,
) -> Result<Json<ServiceResponse<SurveyUpdateResponse>>> {
    let updated = service::survey::update_survey(stores, request.0).await?;
    Ok(Json(ServiceResponse::success(updated)))
}

#[get("/v1/survey/<survey_id>")]
async fn get_survey(
    survey_id: &str,
    stores: &State<Stores>,
) -> Result<Json<ServiceResponse<SurveyDescription>>> {
    let survey = service::survey::get_survey(stores, survey_id).await?;
    Ok(Json(ServiceResponse::success(survey.into())))
}

#[delete("/v1/survey/<survey_id>")]
async fn delete_survey(
    survey_id: &str,
    stores: &State<Stores>,
) -> Result<Json<ServiceResponse<()>>> {
    service::survey::delete_survey(stores, survey_id).await?;
    Ok(Json(ServiceResponse::empty()))
}
