use crate::core::forms::{AnswerFormSet, FormSetInput};
use crate::core::models::survey::Survey;
use crate::core::ports::repository::Manager;
use crate::core::services::submission;
use crate::error::Error;
use crate::response::CreateResponse;
use actix_web::http::header;
use actix_web::web::{Data, Json, Path};
use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;

pub async fn start_page<M: Manager>(survey_id: Path<(i32,)>, manager: Data<M>) -> Result<Json<Survey>, Error> {
    let mut store = manager.db().await?;
    let survey = submission::respondable_survey(&mut store, survey_id.into_inner().0).await?;
    Ok(Json(survey))
}

/// Opens a submission and points the respondent at its formset.
pub async fn start<M: Manager>(survey_id: Path<(i32,)>, req: HttpRequest, manager: Data<M>) -> Result<HttpResponse, Error> {
    let survey_id = survey_id.into_inner().0;
    let mut store = manager.db().await?;
    let submission = submission::start_submission(&mut store, survey_id).await?;
    let location = req.url_for("submission", [survey_id.to_string(), submission.id.to_string()])?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location.to_string()))
        .json(CreateResponse { id: submission.id }))
}

#[derive(Debug, Serialize)]
pub struct FormSetPage {
    pub survey: Survey,
    pub formset: AnswerFormSet,
}

pub async fn formset<M: Manager>(path: Path<(i32, i32)>, manager: Data<M>) -> Result<Json<FormSetPage>, Error> {
    let (survey_id, submission_id) = path.into_inner();
    let mut store = manager.db().await?;
    let (survey, formset) = submission::answer_formset(&mut store, survey_id, submission_id).await?;
    Ok(Json(FormSetPage { survey, formset }))
}

pub async fn submit<M: Manager>(path: Path<(i32, i32)>, Json(input): Json<FormSetInput>, req: HttpRequest, manager: Data<M>) -> Result<HttpResponse, Error> {
    let (survey_id, submission_id) = path.into_inner();
    let tx = manager.tx().await?;
    submission::submit_answers(tx, survey_id, submission_id, input).await?;
    let thanks = req.url_for("survey-thanks", [survey_id.to_string()])?;
    Ok(HttpResponse::SeeOther().insert_header((header::LOCATION, thanks.to_string())).finish())
}

pub async fn thanks<M: Manager>(survey_id: Path<(i32,)>, manager: Data<M>) -> Result<Json<Survey>, Error> {
    let mut store = manager.db().await?;
    let survey = submission::respondable_survey(&mut store, survey_id.into_inner().0).await?;
    Ok(Json(survey))
}
