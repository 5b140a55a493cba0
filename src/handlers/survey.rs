use crate::context::UserInfo;
use crate::core::forms::SurveyForm;
use crate::core::models::survey::Survey;
use crate::core::ports::repository::Manager;
use crate::core::services::survey::{self, SurveyResults, SurveyStructure};
use crate::error::Error;
use crate::request::Pagination;
use crate::response::{CreateResponse, List};
use actix_web::web::{Data, Json, Path, Query};
use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;

pub async fn list<M: Manager>(user_info: UserInfo, Query(pagination): Query<Pagination>, manager: Data<M>) -> Result<Json<List<Survey>>, Error> {
    let mut store = manager.db().await?;
    let (surveys, total) = survey::list_surveys(&mut store, user_info.id, (&pagination).into()).await?;
    Ok(Json(List::new(surveys, total)))
}

pub async fn create<M: Manager>(user_info: UserInfo, Json(form): Json<SurveyForm>, manager: Data<M>) -> Result<Json<CreateResponse>, Error> {
    let mut store = manager.db().await?;
    let id = survey::create_survey(&mut store, user_info.id, form).await?;
    Ok(Json(CreateResponse { id }))
}

/// Results page of a published survey.
#[derive(Debug, Serialize)]
pub struct Detail {
    #[serde(flatten)]
    pub results: SurveyResults,
    pub public_url: String,
}

pub async fn detail<M: Manager>(user_info: UserInfo, id: Path<(i32,)>, req: HttpRequest, manager: Data<M>) -> Result<Json<Detail>, Error> {
    let id = id.into_inner().0;
    let mut store = manager.db().await?;
    let results = survey::survey_results(&mut store, user_info.id, id).await?;
    let public_url = req.url_for("survey-start", [id.to_string()])?.to_string();
    Ok(Json(Detail { results, public_url }))
}

pub async fn edit<M: Manager>(user_info: UserInfo, id: Path<(i32,)>, manager: Data<M>) -> Result<Json<SurveyStructure>, Error> {
    let mut store = manager.db().await?;
    let structure = survey::edit_survey(&mut store, user_info.id, id.into_inner().0).await?;
    Ok(Json(structure))
}

pub async fn update<M: Manager>(user_info: UserInfo, id: Path<(i32,)>, Json(form): Json<SurveyForm>, manager: Data<M>) -> Result<HttpResponse, Error> {
    let mut store = manager.db().await?;
    survey::update_survey(&mut store, user_info.id, id.into_inner().0, form).await?;
    Ok(HttpResponse::Ok().finish())
}

pub async fn activate<M: Manager>(user_info: UserInfo, id: Path<(i32,)>, manager: Data<M>) -> Result<HttpResponse, Error> {
    let mut store = manager.db().await?;
    survey::activate_survey(&mut store, user_info.id, id.into_inner().0).await?;
    Ok(HttpResponse::Ok().finish())
}

pub async fn delete<M: Manager>(user_info: UserInfo, id: Path<(i32,)>, manager: Data<M>) -> Result<HttpResponse, Error> {
    let mut store = manager.db().await?;
    survey::delete_survey(&mut store, user_info.id, id.into_inner().0).await?;
    Ok(HttpResponse::Ok().finish())
}
