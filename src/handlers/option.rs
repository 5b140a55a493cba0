use crate::context::UserInfo;
use crate::core::forms::OptionForm;
use crate::core::models::question::QuestionWithOptions;
use crate::core::ports::repository::Manager;
use crate::core::services::option;
use crate::error::Error;
use actix_web::web::{Data, Json, Path};
use serde::Serialize;

pub async fn list<M: Manager>(user_info: UserInfo, path: Path<(i32, i32)>, manager: Data<M>) -> Result<Json<QuestionWithOptions>, Error> {
    let (survey_id, question_id) = path.into_inner();
    let mut store = manager.db().await?;
    let question = option::options_of_question(&mut store, user_info.id, survey_id, question_id).await?;
    Ok(Json(question))
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i32,
    pub question: QuestionWithOptions,
}

pub async fn create<M: Manager>(user_info: UserInfo, path: Path<(i32, i32)>, Json(form): Json<OptionForm>, manager: Data<M>) -> Result<Json<Created>, Error> {
    let (survey_id, question_id) = path.into_inner();
    let mut store = manager.db().await?;
    let (id, question) = option::create_option(&mut store, user_info.id, survey_id, question_id, form).await?;
    Ok(Json(Created { id, question }))
}
