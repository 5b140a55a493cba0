use crate::context::UserInfo;
use crate::core::forms::QuestionForm;
use crate::core::ports::repository::Manager;
use crate::core::services::question;
use crate::error::Error;
use crate::response::CreateResponse;
use actix_web::web::{Data, Json, Path};

pub async fn create<M: Manager>(user_info: UserInfo, survey_id: Path<(i32,)>, Json(form): Json<QuestionForm>, manager: Data<M>) -> Result<Json<CreateResponse>, Error> {
    let mut store = manager.db().await?;
    let id = question::create_question(&mut store, user_info.id, survey_id.into_inner().0, form).await?;
    Ok(Json(CreateResponse { id }))
}
