use crate::core::access::SurveyAccess;
use crate::core::forms::QuestionForm;
use crate::core::models::question::Insert as QuestionInsert;
use crate::core::ports::repository::{QuestionCommon, Store};
use crate::core::services::survey::load_survey;
use crate::error::Error;

pub async fn create_question<S>(store: &mut S, uid: i32, survey_id: i32, form: QuestionForm) -> Result<i32, Error>
where
    S: Store,
{
    load_survey(store, Some(uid), survey_id, SurveyAccess::Author).await?;
    let prompt = form.clean()?;
    let id = QuestionCommon::insert(store, QuestionInsert { survey_id, prompt }).await?;
    log::info!("user {} added question {} to survey {}", uid, id, survey_id);
    Ok(id)
}
