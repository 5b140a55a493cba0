use crate::core::access::SurveyAccess;
use crate::core::forms::OptionForm;
use crate::core::models::{
    option::{Insert as OptionInsert, Query as OptionQuery},
    question::{Question, QuestionWithOptions},
};
use crate::core::ports::repository::{OptionCommon, QuestionCommon, Store};
use crate::core::services::survey::load_survey;
use crate::error::Error;

/// The question must belong to a survey the caller is still authoring.
async fn authored_question<S>(store: &mut S, uid: i32, survey_id: i32, question_id: i32) -> Result<Question, Error>
where
    S: Store,
{
    load_survey(store, Some(uid), survey_id, SurveyAccess::Author).await?;
    match QuestionCommon::get(store, question_id).await? {
        Some(question) if question.survey_id == survey_id => Ok(question),
        _ => Err(Error::NotFound),
    }
}

pub async fn options_of_question<S>(store: &mut S, uid: i32, survey_id: i32, question_id: i32) -> Result<QuestionWithOptions, Error>
where
    S: Store,
{
    let question = authored_question(store, uid, survey_id, question_id).await?;
    let options = OptionCommon::query(
        store,
        OptionQuery {
            question_id_eq: Some(question_id),
            ..default::default()
        },
    )
    .await?;
    Ok(QuestionWithOptions { question, options })
}

pub async fn create_option<S>(store: &mut S, uid: i32, survey_id: i32, question_id: i32, form: OptionForm) -> Result<(i32, QuestionWithOptions), Error>
where
    S: Store,
{
    authored_question(store, uid, survey_id, question_id).await?;
    let text = form.clean()?;
    let id = OptionCommon::insert(store, OptionInsert { question_id, text }).await?;
    let question = options_of_question(store, uid, survey_id, question_id).await?;
    Ok((id, question))
}
