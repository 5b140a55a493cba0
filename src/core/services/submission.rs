use crate::core::access::SurveyAccess;
use crate::core::forms::{AnswerFormSet, FormSetInput};
use crate::core::models::{
    answer::Insert as AnswerInsert,
    option::Query as OptionQuery,
    question::Query as QuestionQuery,
    submission::Submission,
    survey::Survey,
};
use crate::core::ports::repository::{AnswerCommon, OptionCommon, QuestionCommon, Store, SubmissionCommon, TxStore};
use crate::core::services::survey::load_survey;
use crate::error::Error;

/// Every question must be answered.
const ANSWERS_REQUIRED: bool = true;

pub async fn respondable_survey<S>(store: &mut S, survey_id: i32) -> Result<Survey, Error>
where
    S: Store,
{
    load_survey(store, None, survey_id, SurveyAccess::Respond).await
}

pub async fn start_submission<S>(store: &mut S, survey_id: i32) -> Result<Submission, Error>
where
    S: Store,
{
    respondable_survey(store, survey_id).await?;
    let submission = SubmissionCommon::insert(store, survey_id).await?;
    log::info!("submission {} started for survey {}", submission.id, survey_id);
    Ok(submission)
}

async fn build_formset<S>(store: &mut S, survey_id: i32) -> Result<AnswerFormSet, Error>
where
    S: Store,
{
    let questions = QuestionCommon::query(
        store,
        QuestionQuery {
            survey_id_eq: Some(survey_id),
        },
    )
    .await?;
    let options = OptionCommon::query(
        store,
        OptionQuery {
            survey_id_eq: Some(survey_id),
            ..default::default()
        },
    )
    .await?;
    Ok(AnswerFormSet::for_survey(&questions, options, ANSWERS_REQUIRED))
}

pub async fn answer_formset<S>(store: &mut S, survey_id: i32, submission_id: i32) -> Result<(Survey, AnswerFormSet), Error>
where
    S: Store,
{
    let survey = respondable_survey(store, survey_id).await?;
    if SubmissionCommon::get_incomplete(store, survey_id, submission_id).await?.is_none() {
        return Err(Error::NotFound);
    }
    let formset = build_formset(store, survey_id).await?;
    Ok((survey, formset))
}

/// Records one answer per question and completes the submission, all in the
/// given transaction. Nothing is written unless every form is valid.
pub async fn submit_answers<T>(mut tx: T, survey_id: i32, submission_id: i32, input: FormSetInput) -> Result<(), Error>
where
    T: TxStore,
{
    respondable_survey(&mut tx, survey_id).await?;
    if SubmissionCommon::get_incomplete_for_update(&mut tx, survey_id, submission_id).await?.is_none() {
        return Err(Error::NotFound);
    }
    let formset = build_formset(&mut tx, survey_id).await?;
    let cleaned = match formset.bind(&input) {
        Ok(cleaned) => cleaned,
        Err(formset) => {
            tx.rollback().await?;
            return Err(formset.into_error());
        }
    };
    let num_answers = cleaned.len();
    AnswerCommon::bulk_insert(
        &mut tx,
        cleaned
            .into_iter()
            .map(|a| AnswerInsert {
                submission_id,
                question_id: a.question_id,
                option_id: a.option_id,
            })
            .collect(),
    )
    .await?;
    if !SubmissionCommon::complete(&mut tx, submission_id).await? {
        tx.rollback().await?;
        return Err(Error::NotFound);
    }
    tx.commit().await?;
    log::info!("submission {} of survey {} completed with {} answers", submission_id, survey_id, num_answers);
    Ok(())
}
