use crate::core::access::SurveyAccess;
use crate::core::forms::SurveyForm;
use crate::core::models::{
    common::Pagination,
    option::Query as OptionQuery,
    question::{Query as QuestionQuery, Question, QuestionWithOptions},
    submission::Query as SubmissionQuery,
    survey::{Insert as SurveyInsert, Query as SurveyQuery, Survey, Update as SurveyUpdate},
};
use crate::core::ports::repository::{AnswerCommon, OptionCommon, QuestionCommon, Store, SubmissionCommon, SurveyCommon};
use crate::core::results::{tally, QuestionResult};
use crate::error::Error;
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Serialize)]
pub struct SurveyStructure {
    pub survey: Survey,
    pub questions: Vec<QuestionWithOptions>,
}

#[derive(Debug, Serialize)]
pub struct SurveyResults {
    pub survey: Survey,
    pub questions: Vec<QuestionResult>,
    pub num_submissions: i64,
}

pub async fn load_survey<S>(store: &mut S, uid: Option<i32>, id: i32, access: SurveyAccess) -> Result<Survey, Error>
where
    S: Store,
{
    let survey = SurveyCommon::get(store, id).await?;
    access.check(survey, uid)
}

pub async fn create_survey<S>(store: &mut S, uid: i32, form: SurveyForm) -> Result<i32, Error>
where
    S: Store,
{
    let title = form.clean()?;
    let id = SurveyCommon::insert(store, SurveyInsert { title, creator_id: uid }).await?;
    log::info!("user {} created survey {}", uid, id);
    Ok(id)
}

pub async fn list_surveys<S>(store: &mut S, uid: i32, pagination: Pagination) -> Result<(Vec<Survey>, i64), Error>
where
    S: Store,
{
    let query = SurveyQuery { creator_id_eq: Some(uid) };
    let total = SurveyCommon::count(store, &query).await?;
    let surveys = SurveyCommon::query(store, &query, Some(pagination)).await?;
    Ok((surveys, total))
}

async fn questions_with_options<S>(store: &mut S, survey_id: i32) -> Result<Vec<QuestionWithOptions>, Error>
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
    let mut by_question: HashMap<i32, Vec<_>> = options.into_iter().into_group_map_by(|o| o.question_id);
    Ok(questions
        .into_iter()
        .map(|question| QuestionWithOptions {
            options: by_question.remove(&question.id).unwrap_or_default(),
            question,
        })
        .collect())
}

pub async fn edit_survey<S>(store: &mut S, uid: i32, id: i32) -> Result<SurveyStructure, Error>
where
    S: Store,
{
    let survey = load_survey(store, Some(uid), id, SurveyAccess::Author).await?;
    let questions = questions_with_options(store, id).await?;
    Ok(SurveyStructure { survey, questions })
}

pub async fn update_survey<S>(store: &mut S, uid: i32, id: i32, form: SurveyForm) -> Result<(), Error>
where
    S: Store,
{
    load_survey(store, Some(uid), id, SurveyAccess::Author).await?;
    let title = form.clean()?;
    SurveyCommon::update(store, id, SurveyUpdate { title }).await?;
    Ok(())
}

pub async fn activate_survey<S>(store: &mut S, uid: i32, id: i32) -> Result<(), Error>
where
    S: Store,
{
    load_survey(store, Some(uid), id, SurveyAccess::Author).await?;
    SurveyCommon::activate(store, id).await?;
    log::info!("user {} activated survey {}", uid, id);
    Ok(())
}

pub async fn delete_survey<S>(store: &mut S, uid: i32, id: i32) -> Result<(), Error>
where
    S: Store,
{
    load_survey(store, Some(uid), id, SurveyAccess::Manage).await?;
    SurveyCommon::delete(store, id).await?;
    log::info!("user {} deleted survey {}", uid, id);
    Ok(())
}

pub async fn survey_results<S>(store: &mut S, uid: i32, id: i32) -> Result<SurveyResults, Error>
where
    S: Store,
{
    let survey = load_survey(store, Some(uid), id, SurveyAccess::ViewResults).await?;
    let questions: Vec<Question> = QuestionCommon::query(store, QuestionQuery { survey_id_eq: Some(id) }).await?;
    let options = OptionCommon::query(
        store,
        OptionQuery {
            survey_id_eq: Some(id),
            ..default::default()
        },
    )
    .await?;
    let counts = AnswerCommon::count_by_option(store, id).await?;
    let num_submissions = SubmissionCommon::count(
        store,
        SubmissionQuery {
            survey_id_eq: Some(id),
            is_complete_eq: Some(true),
        },
    )
    .await?;
    Ok(SurveyResults {
        survey,
        questions: tally(&questions, options, &counts),
        num_submissions,
    })
}
