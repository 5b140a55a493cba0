use crate::core::models::{
    answer::{Insert as AnswerInsert, OptionCount},
    common::Pagination,
    option::{Insert as OptionInsert, Opt, Query as OptionQuery},
    question::{Insert as QuestionInsert, Query as QuestionQuery, Question},
    submission::{Query as SubmissionQuery, Submission},
    survey::{Insert as SurveyInsert, Query as SurveyQuery, Survey, Update as SurveyUpdate},
    user::{Insert as UserInsert, User},
};
use crate::error::Error;

pub trait UserCommon {
    async fn insert(&mut self, user: UserInsert) -> Result<i32, Error>;
    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error>;
    async fn exists(&mut self, username: &str) -> Result<bool, Error>;
}

pub trait SurveyCommon {
    async fn insert(&mut self, survey: SurveyInsert) -> Result<i32, Error>;
    async fn get(&mut self, id: i32) -> Result<Option<Survey>, Error>;
    /// Newest first.
    async fn query(&mut self, query: &SurveyQuery, pagination: Option<Pagination>) -> Result<Vec<Survey>, Error>;
    async fn count(&mut self, query: &SurveyQuery) -> Result<i64, Error>;
    async fn update(&mut self, id: i32, survey: SurveyUpdate) -> Result<(), Error>;
    async fn activate(&mut self, id: i32) -> Result<(), Error>;
    async fn delete(&mut self, id: i32) -> Result<(), Error>;
}

pub trait QuestionCommon {
    async fn insert(&mut self, question: QuestionInsert) -> Result<i32, Error>;
    async fn get(&mut self, id: i32) -> Result<Option<Question>, Error>;
    /// In creation order.
    async fn query(&mut self, query: QuestionQuery) -> Result<Vec<Question>, Error>;
}

pub trait OptionCommon {
    async fn insert(&mut self, option: OptionInsert) -> Result<i32, Error>;
    /// In creation order.
    async fn query(&mut self, query: OptionQuery) -> Result<Vec<Opt>, Error>;
}

pub trait SubmissionCommon {
    async fn insert(&mut self, survey_id: i32) -> Result<Submission, Error>;
    /// Locks the row until the surrounding transaction ends.
    async fn get_incomplete_for_update(&mut self, survey_id: i32, id: i32) -> Result<Option<Submission>, Error>;
    async fn get_incomplete(&mut self, survey_id: i32, id: i32) -> Result<Option<Submission>, Error>;
    /// Returns false when the submission was already complete.
    async fn complete(&mut self, id: i32) -> Result<bool, Error>;
    async fn count(&mut self, query: SubmissionQuery) -> Result<i64, Error>;
}

pub trait AnswerCommon {
    async fn bulk_insert(&mut self, answers: Vec<AnswerInsert>) -> Result<(), Error>;
    /// Counts per option of a survey, only answers of completed submissions.
    async fn count_by_option(&mut self, survey_id: i32) -> Result<Vec<OptionCount>, Error>;
}

pub trait Common: SurveyCommon + QuestionCommon + OptionCommon + SubmissionCommon + AnswerCommon + UserCommon {}

pub trait Store: Common {}

pub trait TxStore: Store {
    async fn commit(self) -> Result<(), Error>;
    async fn rollback(self) -> Result<(), Error>;
}

pub trait Manager: 'static {
    type Store: Store;
    type TxStore: TxStore;
    async fn db(&self) -> Result<Self::Store, Error>;
    async fn tx(&self) -> Result<Self::TxStore, Error>;
}
