//! In-memory store used by the test suite. A transaction works on a private
//! copy of the state and records its writes. Commit replays them on the shared
//! state and fails when a write no longer has the outcome it had on the copy,
//! such as completing a submission another transaction completed meanwhile.

use crate::core::models::{
    answer::{Insert as AnswerInsert, OptionCount},
    common::Pagination,
    option::{Insert as OptionInsert, Opt, Query as OptionQuery},
    question::{Insert as QuestionInsert, Query as QuestionQuery, Question},
    submission::{Query as SubmissionQuery, Submission},
    survey::{Insert as SurveyInsert, Query as SurveyQuery, Survey, Update as SurveyUpdate},
    user::{Insert as UserInsert, User},
};
use crate::core::ports::repository::{
    AnswerCommon, Common, Manager, OptionCommon, QuestionCommon, Store, SubmissionCommon, SurveyCommon, TxStore, UserCommon,
};
use crate::error::Error;
use chrono::Utc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

type Replay = Box<dyn Fn(&mut State) -> Result<(), Error>>;

#[derive(Debug, Clone)]
pub struct Answer {
    pub id: i32,
    pub submission_id: i32,
    pub question_id: i32,
    pub option_id: i32,
}

#[derive(Debug, Default, Clone)]
pub struct State {
    pub users: Vec<User>,
    pub surveys: Vec<Survey>,
    pub questions: Vec<Question>,
    pub options: Vec<Opt>,
    pub submissions: Vec<Submission>,
    pub answers: Vec<Answer>,
    /// Makes `complete` fail, to exercise rollback after answers were written.
    pub fail_on_complete: bool,
}

impl State {
    fn option_survey_id(&self, option: &Opt) -> Option<i32> {
        self.questions.iter().find(|q| q.id == option.question_id).map(|q| q.survey_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemManager {
    state: Arc<Mutex<State>>,
    last_id: Arc<AtomicI32>,
}

impl MemManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> State {
        self.state.lock().unwrap().clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut State)) {
        f(&mut self.state.lock().unwrap())
    }

    pub fn store(&self) -> MemStore {
        MemStore {
            shared: self.state.clone(),
            last_id: self.last_id.clone(),
            staged: None,
            writes: Vec::new(),
        }
    }

    pub fn begin(&self) -> MemStore {
        MemStore {
            staged: Some(self.snapshot()),
            ..self.store()
        }
    }
}

impl Manager for MemManager {
    type Store = MemStore;
    type TxStore = MemStore;

    async fn db(&self) -> Result<MemStore, Error> {
        Ok(self.store())
    }

    async fn tx(&self) -> Result<MemStore, Error> {
        Ok(self.begin())
    }
}

pub struct MemStore {
    shared: Arc<Mutex<State>>,
    last_id: Arc<AtomicI32>,
    staged: Option<State>,
    writes: Vec<Replay>,
}

impl MemStore {
    fn next_id(&self) -> i32 {
        self.last_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        match self.staged.as_ref() {
            Some(state) => f(state),
            None => f(&self.shared.lock().unwrap()),
        }
    }

    /// Inside a transaction the write is also kept, with its outcome, for
    /// replay on commit.
    fn write<R>(&mut self, op: impl Fn(&mut State) -> Result<R, Error> + 'static) -> Result<R, Error>
    where
        R: PartialEq + Clone + 'static,
    {
        match self.staged.as_mut() {
            None => op(&mut self.shared.lock().unwrap()),
            Some(state) => {
                let outcome = op(state)?;
                let expected = outcome.clone();
                self.writes.push(Box::new(move |s| {
                    if op(s)? == expected {
                        Ok(())
                    } else {
                        Err(Error::NotFound)
                    }
                }));
                Ok(outcome)
            }
        }
    }
}

fn paginate<T>(items: Vec<T>, pagination: Option<Pagination>) -> Vec<T> {
    match pagination {
        Some(p) => items.into_iter().skip(p.offset() as usize).take(p.limit() as usize).collect(),
        None => items,
    }
}

impl UserCommon for MemStore {
    async fn insert(&mut self, user: UserInsert) -> Result<i32, Error> {
        let id = self.next_id();
        self.write(move |s| {
            s.users.push(User {
                id,
                username: user.username.clone(),
                password: user.password.clone(),
                salt: user.salt.clone(),
            });
            Ok(id)
        })
    }

    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error> {
        Ok(self.read(|s| s.users.iter().find(|u| u.username == username).cloned()))
    }

    async fn exists(&mut self, username: &str) -> Result<bool, Error> {
        Ok(self.read(|s| s.users.iter().any(|u| u.username == username)))
    }
}

impl SurveyCommon for MemStore {
    async fn insert(&mut self, survey: SurveyInsert) -> Result<i32, Error> {
        let id = self.next_id();
        let created_at = Utc::now();
        self.write(move |s| {
            s.surveys.push(Survey {
                id,
                title: survey.title.clone(),
                is_active: false,
                creator_id: survey.creator_id,
                created_at,
            });
            Ok(id)
        })
    }

    async fn get(&mut self, id: i32) -> Result<Option<Survey>, Error> {
        Ok(self.read(|s| s.surveys.iter().find(|v| v.id == id).cloned()))
    }

    async fn query(&mut self, query: &SurveyQuery, pagination: Option<Pagination>) -> Result<Vec<Survey>, Error> {
        let mut surveys: Vec<Survey> = self.read(|s| {
            s.surveys
                .iter()
                .filter(|v| query.creator_id_eq.map_or(true, |c| v.creator_id == c))
                .cloned()
                .collect()
        });
        surveys.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(surveys, pagination))
    }

    async fn count(&mut self, query: &SurveyQuery) -> Result<i64, Error> {
        Ok(SurveyCommon::query(self, query, None).await?.len() as i64)
    }

    async fn update(&mut self, id: i32, survey: SurveyUpdate) -> Result<(), Error> {
        self.write(move |s| {
            if let Some(v) = s.surveys.iter_mut().find(|v| v.id == id) {
                v.title = survey.title.clone();
            }
            Ok(())
        })
    }

    async fn activate(&mut self, id: i32) -> Result<(), Error> {
        self.write(move |s| {
            if let Some(v) = s.surveys.iter_mut().find(|v| v.id == id) {
                v.is_active = true;
            }
            Ok(())
        })
    }

    async fn delete(&mut self, id: i32) -> Result<(), Error> {
        self.write(move |s| {
            let question_ids: Vec<i32> = s.questions.iter().filter(|q| q.survey_id == id).map(|q| q.id).collect();
            let submission_ids: Vec<i32> = s.submissions.iter().filter(|v| v.survey_id == id).map(|v| v.id).collect();
            s.answers
                .retain(|a| !submission_ids.contains(&a.submission_id) && !question_ids.contains(&a.question_id));
            s.options.retain(|o| !question_ids.contains(&o.question_id));
            s.questions.retain(|q| q.survey_id != id);
            s.submissions.retain(|v| v.survey_id != id);
            s.surveys.retain(|v| v.id != id);
            Ok(())
        })
    }
}

impl QuestionCommon for MemStore {
    async fn insert(&mut self, question: QuestionInsert) -> Result<i32, Error> {
        let id = self.next_id();
        self.write(move |s| {
            s.questions.push(Question {
                id,
                survey_id: question.survey_id,
                prompt: question.prompt.clone(),
            });
            Ok(id)
        })
    }

    async fn get(&mut self, id: i32) -> Result<Option<Question>, Error> {
        Ok(self.read(|s| s.questions.iter().find(|q| q.id == id).cloned()))
    }

    async fn query(&mut self, query: QuestionQuery) -> Result<Vec<Question>, Error> {
        Ok(self.read(|s| {
            s.questions
                .iter()
                .filter(|q| query.survey_id_eq.map_or(true, |id| q.survey_id == id))
                .cloned()
                .collect()
        }))
    }
}

impl OptionCommon for MemStore {
    async fn insert(&mut self, option: OptionInsert) -> Result<i32, Error> {
        let id = self.next_id();
        self.write(move |s| {
            s.options.push(Opt {
                id,
                question_id: option.question_id,
                text: option.text.clone(),
            });
            Ok(id)
        })
    }

    async fn query(&mut self, query: OptionQuery) -> Result<Vec<Opt>, Error> {
        Ok(self.read(|s| {
            s.options
                .iter()
                .filter(|o| query.question_id_eq.map_or(true, |id| o.question_id == id))
                .filter(|o| query.survey_id_eq.map_or(true, |id| s.option_survey_id(o) == Some(id)))
                .cloned()
                .collect()
        }))
    }
}

impl SubmissionCommon for MemStore {
    async fn insert(&mut self, survey_id: i32) -> Result<Submission, Error> {
        let submission = Submission {
            id: self.next_id(),
            survey_id,
            created_at: Utc::now(),
            is_complete: false,
        };
        let row = submission.clone();
        self.write(move |s| {
            s.submissions.push(row.clone());
            Ok(())
        })?;
        Ok(submission)
    }

    async fn get_incomplete_for_update(&mut self, survey_id: i32, id: i32) -> Result<Option<Submission>, Error> {
        SubmissionCommon::get_incomplete(self, survey_id, id).await
    }

    async fn get_incomplete(&mut self, survey_id: i32, id: i32) -> Result<Option<Submission>, Error> {
        Ok(self.read(|s| {
            s.submissions
                .iter()
                .find(|v| v.id == id && v.survey_id == survey_id && !v.is_complete)
                .cloned()
        }))
    }

    async fn complete(&mut self, id: i32) -> Result<bool, Error> {
        self.write(move |s| {
            if s.fail_on_complete {
                return Err(Error::ServerError(anyhow::anyhow!("injected failure")));
            }
            match s.submissions.iter_mut().find(|v| v.id == id && !v.is_complete) {
                Some(v) => {
                    v.is_complete = true;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    async fn count(&mut self, query: SubmissionQuery) -> Result<i64, Error> {
        Ok(self.read(|s| {
            s.submissions
                .iter()
                .filter(|v| query.survey_id_eq.map_or(true, |id| v.survey_id == id))
                .filter(|v| query.is_complete_eq.map_or(true, |c| v.is_complete == c))
                .count() as i64
        }))
    }
}

impl AnswerCommon for MemStore {
    async fn bulk_insert(&mut self, answers: Vec<AnswerInsert>) -> Result<(), Error> {
        let rows: Vec<Answer> = answers
            .into_iter()
            .map(|a| Answer {
                id: self.next_id(),
                submission_id: a.submission_id,
                question_id: a.question_id,
                option_id: a.option_id,
            })
            .collect();
        self.write(move |s| {
            s.answers.extend(rows.iter().cloned());
            Ok(())
        })
    }

    async fn count_by_option(&mut self, survey_id: i32) -> Result<Vec<OptionCount>, Error> {
        Ok(self.read(|s| {
            s.options
                .iter()
                .filter(|o| s.option_survey_id(o) == Some(survey_id))
                .map(|o| OptionCount {
                    option_id: o.id,
                    answers: s
                        .answers
                        .iter()
                        .filter(|a| a.option_id == o.id)
                        .filter(|a| s.submissions.iter().any(|v| v.id == a.submission_id && v.is_complete))
                        .count() as i64,
                })
                .collect()
        }))
    }
}

impl Common for MemStore {}
impl Store for MemStore {}

impl TxStore for MemStore {
    async fn commit(mut self) -> Result<(), Error> {
        if self.staged.take().is_none() {
            return Ok(());
        }
        let mut shared = self.shared.lock().unwrap();
        let mut next = shared.clone();
        for replay in &self.writes {
            if let Err(e) = replay(&mut next) {
                log::debug!("in-memory transaction conflicts with a concurrent commit: {}", e);
                return Err(e);
            }
        }
        *shared = next;
        Ok(())
    }

    async fn rollback(mut self) -> Result<(), Error> {
        self.staged = None;
        self.writes.clear();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn survey(title: &str) -> SurveyInsert {
        SurveyInsert {
            title: title.into(),
            creator_id: 1,
        }
    }

    #[tokio::test]
    async fn test_complete_only_once() {
        let manager = MemManager::new();
        let mut store = manager.store();
        let submission = SubmissionCommon::insert(&mut store, 1).await.unwrap();
        assert!(SubmissionCommon::complete(&mut store, submission.id).await.unwrap());
        assert!(!SubmissionCommon::complete(&mut store, submission.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_interleaved_commits_keep_both_writes() {
        let manager = MemManager::new();
        let mut first = manager.begin();
        let mut second = manager.begin();
        let a = SurveyCommon::insert(&mut first, survey("first")).await.unwrap();
        let b = SurveyCommon::insert(&mut second, survey("second")).await.unwrap();
        assert_ne!(a, b);
        assert!(manager.snapshot().surveys.is_empty());
        first.commit().await.unwrap();
        second.commit().await.unwrap();
        let mut ids: Vec<i32> = manager.snapshot().surveys.iter().map(|s| s.id).collect();
        ids.sort();
        assert_eq!(ids, vec![a, b]);
    }

    #[tokio::test]
    async fn test_conflicting_completion_fails_commit() {
        let manager = MemManager::new();
        let submission = SubmissionCommon::insert(&mut manager.store(), 1).await.unwrap();
        let mut first = manager.begin();
        let mut second = manager.begin();
        assert!(SubmissionCommon::complete(&mut first, submission.id).await.unwrap());
        assert!(SubmissionCommon::complete(&mut second, submission.id).await.unwrap());
        first.commit().await.unwrap();
        assert!(matches!(second.commit().await, Err(Error::NotFound)));
        assert!(manager.snapshot().submissions[0].is_complete);
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let manager = MemManager::new();
        let mut tx = manager.begin();
        SurveyCommon::insert(&mut tx, survey("gone")).await.unwrap();
        tx.rollback().await.unwrap();
        assert!(manager.snapshot().surveys.is_empty());
    }
}
