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
use sqlx::pool::PoolConnection;
use sqlx::{query, query_as, query_scalar, Executor, PgPool, Postgres, QueryBuilder, Transaction};

pub struct PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    executor: E,
}

impl<E> PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

impl<E> UserCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, user: UserInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO users (username, password, salt) VALUES ($1, $2, $3) RETURNING id")
            .bind(user.username)
            .bind(user.password)
            .bind(user.salt)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error> {
        let user = query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(user)
    }

    async fn exists(&mut self, username: &str) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT * FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }
}

impl<E> SurveyCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, survey: SurveyInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO surveys (title, creator_id) VALUES ($1, $2) RETURNING id")
            .bind(survey.title)
            .bind(survey.creator_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Option<Survey>, Error> {
        let survey = query_as("SELECT * FROM surveys WHERE id = $1").bind(id).fetch_optional(&mut self.executor).await?;
        Ok(survey)
    }

    async fn query(&mut self, query: &SurveyQuery, pagination: Option<Pagination>) -> Result<Vec<Survey>, Error> {
        let mut stmt = QueryBuilder::<Postgres>::new("SELECT * FROM surveys WHERE 1 = 1");
        if let Some(creator_id) = query.creator_id_eq {
            stmt.push(" AND creator_id = ").push_bind(creator_id);
        }
        stmt.push(" ORDER BY created_at DESC, id DESC");
        if let Some(pagination) = pagination {
            stmt.push(pagination.to_sql_clause());
        }
        let surveys = stmt.build_query_as().fetch_all(&mut self.executor).await?;
        Ok(surveys)
    }

    async fn count(&mut self, query: &SurveyQuery) -> Result<i64, Error> {
        let mut stmt = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM surveys WHERE 1 = 1");
        if let Some(creator_id) = query.creator_id_eq {
            stmt.push(" AND creator_id = ").push_bind(creator_id);
        }
        let (n,): (i64,) = stmt.build_query_as().fetch_one(&mut self.executor).await?;
        Ok(n)
    }

    async fn update(&mut self, id: i32, survey: SurveyUpdate) -> Result<(), Error> {
        query("UPDATE surveys SET title = $1 WHERE id = $2")
            .bind(survey.title)
            .bind(id)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }

    async fn activate(&mut self, id: i32) -> Result<(), Error> {
        query("UPDATE surveys SET is_active = true WHERE id = $1").bind(id).execute(&mut self.executor).await?;
        Ok(())
    }

    async fn delete(&mut self, id: i32) -> Result<(), Error> {
        query("DELETE FROM surveys WHERE id = $1").bind(id).execute(&mut self.executor).await?;
        Ok(())
    }
}

impl<E> QuestionCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, question: QuestionInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO questions (survey_id, prompt) VALUES ($1, $2) RETURNING id")
            .bind(question.survey_id)
            .bind(question.prompt)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Option<Question>, Error> {
        let question = query_as("SELECT * FROM questions WHERE id = $1").bind(id).fetch_optional(&mut self.executor).await?;
        Ok(question)
    }

    async fn query(&mut self, query: QuestionQuery) -> Result<Vec<Question>, Error> {
        let mut stmt = QueryBuilder::<Postgres>::new("SELECT * FROM questions WHERE 1 = 1");
        if let Some(survey_id) = query.survey_id_eq {
            stmt.push(" AND survey_id = ").push_bind(survey_id);
        }
        stmt.push(" ORDER BY id");
        let questions = stmt.build_query_as().fetch_all(&mut self.executor).await?;
        Ok(questions)
    }
}

impl<E> OptionCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, option: OptionInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO options (question_id, text) VALUES ($1, $2) RETURNING id")
            .bind(option.question_id)
            .bind(option.text)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn query(&mut self, query: OptionQuery) -> Result<Vec<Opt>, Error> {
        let mut stmt = QueryBuilder::<Postgres>::new(
            "SELECT o.id, o.question_id, o.text
            FROM options AS o
            JOIN questions AS q ON q.id = o.question_id
            WHERE 1 = 1",
        );
        if let Some(question_id) = query.question_id_eq {
            stmt.push(" AND o.question_id = ").push_bind(question_id);
        }
        if let Some(survey_id) = query.survey_id_eq {
            stmt.push(" AND q.survey_id = ").push_bind(survey_id);
        }
        stmt.push(" ORDER BY o.id");
        let options = stmt.build_query_as().fetch_all(&mut self.executor).await?;
        Ok(options)
    }
}

impl<E> SubmissionCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, survey_id: i32) -> Result<Submission, Error> {
        let submission = query_as("INSERT INTO submissions (survey_id) VALUES ($1) RETURNING *")
            .bind(survey_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(submission)
    }

    async fn get_incomplete_for_update(&mut self, survey_id: i32, id: i32) -> Result<Option<Submission>, Error> {
        let submission = query_as("SELECT * FROM submissions WHERE id = $1 AND survey_id = $2 AND NOT is_complete FOR UPDATE")
            .bind(id)
            .bind(survey_id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(submission)
    }

    async fn get_incomplete(&mut self, survey_id: i32, id: i32) -> Result<Option<Submission>, Error> {
        let submission = query_as("SELECT * FROM submissions WHERE id = $1 AND survey_id = $2 AND NOT is_complete")
            .bind(id)
            .bind(survey_id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(submission)
    }

    async fn complete(&mut self, id: i32) -> Result<bool, Error> {
        let res = query("UPDATE submissions SET is_complete = true WHERE id = $1 AND NOT is_complete")
            .bind(id)
            .execute(&mut self.executor)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn count(&mut self, query: SubmissionQuery) -> Result<i64, Error> {
        let mut stmt = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM submissions WHERE 1 = 1");
        if let Some(survey_id) = query.survey_id_eq {
            stmt.push(" AND survey_id = ").push_bind(survey_id);
        }
        if let Some(is_complete) = query.is_complete_eq {
            stmt.push(" AND is_complete = ").push_bind(is_complete);
        }
        let (n,): (i64,) = stmt.build_query_as().fetch_one(&mut self.executor).await?;
        Ok(n)
    }
}

impl<E> AnswerCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn bulk_insert(&mut self, answers: Vec<AnswerInsert>) -> Result<(), Error> {
        if answers.is_empty() {
            return Ok(());
        }
        QueryBuilder::<Postgres>::new("INSERT INTO answers (submission_id, question_id, option_id)")
            .push_values(answers.into_iter(), |mut b, a| {
                b.push_bind(a.submission_id);
                b.push_bind(a.question_id);
                b.push_bind(a.option_id);
            })
            .build()
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }

    async fn count_by_option(&mut self, survey_id: i32) -> Result<Vec<OptionCount>, Error> {
        let counts = query_as(
            "SELECT o.id AS option_id, COUNT(s.id) AS answers
            FROM options AS o
            JOIN questions AS q ON q.id = o.question_id
            LEFT JOIN answers AS a ON a.option_id = o.id
            LEFT JOIN submissions AS s ON s.id = a.submission_id AND s.is_complete
            WHERE q.survey_id = $1
            GROUP BY o.id",
        )
        .bind(survey_id)
        .fetch_all(&mut self.executor)
        .await?;
        Ok(counts)
    }
}

impl Common for PgSqlx<PoolConnection<Postgres>> {}
impl Common for PgSqlx<Transaction<'static, Postgres>> {}
impl Store for PgSqlx<PoolConnection<Postgres>> {}
impl Store for PgSqlx<Transaction<'static, Postgres>> {}

impl TxStore for PgSqlx<Transaction<'static, Postgres>> {
    async fn commit(self) -> Result<(), Error> {
        self.executor.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        self.executor.rollback().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgSqlxManager {
    pool: PgPool,
}

impl PgSqlxManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Manager for PgSqlxManager {
    type Store = PgSqlx<PoolConnection<Postgres>>;
    type TxStore = PgSqlx<Transaction<'static, Postgres>>;

    async fn db(&self) -> Result<Self::Store, Error> {
        let conn = self.pool.acquire().await?;
        Ok(PgSqlx::new(conn))
    }

    async fn tx(&self) -> Result<Self::TxStore, Error> {
        let tx = self.pool.begin().await?;
        Ok(PgSqlx::new(tx))
    }
}
