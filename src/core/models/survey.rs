use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Survey {
    pub id: i32,
    pub title: String,
    pub is_active: bool,
    pub creator_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub title: String,
    pub creator_id: i32,
}

#[derive(Debug, Clone)]
pub struct Update {
    pub title: String,
}

#[derive(Debug, Default)]
pub struct Query {
    pub creator_id_eq: Option<i32>,
}
