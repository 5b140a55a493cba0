use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insert {
    pub submission_id: i32,
    pub question_id: i32,
    pub option_id: i32,
}

/// Number of answers of completed submissions that chose an option.
#[derive(Debug, Clone, FromRow)]
pub struct OptionCount {
    pub option_id: i32,
    pub answers: i64,
}
