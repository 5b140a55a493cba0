use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("migrate error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid form")]
    InvalidForm(serde_json::Value),

    #[error("bussiness error: {0}")]
    BusinessError(String),

    #[error("jwt error: {0}")]
    JWTError(#[from] jsonwebtoken::errors::Error),

    #[error("dotenv error: {0}")]
    DotEnvError(#[from] dotenv::Error),

    #[error("io error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("url generation error: {0}")]
    UrlGenerationError(#[from] actix_web::error::UrlGenerationError),

    #[error("server error: {0}")]
    ServerError(#[from] anyhow::Error),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound,
            err => Error::DatabaseError(err),
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::InvalidForm(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::BusinessError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            Error::InvalidForm(form) => HttpResponse::build(status).json(form),
            Error::NotFound | Error::Unauthorized | Error::BusinessError(_) => HttpResponse::build(status).json(json!({ "error": self.to_string() })),
            _ => {
                log::error!("{}", self);
                HttpResponse::build(status).json(json!({ "error": "internal server error" }))
            }
        }
    }
}
