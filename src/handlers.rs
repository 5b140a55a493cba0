pub mod option;
pub mod question;
pub mod submission;
pub mod survey;

use crate::core::forms::SignupForm;
use crate::core::ports::repository::Manager;
use crate::core::ports::tokener::Tokener;
use crate::core::services::user;
use crate::error::Error;
use crate::impls::tokener::jwt::JWT;
use crate::middlewares::jwt::{Claim, JWT_TOKEN};
use crate::response::CreateResponse;
use actix_web::cookie::{time::OffsetDateTime, Cookie, CookieBuilder};
use actix_web::http::StatusCode;
use actix_web::web::{Data, Json};
use actix_web::{HttpResponse, HttpResponseBuilder};
use chrono::Duration;
use serde::{Deserialize, Serialize};

const TOKEN_TTL_DAYS: i64 = 30;

#[derive(Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

fn token_cookie(token: String) -> Cookie<'static> {
    CookieBuilder::new(JWT_TOKEN, token).path("/").http_only(true).finish()
}

pub async fn login<M: Manager>(
    Json(Login { username, password }): Json<Login>,
    manager: Data<M>,
    tokener: Data<JWT>,
) -> Result<HttpResponse, Error> {
    let mut store = manager.db().await?;
    let user = user::authenticate(&mut store, &username, &password).await?;
    let token = tokener.gen_token(&Claim::for_user(user.id, Duration::days(TOKEN_TTL_DAYS)))?;
    log::info!("user {} logged in", user.id);
    Ok(HttpResponse::build(StatusCode::OK)
        .cookie(token_cookie(token.clone()))
        .json(LoginResponse { token }))
}

pub async fn signup<M: Manager>(Json(form): Json<SignupForm>, manager: Data<M>) -> Result<Json<CreateResponse>, Error> {
    let mut store = manager.db().await?;
    let id = user::signup(&mut store, form).await?;
    Ok(Json(CreateResponse { id }))
}

pub async fn logout() -> HttpResponse {
    HttpResponseBuilder::new(StatusCode::OK)
        .cookie(CookieBuilder::new(JWT_TOKEN, "").path("/").expires(OffsetDateTime::now_utc()).finish())
        .finish()
}
