use crate::context::UserInfo;
use crate::core::ports::tokener::{Payload, Tokener};
use crate::error::Error;
use crate::impls::tokener::jwt::JWT;
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{HttpMessage, ResponseError};
use chrono::{Duration, Utc};
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

pub static JWT_TOKEN: &str = "JWT_TOKEN";
pub static JWT_SECRET: &str = "JWT_SECRET";

#[derive(Debug, Deserialize, Serialize)]
pub struct Claim {
    pub user: String,
    pub exp: i64,
}

impl Claim {
    pub fn for_user(uid: i32, ttl: Duration) -> Self {
        Self {
            user: uid.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        }
    }
}

impl Payload for Claim {
    fn user(&self) -> &str {
        &self.user
    }
}

/// Rejects requests without a valid token and exposes the caller as [`UserInfo`].
pub struct JWTMiddleware {
    secret: Vec<u8>,
}

impl JWTMiddleware {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JWTMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Transform = JWTService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JWTService {
            tokener: JWT::new(self.secret.clone()),
            next_service: service,
        }))
    }
}

pub struct JWTService<S> {
    tokener: JWT,
    next_service: S,
}

/// Header token first, then the cookie.
fn candidate_tokens(req: &ServiceRequest) -> Vec<String> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim().to_owned());
    let cookie = req.cookie(JWT_TOKEN).map(|c| c.value().to_owned());
    header.into_iter().chain(cookie).collect()
}

impl<S> JWTService<S> {
    fn verify(&self, token: &str) -> Result<UserInfo, Error> {
        let claim: Claim = self.tokener.verify_token(token).map_err(|e| {
            log::debug!("rejected token: {}", e);
            Error::Unauthorized
        })?;
        let id = claim.user().parse::<i32>().map_err(|_| Error::Unauthorized)?;
        Ok(UserInfo { id })
    }

    fn identify(&self, req: &ServiceRequest) -> Result<UserInfo, Error> {
        candidate_tokens(req)
            .iter()
            .find_map(|token| self.verify(token).ok())
            .ok_or(Error::Unauthorized)
    }
}

impl<S, B> Service<ServiceRequest> for JWTService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(next_service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.identify(&req) {
            Err(e) => {
                let res = req.into_response(e.error_response()).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
            Ok(user_info) => {
                req.extensions_mut().insert(user_info);
                let res_fut = self.next_service.call(req);
                Box::pin(async move { res_fut.await.map(ServiceResponse::map_into_left_body) })
            }
        }
    }
}
