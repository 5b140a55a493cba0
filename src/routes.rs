use crate::core::ports::repository::Manager;
use crate::handlers::{self, option, question, submission, survey};
use crate::impls::tokener::jwt::JWT;
use crate::middlewares::jwt::JWTMiddleware;
use actix_web::web::{delete, get, post, put, resource, scope, Data, ServiceConfig};

/// Mounts every endpoint. Authoring lives behind the jwt middleware, the
/// respondent pages under `/public` are open.
pub fn configure<M: Manager>(cfg: &mut ServiceConfig, secret: &[u8]) {
    cfg.app_data(Data::new(JWT::new(secret.to_vec())))
        .service(resource("/signup").route(post().to(handlers::signup::<M>)))
        .service(resource("/login").route(post().to(handlers::login::<M>)))
        .service(resource("/logout").route(post().to(handlers::logout)))
        .service(
            scope("/surveys")
                .wrap(JWTMiddleware::new(secret.to_vec()))
                .route("", get().to(survey::list::<M>))
                .route("", post().to(survey::create::<M>))
                .service(
                    scope("/{id}")
                        .route("", get().to(survey::detail::<M>))
                        .route("", put().to(survey::update::<M>))
                        .route("", delete().to(survey::delete::<M>))
                        .route("/edit", get().to(survey::edit::<M>))
                        .route("/activate", post().to(survey::activate::<M>))
                        .route("/questions", post().to(question::create::<M>))
                        .service(
                            resource("/questions/{qid}/options")
                                .route(get().to(option::list::<M>))
                                .route(post().to(option::create::<M>)),
                        ),
                ),
        )
        .service(
            scope("/public/surveys/{id}")
                .service(
                    resource("/start")
                        .name("survey-start")
                        .route(get().to(submission::start_page::<M>))
                        .route(post().to(submission::start::<M>)),
                )
                .service(
                    resource("/submissions/{sid}")
                        .name("submission")
                        .route(get().to(submission::formset::<M>))
                        .route(post().to(submission::submit::<M>)),
                )
                .service(resource("/thanks").name("survey-thanks").route(get().to(submission::thanks::<M>))),
        );
}
