/// HTTP handlers for post-service
///
/// - Posts: feed listing, create, read, delete, like/dislike
/// - Auth: Google OAuth redirect flow, status and logout
/// - Health: liveness and readiness probes
pub mod auth;
pub mod health;
pub mod posts;

pub use auth::{auth_status, google_callback, google_login, logout};
pub use health::{health_summary, liveness_check, readiness_summary};
pub use posts::{
    create_post, delete_post, dislike_post, get_feed, get_post, like_post, liked_status,
};

use crate::error::AppError;
use actix_web::web;

/// Register extractor configs and every API route.
///
/// `/like` and `/dislike` are registered before `/{post_id}` so they are never
/// captured as an id.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .service(
        web::scope("/api/health")
            .route("", web::get().to(health_summary))
            .route("/ready", web::get().to(readiness_summary))
            .route("/live", web::get().to(liveness_check)),
    )
    .service(
        web::scope("/api/auth")
            .route("/google", web::get().to(google_login))
            .route("/google/callback", web::get().to(google_callback))
            .route("/status", web::get().to(auth_status))
            .route("/logout", web::get().to(logout)),
    )
    .service(
        web::scope("/api/posts")
            .service(
                web::resource("")
                    .route(web::get().to(get_feed))
                    .route(web::post().to(create_post)),
            )
            .service(web::resource("/like").route(web::put().to(like_post)))
            .service(web::resource("/dislike").route(web::put().to(dislike_post)))
            .service(
                web::resource("/{post_id}")
                    .route(web::get().to(get_post))
                    .route(web::delete().to(delete_post)),
            )
            .service(
                web::resource("/{post_id}/liked-status").route(web::get().to(liked_status)),
            ),
    );
}
