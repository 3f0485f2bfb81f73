//! # forum-api
//!
//! The web routing layer for the forum service.

pub mod handlers;
pub mod middleware;

use actix_web::web;

pub use handlers::AppState;

/// Configures the routes and extractor configs.
///
/// Everything is mounted under `/api`; the binary only adds state and
/// the wrapping middleware.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(middleware::json_config())
        .app_data(middleware::query_config())
        .app_data(middleware::path_config())
        .service(
            web::scope("/api")
                .route("/forum/create", web::post().to(handlers::create_forum))
                .route("/forum/{slug}/create", web::post().to(handlers::create_thread))
                .route("/forum/{slug}/details", web::get().to(handlers::forum_details))
                .route("/forum/{slug}/threads", web::get().to(handlers::forum_threads))
                .route("/forum/{slug}/users", web::get().to(handlers::forum_users))
                .service(
                    web::resource("/post/{id}/details")
                        .route(web::get().to(handlers::post_details))
                        .route(web::post().to(handlers::update_post)),
                ),
        );
}
