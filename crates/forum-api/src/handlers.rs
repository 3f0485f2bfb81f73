//! # forum-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the core usecases:
//! decode, call, map the outcome to a status.

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use forum_core::filters::{ThreadFilter, UserFilter};
use forum_core::models::{Forum, NewThread, PostUpdate};
use forum_core::{AppError, ForumUsecase, Outcome, PostUsecase};
use serde::{Deserialize, Serialize};

/// State shared across all actix-web workers.
pub struct AppState {
    pub forums: ForumUsecase,
    pub posts: PostUsecase,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody { message: message.into() })
}

fn app_error_response(err: AppError) -> HttpResponse {
    match err {
        AppError::NotFound(..) => {
            log::debug!("{err}");
            error_response(StatusCode::NOT_FOUND, err.to_string())
        }
        AppError::Conflict(_) => error_response(StatusCode::CONFLICT, err.to_string()),
        AppError::Validation(_) => error_response(StatusCode::BAD_REQUEST, err.to_string()),
        AppError::Internal(_) => {
            log::error!("{err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

fn outcome_response<T: Serialize>(outcome: Outcome<T>) -> HttpResponse {
    match outcome {
        Outcome::Ok(value) => HttpResponse::Ok().json(value),
        Outcome::Created(value) => HttpResponse::Created().json(value),
        Outcome::AlreadyExists(value) => HttpResponse::Conflict().json(value),
        Outcome::Conflict(err) => {
            log::debug!("conflict without existing entity: {err}");
            error_response(StatusCode::CONFLICT, err.to_string())
        }
        Outcome::NotFound(err) => {
            log::debug!("{err}");
            error_response(StatusCode::NOT_FOUND, err.to_string())
        }
        Outcome::Failed(err) => {
            log::error!("{err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

/// POST /forum/create
pub async fn create_forum(data: web::Data<AppState>, body: web::Json<Forum>) -> HttpResponse {
    outcome_response(data.forums.create_forum(body.into_inner()).await)
}

/// POST /forum/{slug}/create
pub async fn create_thread(
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<NewThread>,
) -> HttpResponse {
    let slug = path.into_inner();
    outcome_response(data.forums.create_thread(&slug, body.into_inner()).await)
}

/// GET /forum/{slug}/details
pub async fn forum_details(data: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let slug = path.into_inner();

    let found = match data.forums.find(&slug).await {
        Ok(found) => found,
        // A failed lookup still reads as "no such forum" to the client.
        Err(err) => {
            log::error!("{err}");
            None
        }
    };

    match found {
        Some(forum) => HttpResponse::Ok().json(forum),
        None => error_response(StatusCode::NOT_FOUND, format!("Can't find forum with slug {slug}")),
    }
}

/// GET /forum/{slug}/threads?limit&since&desc
pub async fn forum_threads(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ThreadFilter>,
) -> HttpResponse {
    let slug = path.into_inner();
    outcome_response(data.forums.get_threads_by_forum(&slug, &query).await)
}

/// GET /forum/{slug}/users?limit&since&desc
pub async fn forum_users(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<UserFilter>,
) -> HttpResponse {
    let slug = path.into_inner();
    outcome_response(data.forums.get_users_by_forum(&slug, &query).await)
}

/// GET /post/{id}/details?related=user,forum,thread
///
/// `related` may repeat; only its first value is read.
pub async fn post_details(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<Vec<(String, String)>>,
) -> HttpResponse {
    let related = query.iter().find(|(key, _)| key == "related").map(|(_, value)| value.as_str());

    match data.posts.find_by_id(path.into_inner(), related).await {
        Ok(full) => HttpResponse::Ok().json(full),
        Err(err) => app_error_response(err),
    }
}

/// POST /post/{id}/details
pub async fn update_post(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<PostUpdate>,
) -> HttpResponse {
    match data.posts.update(path.into_inner(), &body.message).await {
        Ok(post) => HttpResponse::Ok().json(post),
        Err(err) => app_error_response(err),
    }
}
