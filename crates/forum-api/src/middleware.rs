//! # Middleware
//!
//! Request logging, CORS and the extractor configs that turn malformed input
//! into JSON 400s before a handler runs.

use actix_cors::Cors;
use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::web;

use crate::handlers::error_response;

/// remote-ip "request-line" status-code response-size "referrer" "user-agent"
pub fn standard_middleware() -> Logger {
    Logger::default()
}

/// Allows `origin` when given, any origin otherwise.
pub fn cors_policy(origin: Option<&str>) -> Cors {
    let cors = match origin {
        Some(origin) => Cors::default().allowed_origin(origin),
        None => Cors::default().allow_any_origin(),
    };
    cors.allowed_methods(vec!["GET", "POST"])
        .allow_any_header()
        .max_age(3600)
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = error_response(StatusCode::BAD_REQUEST, format!("malformed body: {err}"));
        InternalError::from_response(err, response).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = error_response(StatusCode::BAD_REQUEST, format!("malformed query: {err}"));
        InternalError::from_response(err, response).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let response = error_response(StatusCode::BAD_REQUEST, format!("malformed path: {err}"));
        InternalError::from_response(err, response).into()
    })
}
