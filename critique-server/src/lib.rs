//! HTTP API for the critique review platform.
//!
//! Thin axum layer over `critique-core`: handlers validate and authorize,
//! repositories do the work. Routes are versioned under `/api/v1`.
#![allow(missing_docs)]

pub mod auth;
pub mod authz;
pub mod catalog;
pub mod errors;
pub mod extract;
pub mod feedback;
pub mod infra;
pub mod mail;
pub mod routes;
pub mod users;

use axum::{Router, http::HeaderValue};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub use crate::errors::{AppError, AppResult};
pub use crate::infra::app_state::AppState;
pub use crate::infra::config::Config;

/// Assembles the full application router, with CORS and request tracing.
pub fn build_app(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    routes::create_api_router(state.clone())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
