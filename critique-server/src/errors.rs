use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use critique_core::CoreError;
use serde_json::json;
use std::fmt;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

/// API error carrying the HTTP status and the wire body shape.
///
/// Errors attached to a `field` serialize as `{"<field>": ["<message>"]}`,
/// everything else as `{"detail": "<message>"}`.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub field: Option<&'static str>,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            field: None,
        }
    }

    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            field: Some(field),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, "request failed: {}", self.message);
        }
        let body = match self.field {
            Some(field) => Json(json!({ field: [self.message] })),
            None => Json(json!({ "detail": self.message })),
        };
        (self.status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, message } => {
                Self::field(field, message)
            }
            CoreError::Model(e) => Self::field(e.field(), e.to_string()),
            CoreError::NotFound(msg) => Self::not_found(msg),
            // Duplicate resources surface as validation failures, the same
            // status clients get for any other rejected payload.
            CoreError::Conflict(msg) => Self::bad_request(msg),
            CoreError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<critique_model::ModelError> for AppError {
    fn from(err: critique_model::ModelError) -> Self {
        Self::field(err.field(), err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}
