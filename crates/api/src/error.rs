//! Error handling for the HTTP surface.
//!
//! Every handler failure renders the same `{ "error", "code" }` JSON
//! envelope via [`AppError`]'s [`IntoResponse`] implementation. Internal
//! details are logged server-side and replaced with a generic message
//! before they reach the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use sheetforge_core::error::CoreError;
use sheetforge_core::types::JobId;

/// Application-level error type for HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `sheetforge_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The requested job id is not in the store: never submitted, or
    /// already evicted by the retention sweep.
    #[error("Unknown job: {0}")]
    UnknownJob(JobId),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Status code, stable error code, and client-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Core(CoreError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            ),
            AppError::Core(CoreError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg.clone())
            }
            AppError::Core(CoreError::Internal(msg)) => {
                tracing::error!(error = %msg, "Internal core error");
                sanitized_internal()
            }
            AppError::UnknownJob(id) => (
                StatusCode::NOT_FOUND,
                "UNKNOWN_JOB",
                format!("No job with id {id}"),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                sanitized_internal()
            }
        }
    }
}

/// The generic 500 triple. The logged detail never reaches the client.
fn sanitized_internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = json!({
            "error": message,
            "code": code,
        });
        (status, axum::Json(body)).into_response()
    }
}
