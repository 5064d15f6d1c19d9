use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use certgen_core::error::CoreError;
use serde_json::json;

/// Message returned for every 500 from the generation endpoint.
pub const INTERNAL_ERROR_MSG: &str = "Internal server error while generating certificates";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce `{ success, error, code }` bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `certgen_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error; the message is logged, never returned.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        INTERNAL_ERROR_MSG.to_string(),
                    )
                }
            },
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_ERROR_MSG.to_string(),
                )
            }
        };

        error_response(status, code, &message)
    }
}

/// Build a `{ success: false, error, code }` response.
pub fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    let body = json!({
        "success": false,
        "error": message,
        "code": code,
    });

    (status, axum::Json(body)).into_response()
}
