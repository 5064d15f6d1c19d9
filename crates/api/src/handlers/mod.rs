pub mod certificates;

use axum::http::StatusCode;
use axum::response::Response;

use crate::error::error_response;

/// Fallback for every unmatched route.
pub async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found")
}
