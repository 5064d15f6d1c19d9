use axum::extract::State;
use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::response::MessageResponse;
use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always `"OK"` while the process is serving.
    pub status: &'static str,
    /// Current time, RFC 3339.
    pub timestamp: String,
    /// Seconds since startup.
    pub uptime: f64,
}

/// GET /api/health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

/// GET /
async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Certificate Generator API is running!",
    })
}

/// Mount the health check (intended for nesting under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Mount the root liveness message (intended for root level).
pub fn root_router() -> Router<AppState> {
    Router::new().route("/", get(root))
}
