use axum::routing::post;
use axum::Router;

use crate::handlers::certificates;
use crate::state::AppState;

/// Routes mounted under `/api`.
///
/// ```text
/// POST /generate-certificates    generate one design per style
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/generate-certificates",
        post(certificates::generate_certificates),
    )
}
