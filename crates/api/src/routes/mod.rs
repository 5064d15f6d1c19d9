pub mod certificates;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /health                    GET   status, timestamp, uptime
/// /generate-certificates     POST  five designs for a category
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(certificates::router())
}
