//! Handler for certificate design generation.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use certgen_core::design::{DesignRequest, CATEGORY_REQUIRED_MSG};
use certgen_core::error::CoreError;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::response::GenerateResponse;
use crate::state::AppState;

/// POST /api/generate-certificates
///
/// Body: `{ "category": string }`. Responds with one design per style. A
/// body that is not JSON, or whose `category` is missing, not a string, or
/// blank, is rejected with 400 before any upstream call is made.
pub async fn generate_certificates(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<GenerateResponse>> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected generation request body");
        AppError::BadRequest(CATEGORY_REQUIRED_MSG.to_string())
    })?;

    let category = body
        .get("category")
        .and_then(Value::as_str)
        .ok_or_else(|| CoreError::Validation(CATEGORY_REQUIRED_MSG.to_string()))?;
    let request = DesignRequest::new(category)?;

    tracing::info!(category = %request.category(), "Generating certificate designs");

    let designs = state.generator.generate(request.category()).await?;

    tracing::info!(
        category = %request.category(),
        count = designs.len(),
        "Certificate designs generated",
    );

    Ok(Json(GenerateResponse::new(designs)))
}
