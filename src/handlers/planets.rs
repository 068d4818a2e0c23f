//! `/planets`.

use super::fields;
use crate::error::AppError;
use crate::response::ok;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::IntoResponse;
use serde_json::Value;

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.service.list_planets().await?))
}

/// Answers 200, not 201, on success; existing clients of this endpoint expect it.
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = fields(payload)?;
    Ok(ok(state.service.create_planet(&body).await?))
}
