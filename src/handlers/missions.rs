//! `/missions`.

use super::fields;
use crate::error::AppError;
use crate::response::created;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::IntoResponse;
use serde_json::Value;

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = fields(payload)?;
    Ok(created(state.service.create_mission(&body).await?))
}
