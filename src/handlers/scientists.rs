//! `/scientists` and `/scientists/:id`.

use super::{fields, record_id};
use crate::error::AppError;
use crate::model::EntityKind;
use crate::response::{accepted, created, ok};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.service.list_scientists().await?))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = fields(payload)?;
    Ok(created(state.service.create_scientist(&body).await?))
}

pub async fn read(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = record_id(path, EntityKind::Scientist)?;
    Ok(ok(state.service.scientist(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = record_id(path, EntityKind::Scientist)?;
    Ok(accepted(state.service.update_scientist(id, fields(payload)).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = record_id(path, EntityKind::Scientist)?;
    state.service.delete_scientist(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
