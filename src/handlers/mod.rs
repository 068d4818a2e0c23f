//! HTTP handlers for scientists, planets and missions.

pub mod missions;
pub mod planets;
pub mod scientists;

use crate::error::AppError;
use crate::model::{body_to_map, EntityKind, FieldMap};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Json, Path};
use serde_json::Value;

/// Request body as a flat field map. Malformed JSON becomes a structured 400; oversized bodies and
/// missing content types keep their 413 and 415.
pub(crate) fn fields(payload: Result<Json<Value>, JsonRejection>) -> Result<FieldMap, AppError> {
    let Json(body) = payload.map_err(|e| match e {
        JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => AppError::BadRequest(e.body_text()),
        other => AppError::Rejection(other.status(), other.body_text()),
    })?;
    body_to_map(body)
}

/// Ids that are not integers cannot name a record, so they are reported as not found.
pub(crate) fn record_id(path: Result<Path<i64>, PathRejection>, kind: EntityKind) -> Result<i64, AppError> {
    path.map(|Path(id)| id).map_err(|_| AppError::NotFound(kind))
}
