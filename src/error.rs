//! Typed errors and HTTP mapping.

use crate::model::EntityKind;
use crate::serialize::RuleError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// One violated field rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Client-fixable schema violations, collected before anything is persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            errors: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn merge(&mut self, other: ValidationError) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

impl std::error::Error for ValidationError {}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),
    #[error("{0} not found")]
    NotFound(EntityKind),
    #[error("bad request: {0}")]
    BadRequest(String),
    /// A body the extractor refused before parsing, under the extractor's own status.
    #[error("rejected ({0}): {1}")]
    Rejection(StatusCode, String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("store: {0}")]
    Store(String),
    #[error(transparent)]
    Rule(#[from] RuleError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Serialize)]
pub struct ErrorsBody {
    pub errors: Vec<String>,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Rejection(status, _) => *status,
            AppError::Db(_) | AppError::Store(_) | AppError::Rule(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            AppError::Validation(e) => (status, Json(ErrorsBody { errors: e.messages() })).into_response(),
            AppError::BadRequest(msg) | AppError::Rejection(_, msg) => {
                (status, Json(ErrorsBody { errors: vec![msg] })).into_response()
            }
            AppError::NotFound(kind) => (
                status,
                Json(ErrorBody {
                    error: format!("{} not found", kind),
                }),
            )
                .into_response(),
            other => {
                tracing::error!(error = %other, "request failed");
                let message = match other {
                    AppError::Db(_) | AppError::Store(_) => "storage error",
                    _ => "internal error",
                };
                (
                    status,
                    Json(ErrorBody {
                        error: message.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
