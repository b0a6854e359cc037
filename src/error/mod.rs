//! Unified error handling for Facturo Core

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Per-field validation messages, keyed by field path.
///
/// Nested list fields use dotted indices, e.g. `items.0.quantity`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to a field's error list
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Single-field convenience constructor
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    fn collect(&mut self, prefix: &str, errors: &validator::ValidationErrors) {
        use validator::ValidationErrorsKind;

        for (field, kind) in errors.errors() {
            let path = if prefix.is_empty() {
                field.to_string()
            } else {
                format!("{}.{}", prefix, field)
            };

            match kind {
                ValidationErrorsKind::Field(field_errors) => {
                    for error in field_errors {
                        let message = error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("The {} field is invalid.", path));
                        self.add(path.clone(), message);
                    }
                }
                ValidationErrorsKind::Struct(nested) => {
                    self.collect(&path, nested);
                }
                ValidationErrorsKind::List(items) => {
                    for (index, nested) in items {
                        self.collect(&format!("{}.{}", path, index), nested);
                    }
                }
            }
        }
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = Self::new();
        out.collect("", &errors);
        out
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid role specification: {0}")]
    InvalidRoleSpec(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict {
            message: message.into(),
            details: None,
        }
    }
}

/// Guard rejection body, mirrored by the auth middleware
#[derive(Serialize)]
struct GuardErrorResponse {
    success: bool,
    message: String,
    code: &'static str,
}

fn guard_response(status: StatusCode, message: String, code: &'static str) -> Response {
    let body = Json(GuardErrorResponse {
        success: false,
        message,
        code,
    });
    (status, body).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "message": message })),
            )
                .into_response(),
            AppError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "message": message })),
            )
                .into_response(),
            AppError::Unauthenticated(message) => {
                guard_response(StatusCode::UNAUTHORIZED, message, "UNAUTHENTICATED")
            }
            AppError::InvalidRoleSpec(message) => {
                guard_response(StatusCode::BAD_REQUEST, message, "INVALID_ROLES")
            }
            AppError::Forbidden(message) => {
                guard_response(StatusCode::FORBIDDEN, message, "INSUFFICIENT_PERMISSIONS")
            }
            AppError::Conflict { message, details } => {
                let mut body = serde_json::json!({ "message": message });
                if let (Some(map), Some(serde_json::Value::Object(extra))) =
                    (body.as_object_mut(), details)
                {
                    for (key, value) in extra {
                        map.insert(key, value);
                    }
                }
                (StatusCode::CONFLICT, Json(body)).into_response()
            }
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({
                    "message": "The given data was invalid.",
                    "errors": errors,
                })),
            )
                .into_response(),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "message": "A database error occurred" })),
                )
                    .into_response()
            }
            AppError::Jwt(e) => {
                tracing::error!("JWT error: {:?}", e);
                guard_response(
                    StatusCode::UNAUTHORIZED,
                    "Invalid or expired token".to_string(),
                    "UNAUTHENTICATED",
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "message": "An internal error occurred" })),
                )
                    .into_response()
            }
        }
    }
}

// Conversion from validation errors
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.into())
    }
}

/// Map a MySQL duplicate-key error (1062) to a per-field validation error.
///
/// Any other error is passed through unchanged.
pub fn map_unique_violation(err: sqlx::Error, field: &str, message: &str) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23000") || is_mysql_duplicate(db_err.as_ref()) {
            return AppError::Validation(FieldErrors::single(field, message));
        }
    }
    AppError::Database(err)
}

fn is_mysql_duplicate(err: &dyn sqlx::error::DatabaseError) -> bool {
    err.message().contains("Duplicate entry")
}
