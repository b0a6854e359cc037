//! REST API handlers and shared response types

pub mod auth;
pub mod health;
pub mod invoice;
pub mod product;
pub mod user;

use crate::domain::StringUuid;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Message response (for delete, logout, etc.)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parse a path id, mapping malformed values to the entity's 404.
///
/// Callers cannot tell a malformed id from an unknown one.
pub(crate) fn parse_id(raw: &str, entity: &str) -> Result<StringUuid> {
    StringUuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{} not found", entity)))
}
