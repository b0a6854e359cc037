//! JWT authentication extractor

use crate::domain::{Role, StringUuid};
use crate::error::AppError;
use crate::server::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

/// Authenticated principal extracted from the Authorization header
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: StringUuid,
    pub email: String,
    pub role: Role,
}

/// Extract the Bearer token from the Authorization header
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ")
}

pub(crate) fn unauthenticated() -> AppError {
    AppError::Unauthenticated("Unauthenticated".to_string())
}

impl AuthUser {
    /// Verify the request's token against the application state
    pub fn from_headers(headers: &HeaderMap, state: &AppState) -> Result<Self, AppError> {
        let token = extract_bearer_token(headers).ok_or_else(unauthenticated)?;
        let claims = state
            .jwt_manager
            .verify(token)
            .map_err(|_| unauthenticated())?;

        let user_id = StringUuid::parse_str(&claims.sub).map_err(|_| unauthenticated())?;

        Ok(Self {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        AuthUser::from_headers(&parts.headers, state)
    }
}
