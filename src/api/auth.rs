//! Authentication endpoints

use crate::api::MessageResponse;
use crate::domain::{RegisterInput, User};
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::server::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, message = "The email field is required."))]
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,

    #[validate(length(min = 6, message = "The password must be at least 6 characters."))]
    pub password: String,
}

/// Issued token plus the authenticated user
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

impl TokenResponse {
    fn new(token: String, expires_in: i64, user: User) -> Self {
        Self {
            access_token: token,
            token_type: "bearer",
            expires_in,
            user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: User,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<Response> {
    let user = state.auth_service.register(input).await?;
    let body = RegisterResponse {
        message: "User successfully registered".to_string(),
        user,
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Response> {
    input.validate()?;

    match state
        .auth_service
        .login(&input.email, &input.password)
        .await?
    {
        Some(outcome) => {
            let body = TokenResponse::new(
                outcome.token,
                state.auth_service.token_ttl_secs(),
                outcome.user,
            );
            Ok(Json(body).into_response())
        }
        None => Ok((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "Unauthorized" })),
        )
            .into_response()),
    }
}

/// POST /api/auth/logout
///
/// Tokens are stateless; the response just acknowledges so clients can
/// drop their copy.
pub async fn logout(_auth: AuthUser) -> Json<MessageResponse> {
    Json(MessageResponse::new("User successfully signed out"))
}

/// POST /api/auth/refresh
pub async fn refresh(auth: AuthUser, State(state): State<AppState>) -> Result<Json<TokenResponse>> {
    let outcome = state.auth_service.refresh(auth.user_id).await?;
    Ok(Json(TokenResponse::new(
        outcome.token,
        state.auth_service.token_ttl_secs(),
        outcome.user,
    )))
}

/// GET /api/auth/user-profile
pub async fn user_profile(auth: AuthUser, State(state): State<AppState>) -> Result<Json<User>> {
    let user = state.auth_service.profile(auth.user_id).await?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, StringUuid};
    use chrono::Utc;

    #[test]
    fn test_token_response_serialization() {
        let user = User {
            id: StringUuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            phone: None,
            address: None,
            role: Role::Client,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let response = TokenResponse::new("tok".to_string(), 3600, user);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["access_token"], "tok");
        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["expires_in"], 3600);
        assert_eq!(json["user"]["email"], "alice@example.com");
        assert!(json["user"].get("password_hash").is_none());
    }

    #[test]
    fn test_login_input_validation() {
        let input = LoginInput {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };

        let errors = input.validate().unwrap_err();
        let map = errors.errors();
        assert!(map.contains_key("email"));
        assert!(map.contains_key("password"));
    }
}
