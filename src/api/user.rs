//! User management endpoints (admin only)

use crate::api::{parse_id, MessageResponse};
use crate::domain::{CreateUserInput, Role, UpdateUserInput, User, UserSummary};
use crate::error::Result;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// GET /api/users
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = state.user_service.list().await?;
    Ok(Json(users))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> Result<Response> {
    let user = state.user_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// GET /api/users/{id}
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<User>> {
    let id = parse_id(&id, "User")?;
    let user = state.user_service.get(id).await?;
    Ok(Json(user))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateUserInput>,
) -> Result<Json<User>> {
    let id = parse_id(&id, "User")?;
    let user = state.user_service.update(id, input).await?;
    Ok(Json(user))
}

/// DELETE /api/users/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_id(&id, "User")?;
    state.user_service.delete(id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

async fn summaries(state: &AppState, role: Role) -> Result<Json<Vec<UserSummary>>> {
    let users = state.user_service.list_by_role(role).await?;
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

/// GET /api/users/admins/list
pub async fn list_admins(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>> {
    summaries(&state, Role::Admin).await
}

/// GET /api/users/sellers/list
pub async fn list_sellers(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>> {
    summaries(&state, Role::Seller).await
}

/// GET /api/users/clients/list
pub async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>> {
    summaries(&state, Role::Client).await
}
