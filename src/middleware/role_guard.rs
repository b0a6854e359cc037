//! Role guard middleware
//!
//! Applied per route group with a pipe-separated role specification:
//!
//! ```ignore
//! router.layer(middleware::from_fn_with_state(
//!     (state.clone(), "seller|admin"),
//!     role_guard,
//! ))
//! ```

use crate::domain::Role;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::server::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Check an authenticated role against a role specification.
///
/// The spec is resolved before the role comparison, so a spec with no
/// valid tokens rejects every caller with a 400 rather than a 403.
pub fn authorize(role: Role, spec: &str) -> Result<()> {
    let allowed = Role::parse_spec(spec);
    if allowed.is_empty() {
        return Err(AppError::InvalidRoleSpec(
            "Invalid roles specified".to_string(),
        ));
    }

    if !allowed.contains(&role) {
        let labels: Vec<&str> = allowed.iter().map(Role::label).collect();
        return Err(AppError::Forbidden(format!(
            "Insufficient permissions. Required one of: {}",
            labels.join(", ")
        )));
    }

    Ok(())
}

/// Axum middleware enforcing authentication plus a role specification
pub async fn role_guard(
    State((state, spec)): State<(AppState, &'static str)>,
    request: Request,
    next: Next,
) -> Response {
    let auth = match AuthUser::from_headers(request.headers(), &state) {
        Ok(auth) => auth,
        Err(e) => return e.into_response(),
    };

    if let Err(e) = authorize(auth.role, spec) {
        return e.into_response();
    }

    next.run(request).await
}
