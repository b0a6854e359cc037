//! Authentication business logic

use crate::auth::{password, JwtManager};
use crate::domain::{NewUser, RegisterInput, Role, StringUuid, User};
use crate::error::{AppError, FieldErrors, Result};
use crate::notify::LifecycleNotifier;
use crate::repository::UserRepository;
use std::sync::Arc;
use validator::Validate;

/// A successful login: the issued token and the authenticated user
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

pub struct AuthService<R: UserRepository> {
    repo: Arc<R>,
    jwt: JwtManager,
    notifier: Option<Arc<dyn LifecycleNotifier>>,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, jwt: JwtManager, notifier: Option<Arc<dyn LifecycleNotifier>>) -> Self {
        Self {
            repo,
            jwt,
            notifier,
        }
    }

    pub fn token_ttl_secs(&self) -> i64 {
        self.jwt.ttl_secs()
    }

    /// Register a new account. Absent role means client.
    pub async fn register(&self, input: RegisterInput) -> Result<User> {
        let mut errors: FieldErrors = match input.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };

        let role = match &input.role {
            Some(token) => {
                let parsed = Role::parse(token);
                if parsed.is_none() {
                    errors.add("role", "The selected role is invalid.");
                }
                parsed
            }
            None => Some(Role::Client),
        };

        if self.repo.email_taken(&input.email, None).await? {
            errors.add("email", "The email has already been taken.");
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let new_user = NewUser {
            name: input.name,
            email: input.email,
            password_hash: password::hash(&input.password)?,
            phone: input.phone,
            address: input.address,
            // Checked above
            role: role.ok_or_else(|| anyhow::anyhow!("role missing after validation"))?,
            is_active: true,
        };

        let user = self.repo.create(&new_user).await?;
        if let Some(notifier) = &self.notifier {
            notifier.user_created(&user);
        }

        Ok(user)
    }

    /// Authenticate by email and password.
    ///
    /// Returns `None` on bad credentials or an inactive account; the
    /// handler turns that into a generic 401 without leaking which
    /// check failed.
    pub async fn login(&self, email: &str, pass: &str) -> Result<Option<LoginOutcome>> {
        let Some(user) = self.repo.find_by_email(email).await? else {
            return Ok(None);
        };

        if !user.is_active || !password::verify(pass, &user.password_hash) {
            return Ok(None);
        }

        let token = self.jwt.issue(&user)?;
        Ok(Some(LoginOutcome { token, user }))
    }

    /// Load the profile for an authenticated user id
    pub async fn profile(&self, user_id: StringUuid) -> Result<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Issue a fresh token for an already-authenticated user
    pub async fn refresh(&self, user_id: StringUuid) -> Result<LoginOutcome> {
        let user = self.profile(user_id).await?;
        let token = self.jwt.issue(&user)?;
        Ok(LoginOutcome { token, user })
    }
}
