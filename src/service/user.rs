//! User business logic

use crate::auth::password;
use crate::domain::{
    CreateUserInput, NewUser, Role, StringUuid, UpdateUserInput, User, UserChanges,
};
use crate::error::{AppError, FieldErrors, Result};
use crate::notify::LifecycleNotifier;
use crate::repository::UserRepository;
use std::sync::Arc;
use validator::Validate;

pub struct UserService<R: UserRepository> {
    repo: Arc<R>,
    notifier: Option<Arc<dyn LifecycleNotifier>>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: Arc<R>, notifier: Option<Arc<dyn LifecycleNotifier>>) -> Self {
        Self { repo, notifier }
    }

    pub async fn create(&self, input: CreateUserInput) -> Result<User> {
        let mut errors: FieldErrors = match input.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };

        let role = Role::parse(&input.role);
        if role.is_none() {
            errors.add("role", "The selected role is invalid.");
        }

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
            role: role.ok_or_else(|| anyhow::anyhow!("role missing after validation"))?,
            is_active: input.is_active.unwrap_or(true),
        };

        let user = self.repo.create(&new_user).await?;
        if let Some(notifier) = &self.notifier {
            notifier.user_created(&user);
        }

        Ok(user)
    }

    pub async fn get(&self, id: StringUuid) -> Result<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        self.repo.list().await
    }

    pub async fn list_by_role(&self, role: Role) -> Result<Vec<User>> {
        self.repo.list_by_role(role).await
    }

    pub async fn update(&self, id: StringUuid, input: UpdateUserInput) -> Result<User> {
        let _ = self.get(id).await?;

        let mut errors: FieldErrors = match input.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };

        let role = match &input.role {
            Some(token) => match Role::parse(token) {
                Some(role) => Some(role),
                None => {
                    errors.add("role", "The selected role is invalid.");
                    None
                }
            },
            None => None,
        };

        if let Some(email) = &input.email {
            if self.repo.email_taken(email, Some(id)).await? {
                errors.add("email", "The email has already been taken.");
            }
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let password_hash = match &input.password {
            Some(pass) => Some(password::hash(pass)?),
            None => None,
        };

        let changes = UserChanges {
            name: input.name,
            email: input.email,
            password_hash,
            phone: input.phone,
            address: input.address,
            role,
            is_active: input.is_active,
        };

        let user = self.repo.update(id, &changes).await?;
        if let Some(notifier) = &self.notifier {
            notifier.user_updated(&user);
        }

        Ok(user)
    }

    pub async fn delete(&self, id: StringUuid) -> Result<()> {
        let user = self.get(id).await?;
        self.repo.delete(id).await?;

        if let Some(notifier) = &self.notifier {
            notifier.user_deleted(&user);
        }

        Ok(())
    }
}
