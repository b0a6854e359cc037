//! User domain model

use crate::domain::StringUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Account role. Stored lowercase in the `users.role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Seller,
    Client,
}

impl Role {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Seller => "Shop",
            Role::Client => "Client",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seller => "seller",
            Role::Client => "client",
        }
    }

    /// Parse a single role token
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim() {
            "admin" => Some(Role::Admin),
            "seller" => Some(Role::Seller),
            "client" => Some(Role::Client),
            _ => None,
        }
    }

    /// Parse a pipe-separated role specification such as `"seller|admin"`.
    ///
    /// Unknown tokens are discarded; the result preserves order.
    pub fn parse_spec(spec: &str) -> Vec<Role> {
        spec.split('|').filter_map(Role::parse).collect()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: StringUuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trimmed projection returned by the per-role listing endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: StringUuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            is_active: user.is_active,
        }
    }
}

/// Validated row ready for insertion, built by the service layer
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub is_active: bool,
}

/// Column-level changes applied by the repository. `None` keeps the
/// current value.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// Self-service registration input. Looser than the admin create rules
/// and requires the password to be typed twice.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 2, message = "The name must be at least 2 characters."))]
    #[validate(length(max = 100, message = "The name may not be greater than 100 characters."))]
    pub name: String,

    #[validate(length(min = 1, message = "The email field is required."))]
    #[validate(email(message = "The email must be a valid email address."))]
    #[validate(length(max = 100, message = "The email may not be greater than 100 characters."))]
    pub email: String,

    #[validate(length(min = 6, message = "The password must be at least 6 characters."))]
    #[validate(must_match(
        other = "password_confirmation",
        message = "The password confirmation does not match."
    ))]
    pub password: String,

    pub password_confirmation: String,

    /// Role token; absent means client
    pub role: Option<String>,

    #[validate(length(max = 20, message = "The phone may not be greater than 20 characters."))]
    pub phone: Option<String>,

    #[validate(length(max = 255, message = "The address may not be greater than 255 characters."))]
    pub address: Option<String>,
}

/// Input for creating a user (admin create)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, message = "The name field is required."))]
    #[validate(length(max = 255, message = "The name may not be greater than 255 characters."))]
    pub name: String,

    #[validate(length(min = 1, message = "The email field is required."))]
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,

    #[validate(length(min = 8, message = "The password must be at least 8 characters."))]
    pub password: String,

    /// Role token, checked against the known roles by the service
    pub role: String,

    #[validate(length(max = 20, message = "The phone may not be greater than 20 characters."))]
    pub phone: Option<String>,

    #[validate(length(max = 500, message = "The address may not be greater than 500 characters."))]
    pub address: Option<String>,

    /// Absent means active
    pub is_active: Option<bool>,
}

/// Input for updating a user. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(length(min = 1, message = "The name field is required."))]
    #[validate(length(max = 255, message = "The name may not be greater than 255 characters."))]
    pub name: Option<String>,

    #[validate(email(message = "The email must be a valid email address."))]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "The password must be at least 8 characters."))]
    pub password: Option<String>,

    pub role: Option<String>,

    #[validate(length(max = 20, message = "The phone may not be greater than 20 characters."))]
    pub phone: Option<String>,

    #[validate(length(max = 500, message = "The address may not be greater than 500 characters."))]
    pub address: Option<String>,

    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::Admin.label(), "Administrator");
        assert_eq!(Role::Seller.label(), "Shop");
        assert_eq!(Role::Client.label(), "Client");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse(" seller "), Some(Role::Seller));
        assert_eq!(Role::parse("client"), Some(Role::Client));
        assert_eq!(Role::parse("superadmin"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_role_parse_spec() {
        assert_eq!(
            Role::parse_spec("seller|admin"),
            vec![Role::Seller, Role::Admin]
        );
        assert_eq!(Role::parse_spec("admin"), vec![Role::Admin]);
        // Unknown tokens are dropped, not rejected
        assert_eq!(Role::parse_spec("admin|wizard"), vec![Role::Admin]);
        assert!(Role::parse_spec("wizard|ghost").is_empty());
        assert!(Role::parse_spec("").is_empty());
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"seller\"").unwrap();
        assert_eq!(role, Role::Seller);
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User {
            id: StringUuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            phone: None,
            address: None,
            role: Role::Client,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(json.contains("alice@example.com"));
        assert!(json.contains("\"role\":\"client\""));
    }

    #[test]
    fn test_create_user_input_validation() {
        let input = CreateUserInput {
            name: "".to_string(),
            email: "bad".to_string(),
            password: "short".to_string(),
            role: "client".to_string(),
            phone: None,
            address: None,
            is_active: None,
        };

        let errors = input.validate().unwrap_err();
        let map = errors.errors();
        assert!(map.contains_key("name"));
        assert!(map.contains_key("email"));
        assert!(map.contains_key("password"));
    }

    #[test]
    fn test_create_user_input_valid() {
        let input = CreateUserInput {
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "supersecret".to_string(),
            role: "seller".to_string(),
            phone: Some("555-0100".to_string()),
            address: Some("1 Main St".to_string()),
            is_active: Some(false),
        };

        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_update_user_input_empty_is_valid() {
        let input = UpdateUserInput::default();
        assert!(input.validate().is_ok());
    }

    fn register_input() -> RegisterInput {
        RegisterInput {
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "secret1".to_string(),
            password_confirmation: "secret1".to_string(),
            role: None,
            phone: None,
            address: None,
        }
    }

    #[test]
    fn test_register_input_valid() {
        assert!(register_input().validate().is_ok());
    }

    #[test]
    fn test_register_input_confirmation_mismatch() {
        let mut input = register_input();
        input.password_confirmation = "something-else".to_string();

        let errors = input.validate().unwrap_err();
        assert!(errors.errors().contains_key("password"));
    }

    #[test]
    fn test_register_input_short_name() {
        let mut input = register_input();
        input.name = "B".to_string();

        let errors = input.validate().unwrap_err();
        assert!(errors.errors().contains_key("name"));
    }

    #[test]
    fn test_user_summary_projection() {
        let user = User {
            id: StringUuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            phone: Some("555-0100".to_string()),
            address: Some("1 Main St".to_string()),
            role: Role::Seller,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let summary = UserSummary::from(user);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["email"], "alice@example.com");
        assert_eq!(json["phone"], "555-0100");
        assert!(json.get("address").is_none());
        assert!(json.get("role").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
