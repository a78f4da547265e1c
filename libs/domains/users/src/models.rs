use axum_helpers::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User role
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// User entity as stored in the `users` collection.
///
/// Only ever built through [`User::new`], which takes an already computed
/// password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(
        rename = "_id",
        alias = "id",
        with = "database::mongodb::uuid_string"
    )]
    pub id: Uuid,
    pub name: String,
    /// Unique, compared exactly as stored
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public view of a user. Has no password field at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Identity {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
        }
    }
}

/// Registration request. Fields are optional so that a missing field is
/// reported as "All fields are required" rather than a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 128))]
    pub password: Option<String>,
    /// Requested role, honoured only when the registration policy allows it
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthPayload {
    pub user: UserResponse,
    pub token: String,
}

/// Returns the trimmed value, or `None` when absent or blank.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_round_trips_lowercase() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::from_str("user").unwrap(), Role::User);
        assert!(Role::from_str("superuser").is_err());
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "admin");
    }

    #[test]
    fn test_user_response_has_no_password() {
        let user = User::new(
            "Alice".into(),
            "alice@example.com".into(),
            "$argon2id$hash".into(),
            Role::User,
        );
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn test_user_document_uses_string_id() {
        let user = User::new("A".into(), "a@b.c".into(), "h".into(), Role::Admin);
        let doc = mongodb::bson::to_document(&user).unwrap();
        assert_eq!(doc.get_str("_id").unwrap(), user.id.to_string());
        assert_eq!(doc.get_str("role").unwrap(), "admin");
    }

    #[test]
    fn test_identity_from_user() {
        let user = User::new("A".into(), "a@b.c".into(), "h".into(), Role::Admin);
        let identity = Identity::from(&user);
        assert_eq!(identity.id, user.id);
        assert!(identity.has_role("admin"));
    }

    #[test]
    fn test_present_treats_blank_as_missing() {
        assert_eq!(present(&Some("  bob ".into())), Some("bob"));
        assert_eq!(present(&Some("   ".into())), None);
        assert_eq!(present(&None), None);
    }
}
