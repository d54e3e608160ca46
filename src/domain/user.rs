//! User domain entity and related types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_ORGANIZER, ROLE_PARTICIPANT};
use crate::errors::AppError;

/// User roles enumeration
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    Organizer,
    #[default]
    Participant,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => ROLE_ADMIN,
            UserRole::Organizer => ROLE_ORGANIZER,
            UserRole::Participant => ROLE_PARTICIPANT,
        }
    }

    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Whether a user holding this role may assign `target` to someone else.
    ///
    /// Admins assign any role; organizers may only promote participants to
    /// organizers or demote back.
    pub fn can_assign(&self, target: UserRole) -> bool {
        match self {
            UserRole::Admin => true,
            UserRole::Organizer => !target.is_admin(),
            UserRole::Participant => false,
        }
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            ROLE_ADMIN => Ok(UserRole::Admin),
            ROLE_ORGANIZER => Ok(UserRole::Organizer),
            ROLE_PARTICIPANT => Ok(UserRole::Participant),
            other => Err(AppError::validation(format!("Unknown role: {}", other))),
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(
        email: String,
        password_hash: String,
        full_name: String,
        phone: Option<String>,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            full_name,
            phone,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// User profile update
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Full name
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    /// Contact phone
    #[schema(example = "+1 555 0100")]
    pub phone: Option<String>,
    /// User role
    pub role: UserRole,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_is_case_insensitive() {
        assert_eq!("organizer".parse::<UserRole>().unwrap(), UserRole::Organizer);
        assert_eq!("ADMIN".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("guest".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_serializes_uppercase() {
        let json = serde_json::to_string(&UserRole::Participant).unwrap();
        assert_eq!(json, "\"PARTICIPANT\"");
    }

    #[test]
    fn test_organizer_cannot_assign_admin() {
        assert!(UserRole::Organizer.can_assign(UserRole::Organizer));
        assert!(UserRole::Organizer.can_assign(UserRole::Participant));
        assert!(!UserRole::Organizer.can_assign(UserRole::Admin));
        assert!(UserRole::Admin.can_assign(UserRole::Admin));
        assert!(!UserRole::Participant.can_assign(UserRole::Participant));
    }

    #[test]
    fn test_response_hides_password_hash() {
        let user = User::new(
            "a@b.io".into(),
            "hash".into(),
            "A B".into(),
            None,
            UserRole::default(),
        );
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "PARTICIPANT");
    }
}
