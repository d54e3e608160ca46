//! Session credentials: stored refresh tokens, token claims and the pair
//! handed back to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserRole;

/// Persisted refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn new(token: String, user_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            token,
            user_id,
            expires_at,
            revoked_at: None,
            created_at: Utc::now(),
        }
    }

    /// Usable iff never revoked and not past its expiry.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id
    pub sub: Uuid,
    pub role: UserRole,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by refresh and password reset tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectClaims {
    /// User id
    pub sub: Uuid,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Access/refresh credential pair
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    /// Short-lived bearer token
    pub access_token: String,
    /// Long-lived token exchanged at `/auth/refresh`
    pub refresh_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds
    #[schema(example = 900)]
    pub expires_in: i64,
}

/// Stored password reset request.
#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PasswordReset {
    pub fn new(user_id: Uuid, token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token,
            expires_at,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_refresh_token_validity() {
        let now = Utc::now();
        let mut token = RefreshToken::new("t".into(), Uuid::new_v4(), now + Duration::days(7));
        assert!(token.is_valid(now));

        token.revoked_at = Some(now);
        assert!(!token.is_valid(now));
    }

    #[test]
    fn test_refresh_token_expires() {
        let now = Utc::now();
        let token = RefreshToken::new("t".into(), Uuid::new_v4(), now);
        assert!(!token.is_valid(now));
    }

    #[test]
    fn test_password_reset_expiry() {
        let now = Utc::now();
        let reset = PasswordReset::new(Uuid::new_v4(), "r".into(), now + Duration::minutes(10));
        assert!(!reset.is_expired(now));
        assert!(reset.is_expired(now + Duration::minutes(10)));
    }
}
