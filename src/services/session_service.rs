//! Session/token management.
//!
//! Access tokens are verified statelessly: a revoked session keeps working
//! until its access token expires (one access TTL at most), and role claims
//! lag role changes by the same window. Refresh tokens are checked against
//! the store on every use and are single-use.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{Config, PASSWORD_RESET_TTL_MINUTES, SECONDS_PER_MINUTE, TOKEN_TYPE_BEARER};
use crate::domain::{AccessClaims, RefreshToken, SubjectClaims, TokenPair, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// HS256 signing and verification for the three token kinds.
///
/// Each kind has its own secret, so a token of one kind never verifies as
/// another.
#[derive(Clone)]
pub struct TokenSigner {
    config: Config,
}

impl TokenSigner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn access_ttl(&self) -> Duration {
        Duration::minutes(self.config.access_token_ttl_minutes)
    }

    fn refresh_ttl(&self) -> Duration {
        Duration::days(self.config.refresh_token_ttl_days)
    }

    fn sign<C: Serialize>(claims: &C, secret: &[u8]) -> AppResult<String> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .map_err(|e| AppError::internal(format!("Token signing failed: {}", e)))
    }

    fn verify<C: DeserializeOwned>(token: &str, secret: &[u8]) -> AppResult<C> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<C>(token, &DecodingKey::from_secret(secret), &validation)?;
        Ok(data.claims)
    }

    fn subject_claims(
        user_id: Uuid,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> SubjectClaims {
        SubjectClaims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Sign a fresh access/refresh pair for `user` and build the refresh row
    /// the caller must persist.
    pub fn mint(&self, user: &User) -> AppResult<(TokenPair, RefreshToken)> {
        let now = Utc::now();

        let access_claims = AccessClaims {
            sub: user.id,
            role: user.role,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl()).timestamp(),
        };
        let access_token = Self::sign(&access_claims, self.config.access_secret_bytes())?;

        let refresh_expires_at = now + self.refresh_ttl();
        let refresh_claims = Self::subject_claims(user.id, now, refresh_expires_at);
        let refresh_token = Self::sign(&refresh_claims, self.config.refresh_secret_bytes())?;

        let row = RefreshToken::new(refresh_token.clone(), user.id, refresh_expires_at);
        let pair = TokenPair {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.access_token_ttl_minutes * SECONDS_PER_MINUTE,
        };

        Ok((pair, row))
    }

    /// Sign a password reset token, returning it with its expiry.
    pub fn sign_reset(&self, user_id: Uuid) -> AppResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(PASSWORD_RESET_TTL_MINUTES);
        let claims = Self::subject_claims(user_id, now, expires_at);

        let token = Self::sign(&claims, self.config.reset_secret_bytes())?;
        Ok((token, expires_at))
    }

    pub fn verify_access(&self, token: &str) -> AppResult<AccessClaims> {
        Self::verify(token, self.config.access_secret_bytes())
    }

    pub fn verify_refresh(&self, token: &str) -> AppResult<SubjectClaims> {
        Self::verify(token, self.config.refresh_secret_bytes())
    }

    pub fn verify_reset(&self, token: &str) -> AppResult<SubjectClaims> {
        Self::verify(token, self.config.reset_secret_bytes())
    }
}

/// Session manager trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Issue an access/refresh pair and persist the refresh token.
    async fn issue_token_pair(&self, user: &User) -> AppResult<TokenPair>;

    /// Check signature and expiry of an access token. No I/O.
    fn verify_access(&self, token: &str) -> AppResult<AccessClaims>;

    /// Exchange a refresh token for a new pair. The old token is revoked in
    /// the same transaction that stores its replacement.
    async fn rotate_refresh(&self, refresh_token: &str) -> AppResult<TokenPair>;

    /// Revoke every active refresh token of a user. Idempotent.
    async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64>;
}

/// Concrete implementation of SessionService using Unit of Work.
pub struct SessionManager<U: UnitOfWork> {
    uow: Arc<U>,
    signer: TokenSigner,
}

impl<U: UnitOfWork> SessionManager<U> {
    pub fn new(uow: Arc<U>, signer: TokenSigner) -> Self {
        Self { uow, signer }
    }
}

#[async_trait]
impl<U: UnitOfWork> SessionService for SessionManager<U> {
    async fn issue_token_pair(&self, user: &User) -> AppResult<TokenPair> {
        let (pair, row) = self.signer.mint(user)?;
        self.uow.refresh_tokens().create(row).await?;

        tracing::debug!(user_id = %user.id, "Issued token pair");
        Ok(pair)
    }

    fn verify_access(&self, token: &str) -> AppResult<AccessClaims> {
        self.signer.verify_access(token)
    }

    async fn rotate_refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.signer.verify_refresh(refresh_token)?;

        let stored = self
            .uow
            .refresh_tokens()
            .find_by_token(refresh_token)
            .await?;
        match stored {
            Some(row) if row.user_id == claims.sub && row.is_valid(Utc::now()) => {}
            _ => return Err(AppError::TokenRevoked),
        }

        let signer = self.signer.clone();
        let old_token = refresh_token.to_string();
        let user_id = claims.sub;

        let pair = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    // Lost race: someone else consumed this token first
                    if !ctx.refresh_tokens().revoke_if_active(&old_token).await? {
                        return Err(AppError::TokenRevoked);
                    }

                    let user = ctx
                        .users()
                        .find_by_id(user_id)
                        .await?
                        .ok_or(AppError::TokenRevoked)?;

                    let (pair, row) = signer.mint(&user)?;
                    ctx.refresh_tokens().create(row).await?;
                    Ok(pair)
                })
            })
            .await?;

        tracing::debug!(user_id = %user_id, "Rotated refresh token");
        Ok(pair)
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let revoked = self.uow.refresh_tokens().revoke_all_for_user(user_id).await?;

        tracing::info!(user_id = %user_id, revoked, "Revoked refresh tokens");
        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;

    fn signer() -> TokenSigner {
        TokenSigner::new(Config::with_secrets(
            "access-secret-for-unit-tests-0000000",
            "refresh-secret-for-unit-tests-000000",
            "reset-secret-for-unit-tests-00000000",
        ))
    }

    fn user() -> User {
        User::new(
            "unit@example.com".into(),
            "hash".into(),
            "Unit Test".into(),
            None,
            UserRole::Organizer,
        )
    }

    #[test]
    fn test_access_token_round_trip() {
        let signer = signer();
        let user = user();
        let (pair, _) = signer.mint(&user).unwrap();

        let claims = signer.verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, UserRole::Organizer);
        assert_eq!(pair.expires_in, 15 * 60);
    }

    #[test]
    fn test_tokens_are_unique_within_a_second() {
        let signer = signer();
        let user = user();
        let (first, _) = signer.mint(&user).unwrap();
        let (second, _) = signer.mint(&user).unwrap();

        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);
    }

    #[test]
    fn test_token_kinds_do_not_cross_verify() {
        let signer = signer();
        let (pair, _) = signer.mint(&user()).unwrap();

        assert!(matches!(
            signer.verify_access(&pair.refresh_token),
            Err(AppError::TokenInvalid)
        ));
        assert!(matches!(
            signer.verify_refresh(&pair.access_token),
            Err(AppError::TokenInvalid)
        ));
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        let signer = signer();
        let past = Utc::now() - Duration::minutes(5);
        let claims =
            TokenSigner::subject_claims(Uuid::new_v4(), past, past + Duration::minutes(1));
        let token = TokenSigner::sign(&claims, b"refresh-secret-for-unit-tests-000000").unwrap();

        assert!(matches!(
            signer.verify_refresh(&token),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert!(matches!(
            signer().verify_access("not.a.jwt"),
            Err(AppError::TokenInvalid)
        ));
    }

    #[test]
    fn test_refresh_row_matches_pair() {
        let user = user();
        let (pair, row) = signer().mint(&user).unwrap();

        assert_eq!(row.token, pair.refresh_token);
        assert_eq!(row.user_id, user.id);
        assert!(row.is_valid(Utc::now()));
    }
}
