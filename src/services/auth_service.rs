//! Authentication service - signup, login, session refresh and password reset.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

use super::session_service::{SessionService, TokenSigner};
use crate::domain::{AccessClaims, Password, PasswordReset, TokenPair, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::{Notifier, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Signup data
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
    /// Defaults to PARTICIPANT
    pub role: Option<UserRole>,
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub tokens: TokenPair,
}

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account. ADMIN cannot be self-assigned.
    async fn register(&self, registration: Registration) -> AppResult<User>;

    /// Check credentials and open a session
    async fn login(&self, email: String, password: String) -> AppResult<LoginOutcome>;

    /// Exchange a refresh token for a new pair
    async fn refresh(&self, refresh_token: String) -> AppResult<TokenPair>;

    /// Revoke all refresh tokens of the user
    async fn logout(&self, user_id: Uuid) -> AppResult<u64>;

    /// Email a password reset link. Unknown addresses succeed silently.
    async fn forgot_password(&self, email: String) -> AppResult<()>;

    /// Set a new password using a reset token; ends every session
    async fn reset_password(&self, token: String, new_password: String) -> AppResult<()>;

    /// Verify an access token and return its claims
    fn verify_token(&self, token: &str) -> AppResult<AccessClaims>;
}

/// Hash verified when the login email is unknown, so both paths cost one
/// Argon2 verification.
fn dummy_password() -> Option<&'static Password> {
    static DUMMY: OnceLock<Option<Password>> = OnceLock::new();
    DUMMY
        .get_or_init(|| Password::new("timing-equalizer-password").ok())
        .as_ref()
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    sessions: Arc<dyn SessionService>,
    signer: TokenSigner,
    notifier: Arc<dyn Notifier>,
    frontend_url: String,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(
        uow: Arc<U>,
        sessions: Arc<dyn SessionService>,
        signer: TokenSigner,
        notifier: Arc<dyn Notifier>,
        frontend_url: String,
    ) -> Self {
        Self {
            uow,
            sessions,
            signer,
            notifier,
            frontend_url,
        }
    }

    fn reset_link(&self, token: &str) -> String {
        format!(
            "{}/reset-password?token={}",
            self.frontend_url.trim_end_matches('/'),
            token
        )
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        let role = registration.role.unwrap_or_default();
        if role.is_admin() {
            return Err(AppError::Forbidden);
        }

        if self
            .uow
            .users()
            .find_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Email"));
        }

        let password_hash = Password::new(&registration.password)?.into_string();
        let user = User::new(
            registration.email,
            password_hash,
            registration.full_name,
            registration.phone,
            role,
        );

        // Concurrent signups still collide on the unique email index
        let user = self.uow.users().create(user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<LoginOutcome> {
        let user = self.uow.users().find_by_email(&email).await?;

        let password_valid = match &user {
            Some(user) => Password::from_hash(user.password_hash.as_str()).verify(&password),
            None => {
                if let Some(dummy) = dummy_password() {
                    dummy.verify(&password);
                }
                false
            }
        };

        let user = match user {
            Some(user) if password_valid => user,
            _ => {
                tracing::debug!("Login rejected");
                return Err(AppError::InvalidCredentials);
            }
        };

        let tokens = self.sessions.issue_token_pair(&user).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome { user, tokens })
    }

    async fn refresh(&self, refresh_token: String) -> AppResult<TokenPair> {
        match self.sessions.rotate_refresh(&refresh_token).await {
            Err(AppError::TokenRevoked) => {
                // A correctly signed token that is no longer active was
                // replayed: end every session of its subject.
                if let Ok(claims) = self.signer.verify_refresh(&refresh_token) {
                    tracing::warn!(
                        user_id = %claims.sub,
                        "Refresh token reuse detected, revoking all sessions"
                    );
                    self.sessions.revoke_all_for_user(claims.sub).await?;
                }
                Err(AppError::TokenRevoked)
            }
            other => other,
        }
    }

    async fn logout(&self, user_id: Uuid) -> AppResult<u64> {
        self.sessions.revoke_all_for_user(user_id).await
    }

    async fn forgot_password(&self, email: String) -> AppResult<()> {
        let Some(user) = self.uow.users().find_by_email(&email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let (token, expires_at) = self.signer.sign_reset(user.id)?;
        self.uow
            .password_resets()
            .replace_for_user(PasswordReset::new(user.id, token.clone(), expires_at))
            .await?;

        let body = format!(
            "Hello {},\n\nUse the link below to reset your password. \
             It expires in 10 minutes.\n\n{}\n\n\
             If you did not request a reset, you can ignore this email.",
            user.full_name,
            self.reset_link(&token)
        );
        if let Err(e) = self
            .notifier
            .send(&user.email, "Reset your password", &body)
            .await
        {
            tracing::error!(
                user_id = %user.id,
                error = %e,
                "Failed to send password reset email"
            );
        }

        tracing::info!(user_id = %user.id, "Password reset issued");
        Ok(())
    }

    async fn reset_password(&self, token: String, new_password: String) -> AppResult<()> {
        let claims = self.signer.verify_reset(&token)?;
        let password_hash = Password::new(&new_password)?.into_string();

        let user_id = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let reset = ctx
                        .password_resets()
                        .find_by_token(&token)
                        .await?
                        .ok_or(AppError::TokenInvalid)?;

                    if reset.user_id != claims.sub || reset.is_expired(Utc::now()) {
                        return Err(AppError::TokenInvalid);
                    }
                    if !ctx.password_resets().consume(reset.id).await? {
                        return Err(AppError::TokenInvalid);
                    }

                    ctx.users()
                        .update_password(reset.user_id, password_hash)
                        .await?;
                    ctx.refresh_tokens()
                        .revoke_all_for_user(reset.user_id)
                        .await?;

                    Ok(reset.user_id)
                })
            })
            .await?;

        tracing::info!(user_id = %user_id, "Password reset completed");
        Ok(())
    }

    fn verify_token(&self, token: &str) -> AppResult<AccessClaims> {
        self.sessions.verify_access(token)
    }
}
