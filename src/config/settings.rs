//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_ACCESS_TOKEN_TTL_MINUTES, DEFAULT_DATABASE_URL, DEFAULT_FRONTEND_URL,
    DEFAULT_REDIS_URL, DEFAULT_REFRESH_TOKEN_TTL_DAYS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    MIN_JWT_SECRET_LENGTH,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    access_secret: String,
    refresh_secret: String,
    reset_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub server_host: String,
    pub server_port: u16,
    pub frontend_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("access_secret", &"[REDACTED]")
            .field("refresh_secret", &"[REDACTED]")
            .field("reset_secret", &"[REDACTED]")
            .field("access_token_ttl_minutes", &self.access_token_ttl_minutes)
            .field("refresh_token_ttl_days", &self.refresh_token_ttl_days)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("frontend_url", &self.frontend_url)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if a signing secret is missing in release builds or shorter
    /// than the minimum length.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let access_secret =
            secret_from_env("JWT_ACCESS_SECRET", "dev-access-secret-minimum-32-chars!");
        let refresh_secret =
            secret_from_env("JWT_REFRESH_SECRET", "dev-refresh-secret-minimum-32-chars");
        let reset_secret =
            secret_from_env("JWT_RESET_SECRET", "dev-reset-secret-minimum-32-chars!!");

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            access_secret,
            refresh_secret,
            reset_secret,
            access_token_ttl_minutes: env::var("JWT_ACCESS_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL_MINUTES),
            refresh_token_ttl_days: env::var("JWT_REFRESH_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REFRESH_TOKEN_TTL_DAYS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
        }
    }

    /// Build a configuration with explicit signing secrets and default
    /// everything else. Used by tests and embedded setups.
    pub fn with_secrets(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        reset_secret: impl Into<String>,
    ) -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            reset_secret: reset_secret.into(),
            access_token_ttl_minutes: DEFAULT_ACCESS_TOKEN_TTL_MINUTES,
            refresh_token_ttl_days: DEFAULT_REFRESH_TOKEN_TTL_DAYS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
        }
    }

    /// Secret bytes for access token signing/verification.
    pub fn access_secret_bytes(&self) -> &[u8] {
        self.access_secret.as_bytes()
    }

    /// Secret bytes for refresh token signing/verification.
    pub fn refresh_secret_bytes(&self) -> &[u8] {
        self.refresh_secret.as_bytes()
    }

    /// Secret bytes for password reset token signing/verification.
    pub fn reset_secret_bytes(&self) -> &[u8] {
        self.reset_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn secret_from_env(name: &str, dev_default: &str) -> String {
    let secret = env::var(name).unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            tracing::warn!("{} not set, using insecure default for development", name);
            dev_default.to_string()
        } else {
            panic!("{} environment variable must be set in production", name);
        }
    });

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        panic!(
            "{} must be at least {} characters long",
            name, MIN_JWT_SECRET_LENGTH
        );
    }

    secret
}
