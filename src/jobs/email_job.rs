//! Email background job.
//!
//! Emails are queued by the notifier and delivered by the `jobs work`
//! worker. Without `SMTP_HOST` the worker logs each message instead of
//! sending it.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use std::env;

use crate::config::{DEFAULT_SMTP_FROM, DEFAULT_SMTP_PORT};
use crate::errors::AppError;

/// Email job payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailJob {
    /// Recipient email address
    pub to: String,
    /// Email subject line
    pub subject: String,
    /// Plain text body
    pub body: String,
}

impl EmailJob {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// SMTP settings read from the environment.
struct SmtpConfig {
    host: Option<String>,
    port: u16,
    user: Option<String>,
    pass: Option<String>,
    from: String,
}

impl SmtpConfig {
    fn from_env() -> Self {
        Self {
            host: env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            port: env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            user: env::var("SMTP_USER").ok(),
            pass: env::var("SMTP_PASS").ok(),
            from: env::var("SMTP_FROM").unwrap_or_else(|_| DEFAULT_SMTP_FROM.to_string()),
        }
    }

    fn transport(&self, host: &str) -> Result<AsyncSmtpTransport<Tokio1Executor>, AppError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::internal(format!("SMTP relay error: {}", e)))?
            .port(self.port);

        if let (Some(user), Some(pass)) = (&self.user, &self.pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(builder.build())
    }
}

fn build_message(job: &EmailJob, from: &str) -> Result<Message, AppError> {
    Message::builder()
        .from(
            from.parse()
                .map_err(|e| AppError::internal(format!("Invalid from address: {}", e)))?,
        )
        .to(job
            .to
            .parse()
            .map_err(|e| AppError::validation(format!("Invalid recipient address: {}", e)))?)
        .subject(job.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(job.body.clone())
        .map_err(|e| AppError::internal(format!("Failed to build email: {}", e)))
}

/// Email job handler - processes email sending jobs
pub async fn email_job_handler(job: EmailJob) -> Result<(), AppError> {
    let config = SmtpConfig::from_env();

    tracing::info!(to = %job.to, subject = %job.subject, "Processing email job");

    let message = build_message(&job, &config.from)?;

    let Some(host) = config.host.as_deref() else {
        tracing::warn!("SMTP not configured - logging email instead of sending");
        tracing::info!(
            from = %config.from,
            to = %job.to,
            subject = %job.subject,
            body = %job.body,
            "Email not sent"
        );
        return Ok(());
    };

    config
        .transport(host)?
        .send(message)
        .await
        .map_err(|e| AppError::internal(format!("Failed to send email: {}", e)))?;

    tracing::info!(to = %job.to, "Email sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_job_serializes() {
        let job = EmailJob::new("user@example.com", "Hello", "Body");
        let json = serde_json::to_string(&job).unwrap();
        let parsed: EmailJob = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, job);
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let job = EmailJob::new("not an address", "Hello", "Body");
        assert!(build_message(&job, DEFAULT_SMTP_FROM).is_err());
    }

    #[test]
    fn test_build_message() {
        let job = EmailJob::new("user@example.com", "Hello", "Body");
        assert!(build_message(&job, DEFAULT_SMTP_FROM).is_ok());
    }
}
