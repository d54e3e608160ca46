//! Outbound notifications.
//!
//! Delivery is best effort: callers log a failed `send` and carry on.

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use async_trait::async_trait;

use crate::errors::{AppError, AppResult};
use crate::jobs::EmailJob;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// Queues emails in PostgreSQL for the background worker.
#[derive(Clone)]
pub struct JobQueueNotifier {
    storage: PostgresStorage<EmailJob>,
}

impl JobQueueNotifier {
    pub fn new(storage: PostgresStorage<EmailJob>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Notifier for JobQueueNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let mut storage = self.storage.clone();
        storage
            .push(EmailJob::new(to, subject, body))
            .await
            .map_err(|e| AppError::internal(format!("Failed to enqueue email: {}", e)))?;

        tracing::debug!(to, subject, "Email queued");
        Ok(())
    }
}

/// Writes notifications to the log only.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        tracing::info!(to, subject, body, "Notification (log only)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let notifier: Box<dyn Notifier> = Box::new(LogNotifier);
        assert!(notifier
            .send("someone@example.com", "Hello", "Body")
            .await
            .is_ok());
    }
}
