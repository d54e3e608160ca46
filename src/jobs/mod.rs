//! Background jobs processed by the `jobs work` worker.

mod email_job;

use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::{PgPool, PgPoolOptions};
use apalis_sql::Config as QueueConfig;

use crate::config::JOB_NAME_EMAIL;
use crate::errors::{AppError, AppResult};

pub use email_job::{email_job_handler, EmailJob};

/// Connect to the job queue database and create the queue tables if needed.
pub async fn connect_queue(database_url: &str) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect to job queue: {}", e)))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to set up job storage: {}", e)))?;

    Ok(pool)
}

/// Storage for email jobs, namespaced so queue queries can target them.
pub fn email_storage(pool: PgPool) -> PostgresStorage<EmailJob> {
    PostgresStorage::new_with_config(pool, QueueConfig::new(JOB_NAME_EMAIL))
}
