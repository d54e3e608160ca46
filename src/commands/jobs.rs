//! Jobs command - email queue management.
//!
//! - `work`: deliver queued emails until Ctrl+C
//! - `list`: email job counts per status
//! - `clear`: drop failed email jobs

use apalis::prelude::*;
use apalis_sql::sqlx;

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::{Config, JOB_NAME_EMAIL};
use crate::errors::{AppError, AppResult};
use crate::jobs::{connect_queue, email_job_handler, email_storage};

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    let pool = connect_queue(&config.database_url).await?;

    match args.action {
        JobsAction::Work => run_worker(pool).await,
        JobsAction::List => list_jobs(&pool).await,
        JobsAction::Clear => clear_failed_jobs(&pool).await,
    }
}

async fn run_worker(pool: sqlx::PgPool) -> AppResult<()> {
    let worker = WorkerBuilder::new("email-worker")
        .backend(email_storage(pool))
        .build_fn(email_job_handler);

    tracing::info!(queue = JOB_NAME_EMAIL, "Email worker started. Press Ctrl+C to stop.");

    tokio::select! {
        result = Monitor::new().register(worker).run() => {
            result.map_err(|e| AppError::internal(format!("Worker failed: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
        }
    }

    tracing::info!("Email worker stopped");
    Ok(())
}

async fn list_jobs(pool: &sqlx::PgPool) -> AppResult<()> {
    let counts: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status::text, COUNT(*)::bigint FROM apalis.jobs \
         WHERE job_type = $1 GROUP BY status ORDER BY status",
    )
    .bind(JOB_NAME_EMAIL)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::internal(format!("Query failed: {}", e)))?;

    println!("\n=== Email queue ===");
    if counts.is_empty() {
        println!("No jobs.");
    }
    for (status, count) in counts {
        println!("{:<10}{}", status, count);
    }
    println!("===================\n");

    Ok(())
}

async fn clear_failed_jobs(pool: &sqlx::PgPool) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM apalis.jobs WHERE job_type = $1 AND status = 'Failed'")
        .bind(JOB_NAME_EMAIL)
        .execute(pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to clear jobs: {}", e)))?;

    println!("Cleared {} failed email job(s).", result.rows_affected());
    Ok(())
}
