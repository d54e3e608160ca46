//! Event Hub API - event management backend.
//!
//! Accounts with role-based access, JWT sessions with rotating refresh
//! tokens, events with seat limits and an organizer-driven participation
//! workflow.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and rules
//! - **services**: Application use cases (sessions, auth, users, events,
//!   participation)
//! - **infra**: Database, Unit of Work, Redis and outbound email
//! - **jobs**: Background email delivery
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Deliver queued emails
//! cargo run -- jobs work
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Event, Participant, ParticipantStatus, Password, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::{Cache, Database};
