//! Infrastructure layer - External systems integration
//!
//! - Database connections, migrations and repositories
//! - Unit of Work for transaction management
//! - Redis connection for rate limiting
//! - Outbound email notifications

pub mod cache;
pub mod db;
pub mod notifier;
pub mod repositories;
pub mod unit_of_work;

pub use cache::{Cache, RateLimitStore};
pub use db::{Database, Migrator};
pub use notifier::{JobQueueNotifier, LogNotifier, Notifier};
pub use repositories::{
    EventRepository, ParticipantRepository, PasswordResetRepository, RefreshTokenRepository,
    UserRepository,
};
pub use unit_of_work::{Persistence, TransactionContext, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::MockRateLimitStore;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockEventRepository, MockParticipantRepository, MockPasswordResetRepository,
    MockRefreshTokenRepository, MockUserRepository,
};
