//! Repository layer - Data access abstraction
//!
//! Each repository exposes a mockable trait backed by the connection pool.
//! The same queries are reused inside a unit of work through the
//! connection-generic functions of each module.

pub(crate) mod entities;
pub(crate) mod event_repository;
pub(crate) mod participant_repository;
pub(crate) mod password_reset_repository;
pub(crate) mod refresh_token_repository;
pub(crate) mod user_repository;

pub use event_repository::{EventRepository, EventStore};
pub use participant_repository::{ParticipantRepository, ParticipantStore};
pub use password_reset_repository::{PasswordResetRepository, PasswordResetStore};
pub use refresh_token_repository::{RefreshTokenRepository, RefreshTokenStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use event_repository::MockEventRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use participant_repository::MockParticipantRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use password_reset_repository::MockPasswordResetRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use refresh_token_repository::MockRefreshTokenRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
