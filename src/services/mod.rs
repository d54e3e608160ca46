//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management.

mod auth_service;
pub mod container;
mod event_service;
mod participant_service;
mod session_service;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, LoginOutcome, Registration};
pub use event_service::{EventManager, EventService};
pub use participant_service::{ParticipantManager, ParticipantService};
pub use session_service::{SessionManager, SessionService, TokenSigner};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use event_service::MockEventService;
#[cfg(any(test, feature = "test-utils"))]
pub use participant_service::MockParticipantService;
#[cfg(any(test, feature = "test-utils"))]
pub use session_service::MockSessionService;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
