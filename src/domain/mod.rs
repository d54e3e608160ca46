//! Domain layer - Core business entities and logic
//!
//! Accounts, sessions, events and the participation state machine,
//! independent of persistence and transport.

pub mod event;
pub mod participant;
pub mod password;
pub mod session;
pub mod user;

pub use event::{Event, EventFilter, EventPatch, EventQuery, EventType, NewEvent};
pub use participant::{Decision, Participant, ParticipantDetails, ParticipantStatus};
pub use password::Password;
pub use session::{AccessClaims, PasswordReset, RefreshToken, SubjectClaims, TokenPair};
pub use user::{UpdateProfile, User, UserResponse, UserRole};
