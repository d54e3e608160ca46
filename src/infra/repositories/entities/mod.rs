//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod event;
pub mod event_organizer;
pub mod participant;
pub mod password_reset;
pub mod refresh_token;
pub mod user;
