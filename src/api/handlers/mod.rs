//! HTTP request handlers.

pub mod auth_handler;
pub mod event_handler;
pub mod participant_handler;
pub mod user_handler;

pub use auth_handler::{auth_routes, session_routes};
pub use event_handler::event_routes;
pub use participant_handler::participant_routes;
pub use user_handler::user_routes;
