//! Shared types for DRY compliance.

mod pagination;
mod response;

pub use pagination::{
    Paginated, PaginatedEvents, PaginatedParticipants, PaginatedUsers, PaginationMeta,
    PaginationParams,
};
pub use response::MessageResponse;
