//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, event_handler, participant_handler, user_handler};
use crate::domain::{
    Decision, Event, EventFilter, EventType, Participant, ParticipantDetails, ParticipantStatus,
    TokenPair, UserResponse, UserRole,
};
use crate::types::{
    MessageResponse, PaginatedEvents, PaginatedParticipants, PaginatedUsers, PaginationMeta,
};

/// OpenAPI documentation for the Event Hub API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Event Hub API",
        version = "0.1.0",
        description = "Event management backend: accounts, events and participation requests"
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        auth_handler::refresh,
        auth_handler::logout,
        auth_handler::forgot_password,
        auth_handler::reset_password,
        // User endpoints
        user_handler::get_current_user,
        user_handler::update_current_user,
        user_handler::change_password,
        user_handler::list_users,
        user_handler::update_role,
        user_handler::delete_user,
        // Event endpoints
        event_handler::list_events,
        event_handler::get_event,
        event_handler::list_my_events,
        event_handler::create_event,
        event_handler::update_event,
        event_handler::delete_event,
        // Participation endpoints
        participant_handler::request_join,
        participant_handler::list_my_requests,
        participant_handler::list_for_organizer,
        participant_handler::decide,
        participant_handler::cancel,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            TokenPair,
            Event,
            EventType,
            EventFilter,
            Participant,
            ParticipantDetails,
            ParticipantStatus,
            Decision,
            // Shared types
            MessageResponse,
            PaginationMeta,
            PaginatedUsers,
            PaginatedEvents,
            PaginatedParticipants,
            // Auth types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::LoginResponse,
            auth_handler::RefreshRequest,
            auth_handler::ForgotPasswordRequest,
            auth_handler::ResetPasswordRequest,
            // User handler types
            user_handler::UpdateProfileRequest,
            user_handler::ChangePasswordRequest,
            user_handler::UpdateRoleRequest,
            // Event handler types
            event_handler::CreateEventRequest,
            event_handler::UpdateEventRequest,
            // Participation handler types
            participant_handler::JoinRequest,
            participant_handler::DecisionRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Signup, login, sessions and password reset"),
        (name = "Users", description = "Profiles and user management"),
        (name = "Events", description = "Event listing and organizer maintenance"),
        (name = "Participants", description = "Join requests and organizer decisions")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
