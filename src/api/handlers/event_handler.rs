//! Event handlers.
//!
//! Listing and lookup are public; everything else is organizer-only.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{auth_middleware, require_role, CurrentUser};
use crate::api::AppState;
use crate::domain::{Event, EventPatch, EventQuery, EventType, NewEvent, UserRole};
use crate::errors::AppResult;
use crate::types::PaginatedEvents;

/// Event creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEventRequest {
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    #[schema(example = "Rust Meetup")]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Required for ONSITE events
    pub venue: Option<String>,
    /// Absolute URL, required for ONLINE events
    #[validate(url(message = "Join link must be a valid URL"))]
    pub join_link: Option<String>,
    pub contact_info: Option<String>,
    pub thumbnail: Option<String>,
    /// Omit for unlimited seating
    #[validate(range(min = 1, message = "Total seats must be at least 1"))]
    pub total_seats: Option<i32>,
}

impl From<CreateEventRequest> for NewEvent {
    fn from(req: CreateEventRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            start_at: req.start_at,
            end_at: req.end_at,
            event_type: req.event_type,
            venue: req.venue,
            join_link: req.join_link,
            contact_info: req.contact_info,
            thumbnail: req.thumbnail,
            total_seats: req.total_seats,
        }
    }
}

/// Partial event update; omitted fields keep their value
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEventRequest {
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
    pub venue: Option<String>,
    #[validate(url(message = "Join link must be a valid URL"))]
    pub join_link: Option<String>,
    pub contact_info: Option<String>,
    pub thumbnail: Option<String>,
    #[validate(range(min = 1, message = "Total seats must be at least 1"))]
    pub total_seats: Option<i32>,
    /// Remove the seat limit
    #[serde(default)]
    pub unlimited_seats: bool,
}

impl From<UpdateEventRequest> for EventPatch {
    fn from(req: UpdateEventRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            start_at: req.start_at,
            end_at: req.end_at,
            event_type: req.event_type,
            venue: req.venue,
            join_link: req.join_link,
            contact_info: req.contact_info,
            thumbnail: req.thumbnail,
            total_seats: req.total_seats,
            unlimited_seats: req.unlimited_seats,
        }
    }
}

/// Create event routes.
///
/// Public and organizer endpoints share paths, so authentication is layered
/// per method rather than on the whole router.
pub fn event_routes(state: AppState) -> Router<AppState> {
    let auth = || middleware::from_fn_with_state(state.clone(), auth_middleware);

    Router::new()
        .route(
            "/",
            get(list_events).merge(post(create_event).route_layer(auth())),
        )
        .route("/mine", get(list_my_events).route_layer(auth()))
        .route(
            "/:id",
            get(get_event).merge(
                put(update_event)
                    .delete(delete_event)
                    .route_layer(auth()),
            ),
        )
}

/// List live events
#[utoipa::path(
    get,
    path = "/events",
    tag = "Events",
    params(EventQuery),
    responses(
        (status = 200, description = "Page of events", body = PaginatedEvents)
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> AppResult<Json<PaginatedEvents>> {
    let events = state.event_service.list_events(query).await?;
    Ok(Json(events))
}

/// Get a live event
#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = "Events",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event", body = Event),
        (status = 404, description = "Event not found")
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Event>> {
    let event = state.event_service.get_event(id).await?;
    Ok(Json(event))
}

/// List events run by the caller
#[utoipa::path(
    get,
    path = "/events/mine",
    tag = "Events",
    security(("bearer_auth" = [])),
    params(EventQuery),
    responses(
        (status = 200, description = "Page of the caller's events", body = PaginatedEvents),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Organizer only")
    )
)]
pub async fn list_my_events(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> AppResult<Json<PaginatedEvents>> {
    require_role(&current_user, &[UserRole::Organizer])?;

    let events = state
        .event_service
        .list_my_events(current_user.id, query)
        .await?;
    Ok(Json(events))
}

/// Create an event
#[utoipa::path(
    post,
    path = "/events",
    tag = "Events",
    security(("bearer_auth" = [])),
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Organizer only")
    )
)]
pub async fn create_event(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<Event>)> {
    require_role(&current_user, &[UserRole::Organizer])?;

    let event = state
        .event_service
        .create_event(current_user.id, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// Update an event the caller organizes
#[utoipa::path(
    put,
    path = "/events/{id}",
    tag = "Events",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an organizer of this event"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn update_event(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateEventRequest>,
) -> AppResult<Json<Event>> {
    require_role(&current_user, &[UserRole::Organizer])?;

    let event = state
        .event_service
        .update_event(current_user.id, id, payload.into())
        .await?;

    Ok(Json(event))
}

/// Delete an event and its participants
#[utoipa::path(
    delete,
    path = "/events/{id}",
    tag = "Events",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an organizer of this event"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn delete_event(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_role(&current_user, &[UserRole::Organizer])?;

    state.event_service.delete_event(current_user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
