//! Participation handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::domain::{Decision, Participant, ParticipantStatus, UserRole};
use crate::errors::AppResult;
use crate::types::{PaginatedParticipants, PaginationParams};

/// Join request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct JoinRequest {
    pub event_id: Uuid,
}

/// Organizer decision on a request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DecisionRequest {
    /// APPROVED or REJECTED
    pub status: Decision,
}

/// Participation listing query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ParticipantQuery {
    /// Page number (1-indexed)
    pub page: Option<u64>,
    /// Items per page
    pub per_page: Option<u64>,
    /// Only requests in this state
    pub status: Option<ParticipantStatus>,
}

/// Create participation routes
pub fn participant_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(request_join))
        .route("/mine", get(list_my_requests))
        .route("/organizer", get(list_for_organizer))
        .route("/:id/status", put(decide))
        .route("/:id", delete(cancel))
}

/// Ask to join an event
#[utoipa::path(
    post,
    path = "/participants",
    tag = "Participants",
    security(("bearer_auth" = [])),
    request_body = JoinRequest,
    responses(
        (status = 201, description = "Request created (PENDING)", body = Participant),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Participant only"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Already requested")
    )
)]
pub async fn request_join(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<JoinRequest>,
) -> AppResult<(StatusCode, Json<Participant>)> {
    require_role(&current_user, &[UserRole::Participant])?;

    let participant = state
        .participant_service
        .request_join(current_user.id, payload.event_id)
        .await?;

    Ok((StatusCode::CREATED, Json(participant)))
}

/// List the caller's requests
#[utoipa::path(
    get,
    path = "/participants/mine",
    tag = "Participants",
    security(("bearer_auth" = [])),
    params(ParticipantQuery),
    responses(
        (status = 200, description = "Page of requests", body = PaginatedParticipants),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Participant only")
    )
)]
pub async fn list_my_requests(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<ParticipantQuery>,
) -> AppResult<Json<PaginatedParticipants>> {
    require_role(&current_user, &[UserRole::Participant])?;

    let page = state
        .participant_service
        .list_my_requests(
            current_user.id,
            query.status,
            PaginationParams::new(query.page, query.per_page),
        )
        .await?;

    Ok(Json(page))
}

/// List requests on the caller's events
#[utoipa::path(
    get,
    path = "/participants/organizer",
    tag = "Participants",
    security(("bearer_auth" = [])),
    params(ParticipantQuery),
    responses(
        (status = 200, description = "Page of requests", body = PaginatedParticipants),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Organizer only")
    )
)]
pub async fn list_for_organizer(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<ParticipantQuery>,
) -> AppResult<Json<PaginatedParticipants>> {
    require_role(&current_user, &[UserRole::Organizer])?;

    let page = state
        .participant_service
        .list_for_organizer(
            current_user.id,
            query.status,
            PaginationParams::new(query.page, query.per_page),
        )
        .await?;

    Ok(Json(page))
}

/// Approve or reject a request
#[utoipa::path(
    put,
    path = "/participants/{id}/status",
    tag = "Participants",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Participant ID")
    ),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Current state of the request", body = Participant),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an organizer of this event"),
        (status = 404, description = "Request or event not found"),
        (status = 409, description = "No seats left")
    )
)]
pub async fn decide(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<DecisionRequest>,
) -> AppResult<Json<Participant>> {
    require_role(&current_user, &[UserRole::Organizer])?;

    let participant = state
        .participant_service
        .decide(current_user.id, id, payload.status)
        .await?;

    Ok(Json(participant))
}

/// Withdraw a pending request
#[utoipa::path(
    delete,
    path = "/participants/{id}",
    tag = "Participants",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Participant ID")
    ),
    responses(
        (status = 204, description = "Request withdrawn"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not your request"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already decided")
    )
)]
pub async fn cancel(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_role(&current_user, &[UserRole::Participant])?;

    state.participant_service.cancel(current_user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
