//! Integration tests for API endpoints.
//!
//! These tests use mock services to test API endpoints without requiring
//! a Redis connection; the database is an in-memory SQLite used only by
//! the health check.

mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use eventhub_api::api::{create_router, AppState};
use eventhub_api::domain::{AccessClaims, User, UserRole};
use eventhub_api::errors::AppError;
use eventhub_api::infra::{Database, MockRateLimitStore};
use eventhub_api::services::{
    MockAuthService, MockEventService, MockParticipantService, MockUserService,
};
use eventhub_api::types::Paginated;

const PARTICIPANT_TOKEN: &str = "participant-token";
const ORGANIZER_TOKEN: &str = "organizer-token";

fn user_id() -> Uuid {
    Uuid::from_u128(0x5eed)
}

fn claims(role: UserRole) -> AccessClaims {
    let now = Utc::now().timestamp();
    AccessClaims {
        sub: user_id(),
        role,
        jti: Uuid::new_v4(),
        iat: now,
        exp: now + 900,
    }
}

/// Mocks for every collaborator of the router.
struct Mocks {
    auth: MockAuthService,
    users: MockUserService,
    events: MockEventService,
    participants: MockParticipantService,
    limiter: MockRateLimitStore,
}

impl Mocks {
    /// Known bearer tokens verify; everything else is invalid. Rate limits
    /// always allow.
    fn new() -> Self {
        let mut auth = MockAuthService::new();
        auth.expect_verify_token().returning(|token| match token {
            PARTICIPANT_TOKEN => Ok(claims(UserRole::Participant)),
            ORGANIZER_TOKEN => Ok(claims(UserRole::Organizer)),
            _ => Err(AppError::TokenInvalid),
        });

        let mut limiter = MockRateLimitStore::new();
        limiter
            .expect_check_rate_limit()
            .returning(|_, _, _| Ok((1, true)));
        limiter.expect_ping().returning(|| Ok(()));

        Self {
            auth,
            users: MockUserService::new(),
            events: MockEventService::new(),
            participants: MockParticipantService::new(),
            limiter,
        }
    }

    async fn router(self) -> Router {
        let database = Database::from_connection(common::connect().await);
        create_router(AppState {
            auth_service: Arc::new(self.auth),
            user_service: Arc::new(self.users),
            event_service: Arc::new(self.events),
            participant_service: Arc::new(self.participants),
            cache: Arc::new(self.limiter),
            database: Arc::new(database),
        })
    }
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root_endpoint() {
    let app = Mocks::new().router().await;

    let response = app
        .oneshot(request(Method::GET, "/", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Event Hub API");
}

#[tokio::test]
async fn test_health_reports_components() {
    let app = Mocks::new().router().await;

    let response = app
        .oneshot(request(Method::GET, "/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["database"]["status"], "healthy");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = Mocks::new().router().await;

    let response = app
        .oneshot(request(Method::GET, "/users/me", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = Mocks::new().router().await;

    let response = app
        .oneshot(request(Method::GET, "/users/me", Some("forged"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_current_user_hides_password_hash() {
    let mut mocks = Mocks::new();
    mocks.users.expect_get_user().returning(|id| {
        let mut user = User::new(
            "me@example.com".into(),
            "argon2-hash".into(),
            "Me".into(),
            None,
            UserRole::Participant,
        );
        user.id = id;
        Ok(user)
    });
    let app = mocks.router().await;

    let response = app
        .oneshot(request(Method::GET, "/users/me", Some(PARTICIPANT_TOKEN), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], user_id().to_string());
    assert_eq!(body["email"], "me@example.com");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_event_listing_is_public() {
    let mut mocks = Mocks::new();
    mocks
        .events
        .expect_list_events()
        .returning(|_| Ok(Paginated::new(vec![], 1, 10, 0)));
    let app = mocks.router().await;

    let response = app
        .oneshot(request(Method::GET, "/events?filter=incoming", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["meta"]["total"], 0);
}

#[tokio::test]
async fn test_participant_cannot_create_event() {
    let mut mocks = Mocks::new();
    mocks.events.expect_create_event().never();
    let app = mocks.router().await;

    let start = Utc::now() + chrono::Duration::days(1);
    let payload = json!({
        "title": "Rust meetup",
        "description": "Talks",
        "start_at": start,
        "end_at": start + chrono::Duration::hours(2),
        "type": "ONLINE",
        "join_link": "https://meet.example.com/rust"
    });

    let response = app
        .oneshot(request(
            Method::POST,
            "/events",
            Some(PARTICIPANT_TOKEN),
            Some(payload),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_event_creation_requires_token() {
    let app = Mocks::new().router().await;

    let response = app
        .oneshot(request(Method::POST, "/events", None, Some(json!({}))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_workflow_errors_map_to_conflict() {
    let mut mocks = Mocks::new();
    mocks
        .participants
        .expect_request_join()
        .returning(|_, _| Err(AppError::AlreadyRequested));
    let app = mocks.router().await;

    let response = app
        .oneshot(request(
            Method::POST,
            "/participants",
            Some(PARTICIPANT_TOKEN),
            Some(json!({ "event_id": Uuid::new_v4() })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "ALREADY_REQUESTED");
}

#[tokio::test]
async fn test_decision_passes_organizer_and_status() {
    let participant_id = Uuid::new_v4();

    let mut mocks = Mocks::new();
    mocks
        .participants
        .expect_decide()
        .withf(move |organizer, id, decision| {
            *organizer == user_id()
                && *id == participant_id
                && *decision == eventhub_api::domain::Decision::Rejected
        })
        .times(1)
        .returning(|_, _, _| Err(AppError::SeatsFull));
    let app = mocks.router().await;

    let response = app
        .oneshot(request(
            Method::PUT,
            &format!("/participants/{}/status", participant_id),
            Some(ORGANIZER_TOKEN),
            Some(json!({ "status": "REJECTED" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "SEATS_FULL");
}

#[tokio::test]
async fn test_register_validates_body() {
    let mut mocks = Mocks::new();
    mocks.auth.expect_register().never();
    let app = mocks.router().await;

    let response = app
        .oneshot(request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "email": "not-an-email",
                "password": "secret-enough",
                "full_name": "Jane"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_rate_limit_exceeded() {
    let mut mocks = Mocks::new();
    mocks.limiter = MockRateLimitStore::new();
    mocks
        .limiter
        .expect_check_rate_limit()
        .returning(|_, max, _| Ok((max + 1, false)));
    let app = mocks.router().await;

    let response = app
        .oneshot(request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "a@example.com", "password": "whatever" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("Retry-After"));
}

#[tokio::test]
async fn test_rate_limit_fails_closed() {
    let mut mocks = Mocks::new();
    mocks.limiter = MockRateLimitStore::new();
    mocks
        .limiter
        .expect_check_rate_limit()
        .returning(|_, _, _| Err(AppError::internal("redis down")));
    let app = mocks.router().await;

    let response = app
        .oneshot(request(Method::GET, "/users/me", Some(PARTICIPANT_TOKEN), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}
