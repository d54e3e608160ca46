//! Shared fixtures: real services over an in-memory SQLite database.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sea_orm::{ConnectOptions, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use eventhub_api::config::Config;
use eventhub_api::domain::{Event, EventType, NewEvent, User, UserRole};
use eventhub_api::errors::{AppError, AppResult};
use eventhub_api::infra::{Migrator, Notifier, Persistence};
use eventhub_api::services::{Registration, ServiceContainer, Services};

pub const PASSWORD: &str = "correct-horse";

/// A sent notification: (to, subject, body)
pub type SentMail = (String, String, String);

/// Notifier that keeps every message in memory.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, to: &str) -> Vec<SentMail> {
        self.sent()
            .into_iter()
            .filter(|(recipient, _, _)| recipient == to)
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

/// Notifier whose every delivery fails.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> AppResult<()> {
        Err(AppError::internal("smtp down"))
    }
}

pub fn test_config() -> Config {
    Config::with_secrets(
        "integration-access-secret-000000000000",
        "integration-refresh-secret-00000000000",
        "integration-reset-secret-0000000000000",
    )
}

pub struct TestApp {
    pub db: DatabaseConnection,
    pub uow: Arc<Persistence>,
    pub services: Services,
    pub notifier: Arc<RecordingNotifier>,
}

/// A single connection keeps the in-memory database alive and shared.
pub async fn connect() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = sea_orm::Database::connect(options)
        .await
        .expect("sqlite connection");
    Migrator::up(&db, None).await.expect("migrations");
    db
}

pub async fn spawn_app() -> TestApp {
    let db = connect().await;
    let uow = Arc::new(Persistence::new(db.clone()));
    let notifier = Arc::new(RecordingNotifier::default());
    let services = Services::from_unit_of_work(uow.clone(), test_config(), notifier.clone());

    TestApp {
        db,
        uow,
        services,
        notifier,
    }
}

/// Services wired to a different notifier; `notifier` stays empty.
pub async fn spawn_app_with_notifier(notifier: Arc<dyn Notifier>) -> TestApp {
    let db = connect().await;
    let uow = Arc::new(Persistence::new(db.clone()));
    let services = Services::from_unit_of_work(uow.clone(), test_config(), notifier);

    TestApp {
        db,
        uow,
        services,
        notifier: Arc::new(RecordingNotifier::default()),
    }
}

pub fn registration(email: &str, role: UserRole) -> Registration {
    Registration {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        full_name: format!("User {}", email),
        phone: None,
        role: Some(role),
    }
}

impl TestApp {
    pub async fn register(&self, email: &str, role: UserRole) -> User {
        self.services
            .auth()
            .register(registration(email, role))
            .await
            .expect("register")
    }

    pub async fn create_event(&self, organizer: &User, seats: Option<i32>) -> Event {
        self.services
            .events()
            .create_event(organizer.id, online_event("Rust meetup", seats))
            .await
            .expect("create event")
    }
}

pub fn online_event(title: &str, seats: Option<i32>) -> NewEvent {
    let start = Utc::now() + Duration::days(7);
    NewEvent {
        title: title.to_string(),
        description: "An evening of talks".to_string(),
        start_at: start,
        end_at: start + Duration::hours(3),
        event_type: EventType::Online,
        venue: None,
        join_link: Some("https://meet.example.com/rust".to_string()),
        contact_info: None,
        thumbnail: None,
        total_seats: seats,
    }
}

pub fn onsite_event(title: &str, venue: &str) -> NewEvent {
    NewEvent {
        event_type: EventType::Onsite,
        venue: Some(venue.to_string()),
        join_link: None,
        ..online_event(title, None)
    }
}
