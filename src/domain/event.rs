//! Event domain entity, scheduling rules and listing queries.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::ValidateUrl;

use crate::errors::{AppError, AppResult};

/// Where an event takes place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Online,
    Onsite,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Online => "ONLINE",
            EventType::Onsite => "ONSITE",
        }
    }
}

impl FromStr for EventType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ONLINE" => Ok(EventType::Online),
            "ONSITE" => Ok(EventType::Onsite),
            other => Err(AppError::validation(format!("Unknown event type: {}", other))),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event domain entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub event_type: EventType,
    pub venue: Option<String>,
    pub join_link: Option<String>,
    pub contact_info: Option<String>,
    pub thumbnail: Option<String>,
    /// `None` means unlimited seating
    pub total_seats: Option<i32>,
    /// Number of APPROVED participants
    pub confirmed_count: i32,
    pub organizer_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Build a new event owned by `organizer_id`.
    pub fn new(organizer_id: Uuid, data: NewEvent) -> AppResult<Self> {
        let now = Utc::now();
        let event = Self {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            start_at: data.start_at,
            end_at: data.end_at,
            event_type: data.event_type,
            venue: data.venue,
            join_link: data.join_link,
            contact_info: data.contact_info,
            thumbnail: data.thumbnail,
            total_seats: data.total_seats,
            confirmed_count: 0,
            organizer_ids: vec![organizer_id],
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        event.validate()?;
        Ok(event)
    }

    /// Check the data-model invariants of an event.
    pub fn validate(&self) -> AppResult<()> {
        if self.end_at <= self.start_at {
            return Err(AppError::validation("Event must end after it starts"));
        }

        match self.event_type {
            EventType::Onsite => {
                if self.venue.as_deref().map_or(true, |v| v.trim().is_empty()) {
                    return Err(AppError::validation("Onsite events require a venue"));
                }
            }
            EventType::Online => {
                let valid_link = self
                    .join_link
                    .as_deref()
                    .map_or(false, |link| link.validate_url());
                if !valid_link {
                    return Err(AppError::validation(
                        "Online events require a valid absolute join link",
                    ));
                }
            }
        }

        if let Some(seats) = self.total_seats {
            if seats < 1 {
                return Err(AppError::validation("Total seats must be at least 1"));
            }
            if seats < self.confirmed_count {
                return Err(AppError::validation(format!(
                    "Total seats cannot be lower than the {} approved participants",
                    self.confirmed_count
                )));
            }
        }

        Ok(())
    }

    /// Merge a partial update into this event and re-check invariants.
    pub fn apply(&mut self, patch: EventPatch) -> AppResult<()> {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(start_at) = patch.start_at {
            self.start_at = start_at;
        }
        if let Some(end_at) = patch.end_at {
            self.end_at = end_at;
        }
        if let Some(event_type) = patch.event_type {
            self.event_type = event_type;
        }
        if let Some(venue) = patch.venue {
            self.venue = Some(venue);
        }
        if let Some(join_link) = patch.join_link {
            self.join_link = Some(join_link);
        }
        if let Some(contact_info) = patch.contact_info {
            self.contact_info = Some(contact_info);
        }
        if let Some(thumbnail) = patch.thumbnail {
            self.thumbnail = Some(thumbnail);
        }
        if let Some(total_seats) = patch.total_seats {
            self.total_seats = Some(total_seats);
        }
        if patch.unlimited_seats {
            self.total_seats = None;
        }
        self.updated_at = Utc::now();
        self.validate()
    }

    pub fn is_organizer(&self, user_id: Uuid) -> bool {
        self.organizer_ids.contains(&user_id)
    }

    /// Whether another participant can be approved given the current count.
    pub fn has_free_seat(&self, approved: u64) -> bool {
        match self.total_seats {
            Some(seats) => approved < seats.max(0) as u64,
            None => true,
        }
    }
}

/// Data required to create an event
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub event_type: EventType,
    pub venue: Option<String>,
    pub join_link: Option<String>,
    pub contact_info: Option<String>,
    pub thumbnail: Option<String>,
    pub total_seats: Option<i32>,
}

/// Partial event update
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub event_type: Option<EventType>,
    pub venue: Option<String>,
    pub join_link: Option<String>,
    pub contact_info: Option<String>,
    pub thumbnail: Option<String>,
    pub total_seats: Option<i32>,
    /// Clears the seat limit; wins over `total_seats`
    pub unlimited_seats: bool,
}

/// Time window filter for event listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventFilter {
    /// Not started yet
    Incoming,
    /// Already ended
    Past,
    /// Running right now
    Live,
}

/// Event listing query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventQuery {
    /// Page number (1-indexed)
    pub page: Option<u64>,
    /// Items per page
    pub per_page: Option<u64>,
    /// Time window filter
    pub filter: Option<EventFilter>,
    /// Case-insensitive title search
    pub search: Option<String>,
    /// Restrict to one event type
    #[serde(rename = "type")]
    #[param(rename = "type")]
    pub event_type: Option<EventType>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn online(seats: Option<i32>) -> NewEvent {
        let start = Utc::now() + Duration::days(1);
        NewEvent {
            title: "Rust meetup".into(),
            description: "Monthly meetup".into(),
            start_at: start,
            end_at: start + Duration::hours(2),
            event_type: EventType::Online,
            venue: None,
            join_link: Some("https://meet.example.com/rust".into()),
            contact_info: None,
            thumbnail: None,
            total_seats: seats,
        }
    }

    #[test]
    fn test_new_event_is_owned_by_creator() {
        let organizer = Uuid::new_v4();
        let event = Event::new(organizer, online(Some(10))).unwrap();

        assert!(event.is_organizer(organizer));
        assert!(!event.is_organizer(Uuid::new_v4()));
        assert_eq!(event.confirmed_count, 0);
    }

    #[test]
    fn test_end_must_follow_start() {
        let mut data = online(None);
        data.end_at = data.start_at;
        assert!(Event::new(Uuid::new_v4(), data).is_err());
    }

    #[test]
    fn test_online_requires_absolute_link() {
        let mut data = online(None);
        data.join_link = Some("/relative/path".into());
        assert!(Event::new(Uuid::new_v4(), data).is_err());

        let mut data = online(None);
        data.join_link = None;
        assert!(Event::new(Uuid::new_v4(), data).is_err());
    }

    #[test]
    fn test_onsite_requires_venue() {
        let mut data = online(None);
        data.event_type = EventType::Onsite;
        data.join_link = None;
        assert!(Event::new(Uuid::new_v4(), data.clone()).is_err());

        data.venue = Some("Main hall".into());
        assert!(Event::new(Uuid::new_v4(), data).is_ok());
    }

    #[test]
    fn test_seats_must_be_positive() {
        assert!(Event::new(Uuid::new_v4(), online(Some(0))).is_err());
    }

    #[test]
    fn test_patch_cannot_drop_below_confirmed() {
        let mut event = Event::new(Uuid::new_v4(), online(Some(5))).unwrap();
        event.confirmed_count = 3;

        let patch = EventPatch {
            total_seats: Some(2),
            ..Default::default()
        };
        assert!(event.apply(patch).is_err());
    }

    #[test]
    fn test_has_free_seat() {
        let event = Event::new(Uuid::new_v4(), online(Some(2))).unwrap();
        assert!(event.has_free_seat(1));
        assert!(!event.has_free_seat(2));

        let unlimited = Event::new(Uuid::new_v4(), online(None)).unwrap();
        assert!(unlimited.has_free_seat(10_000));
    }
}
