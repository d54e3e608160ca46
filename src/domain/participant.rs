//! Join-request state machine.
//!
//! `PENDING` is the only initial state. Organizers move a request to
//! `APPROVED` or `REJECTED` and may flip between those two; the requester
//! may withdraw it only while it is still `PENDING`.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParticipantStatus {
    Pending,
    Approved,
    Rejected,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Pending => STATUS_PENDING,
            ParticipantStatus::Approved => STATUS_APPROVED,
            ParticipantStatus::Rejected => STATUS_REJECTED,
        }
    }
}

impl FromStr for ParticipantStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            STATUS_PENDING => Ok(ParticipantStatus::Pending),
            STATUS_APPROVED => Ok(ParticipantStatus::Approved),
            STATUS_REJECTED => Ok(ParticipantStatus::Rejected),
            other => Err(AppError::validation(format!(
                "Unknown participant status: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An organizer's verdict on a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Approved,
    Rejected,
}

impl From<Decision> for ParticipantStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => ParticipantStatus::Approved,
            Decision::Rejected => ParticipantStatus::Rejected,
        }
    }
}

/// A user's request to attend an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Participant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub status: ParticipantStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    /// A fresh PENDING request.
    pub fn request(user_id: Uuid, event_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            event_id,
            status: ParticipantStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ParticipantStatus::Pending
    }
}

/// Participant row joined with requester and event summary, for listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantDetails {
    pub id: Uuid,
    pub status: ParticipantStatus,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub event_id: Uuid,
    pub event_title: String,
    pub event_start_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
