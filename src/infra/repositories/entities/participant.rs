//! Participant (join request) database entity.

use sea_orm::entity::prelude::*;
use sea_orm::FromQueryResult;

use crate::domain::{Participant, ParticipantDetails, ParticipantStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "Cascade"
    )]
    Event,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn parse_status(id: Uuid, raw: &str) -> ParticipantStatus {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(participant_id = %id, status = %raw, "Unknown stored participant status");
        ParticipantStatus::Pending
    })
}

impl From<Model> for Participant {
    fn from(model: Model) -> Self {
        Participant {
            id: model.id,
            user_id: model.user_id,
            event_id: model.event_id,
            status: parse_status(model.id, &model.status),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Participant row joined with requester and event columns.
#[derive(Debug, FromQueryResult)]
pub struct DetailsRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub full_name: String,
    pub email: String,
    pub event_title: String,
    pub event_start_at: DateTimeUtc,
}

impl From<DetailsRow> for ParticipantDetails {
    fn from(row: DetailsRow) -> Self {
        ParticipantDetails {
            id: row.id,
            status: parse_status(row.id, &row.status),
            user_id: row.user_id,
            full_name: row.full_name,
            email: row.email,
            event_id: row.event_id,
            event_title: row.event_title,
            event_start_at: row.event_start_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
