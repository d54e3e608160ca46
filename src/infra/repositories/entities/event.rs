//! Event database entity.
//!
//! Organizer links live in `event_organizers`; converting a row into the
//! domain [`Event`] needs them supplied separately.

use sea_orm::entity::prelude::*;

use crate::domain::{Event, EventType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub start_at: DateTimeUtc,
    pub end_at: DateTimeUtc,
    pub event_type: String,
    pub venue: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub join_link: Option<String>,
    pub contact_info: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub thumbnail: Option<String>,
    pub total_seats: Option<i32>,
    pub confirmed_count: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::participant::Entity")]
    Participant,
    #[sea_orm(has_many = "super::event_organizer::Entity")]
    EventOrganizer,
}

impl Related<super::participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participant.def()
    }
}

impl Related<super::event_organizer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventOrganizer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_event(self, organizer_ids: Vec<Uuid>) -> Event {
        let event_type = self.event_type.parse().unwrap_or_else(|_| {
            tracing::warn!(
                event_id = %self.id,
                kind = %self.event_type,
                "Unknown stored event type"
            );
            EventType::Onsite
        });

        Event {
            id: self.id,
            title: self.title,
            description: self.description,
            start_at: self.start_at,
            end_at: self.end_at,
            event_type,
            venue: self.venue,
            join_link: self.join_link,
            contact_info: self.contact_info,
            thumbnail: self.thumbnail,
            total_seats: self.total_seats,
            confirmed_count: self.confirmed_count,
            organizer_ids,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

impl From<&Event> for ActiveModel {
    fn from(event: &Event) -> Self {
        use sea_orm::Set;

        ActiveModel {
            id: Set(event.id),
            title: Set(event.title.clone()),
            description: Set(event.description.clone()),
            start_at: Set(event.start_at),
            end_at: Set(event.end_at),
            event_type: Set(event.event_type.as_str().to_string()),
            venue: Set(event.venue.clone()),
            join_link: Set(event.join_link.clone()),
            contact_info: Set(event.contact_info.clone()),
            thumbnail: Set(event.thumbnail.clone()),
            total_seats: Set(event.total_seats),
            confirmed_count: Set(event.confirmed_count),
            created_at: Set(event.created_at),
            updated_at: Set(event.updated_at),
            deleted_at: Set(event.deleted_at),
        }
    }
}
