//! Event repository.
//!
//! Reads go through [`EventRepository`]; writes happen inside a unit of work
//! using the connection-generic helpers below.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};
use uuid::Uuid;

use super::entities::event::{self, ActiveModel, Entity as EventEntity};
use super::entities::event_organizer::{self, Entity as EventOrganizerEntity};
use crate::domain::{Event, EventFilter, EventQuery};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Find a live (not soft-deleted) event with its organizers
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Event>>;

    /// Page through live events, optionally only those run by `organizer_id`
    async fn list(
        &self,
        query: EventQuery,
        organizer_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<Event>, u64)>;
}

pub struct EventStore {
    db: DatabaseConnection,
}

impl EventStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventRepository for EventStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Event>> {
        let Some(model) = live(EventEntity::find_by_id(id)).one(&self.db).await? else {
            return Ok(None);
        };

        let mut organizers = organizers_for(&self.db, &[model.id]).await?;
        let ids = organizers.remove(&model.id).unwrap_or_default();
        Ok(Some(model.into_event(ids)))
    }

    async fn list(
        &self,
        query: EventQuery,
        organizer_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<Event>, u64)> {
        let mut select = live(EventEntity::find());

        if let Some(organizer_id) = organizer_id {
            select = select.filter(
                event::Column::Id.in_subquery(
                    Query::select()
                        .column(event_organizer::Column::EventId)
                        .from(EventOrganizerEntity)
                        .and_where(event_organizer::Column::UserId.eq(organizer_id))
                        .to_owned(),
                ),
            );
        }

        let now = Utc::now();
        select = match query.filter {
            Some(EventFilter::Incoming) => select
                .filter(event::Column::StartAt.gt(now))
                .order_by_asc(event::Column::StartAt),
            Some(EventFilter::Past) => select
                .filter(event::Column::EndAt.lt(now))
                .order_by_desc(event::Column::StartAt),
            Some(EventFilter::Live) => select
                .filter(event::Column::StartAt.lte(now))
                .filter(event::Column::EndAt.gte(now))
                .order_by_asc(event::Column::EndAt),
            None => select.order_by_desc(event::Column::StartAt),
        };

        if let Some(term) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select
                .filter(Expr::expr(Func::lower(Expr::col(event::Column::Title))).like(pattern));
        }

        if let Some(event_type) = query.event_type {
            select = select.filter(event::Column::EventType.eq(event_type.as_str()));
        }

        let paginator = select.paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut organizers = organizers_for(&self.db, &ids).await?;

        let events = models
            .into_iter()
            .map(|m| {
                let ids = organizers.remove(&m.id).unwrap_or_default();
                m.into_event(ids)
            })
            .collect();

        Ok((events, total))
    }
}

fn live(select: Select<EventEntity>) -> Select<EventEntity> {
    select.filter(event::Column::DeletedAt.is_null())
}

/// Organizer ids grouped by event id.
pub(crate) async fn organizers_for<C: ConnectionTrait>(
    conn: &C,
    event_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<Uuid>>> {
    let mut grouped: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    if event_ids.is_empty() {
        return Ok(grouped);
    }

    let links = EventOrganizerEntity::find()
        .filter(event_organizer::Column::EventId.is_in(event_ids.iter().copied()))
        .all(conn)
        .await?;

    for link in links {
        grouped.entry(link.event_id).or_default().push(link.user_id);
    }
    Ok(grouped)
}

/// Load a live event and take a row lock on it for the rest of the
/// transaction. Concurrent decisions on the same event queue up here.
pub(crate) async fn find_for_update<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<Option<Event>> {
    let Some(model) = live(EventEntity::find_by_id(id))
        .lock_exclusive()
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    let mut organizers = organizers_for(conn, &[model.id]).await?;
    let ids = organizers.remove(&model.id).unwrap_or_default();
    Ok(Some(model.into_event(ids)))
}

pub(crate) async fn insert<C: ConnectionTrait>(conn: &C, event: &Event) -> AppResult<()> {
    ActiveModel::from(event).insert(conn).await?;

    let links = event
        .organizer_ids
        .iter()
        .map(|user_id| event_organizer::ActiveModel {
            event_id: sea_orm::Set(event.id),
            user_id: sea_orm::Set(*user_id),
        });
    EventOrganizerEntity::insert_many(links)
        .exec_without_returning(conn)
        .await?;

    Ok(())
}

/// Persist every scalar field of an event. Organizer links are untouched.
pub(crate) async fn update<C: ConnectionTrait>(conn: &C, event: &Event) -> AppResult<()> {
    ActiveModel::from(event).update(conn).await?;
    Ok(())
}

pub(crate) async fn set_confirmed_count<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    count: i32,
) -> AppResult<()> {
    let result = EventEntity::update_many()
        .col_expr(event::Column::ConfirmedCount, Expr::value(count))
        .col_expr(event::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(event::Column::Id.eq(id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub(crate) async fn soft_delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<()> {
    let now = Utc::now();
    let result = EventEntity::update_many()
        .col_expr(event::Column::DeletedAt, Expr::value(now))
        .col_expr(event::Column::ConfirmedCount, Expr::value(0))
        .col_expr(event::Column::UpdatedAt, Expr::value(now))
        .filter(event::Column::Id.eq(id))
        .filter(event::Column::DeletedAt.is_null())
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
