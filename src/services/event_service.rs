//! Event service - creation, listing and organizer-only maintenance.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Event, EventPatch, EventQuery, NewEvent};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Event service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EventService: Send + Sync {
    /// Create an event owned by `organizer_id`
    async fn create_event(&self, organizer_id: Uuid, data: NewEvent) -> AppResult<Event>;

    /// Get a live event
    async fn get_event(&self, id: Uuid) -> AppResult<Event>;

    /// Page through live events
    async fn list_events(&self, query: EventQuery) -> AppResult<Paginated<Event>>;

    /// Page through live events run by `organizer_id`
    async fn list_my_events(
        &self,
        organizer_id: Uuid,
        query: EventQuery,
    ) -> AppResult<Paginated<Event>>;

    /// Merge `patch` into the event and re-validate it
    async fn update_event(
        &self,
        organizer_id: Uuid,
        id: Uuid,
        patch: EventPatch,
    ) -> AppResult<Event>;

    /// Drop every participant and soft-delete the event
    async fn delete_event(&self, organizer_id: Uuid, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of EventService using Unit of Work.
pub struct EventManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> EventManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn page(
        &self,
        query: EventQuery,
        organizer_id: Option<Uuid>,
    ) -> AppResult<Paginated<Event>> {
        let PaginationParams { page, per_page } = PaginationParams::new(query.page, query.per_page);
        let (events, total) = self
            .uow
            .events()
            .list(query, organizer_id, page, per_page)
            .await?;
        Ok(Paginated::new(events, page, per_page, total))
    }
}

#[async_trait]
impl<U: UnitOfWork> EventService for EventManager<U> {
    async fn create_event(&self, organizer_id: Uuid, data: NewEvent) -> AppResult<Event> {
        let event = Event::new(organizer_id, data)?;

        let event = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    ctx.events().create(&event).await?;
                    Ok(event)
                })
            })
            .await?;

        tracing::info!(event_id = %event.id, organizer_id = %organizer_id, "Event created");
        Ok(event)
    }

    async fn get_event(&self, id: Uuid) -> AppResult<Event> {
        self.uow.events().find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_events(&self, query: EventQuery) -> AppResult<Paginated<Event>> {
        self.page(query, None).await
    }

    async fn list_my_events(
        &self,
        organizer_id: Uuid,
        query: EventQuery,
    ) -> AppResult<Paginated<Event>> {
        self.page(query, Some(organizer_id)).await
    }

    async fn update_event(
        &self,
        organizer_id: Uuid,
        id: Uuid,
        patch: EventPatch,
    ) -> AppResult<Event> {
        let event = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let mut event = ctx.events().find_for_update(id).await?.ok_or_not_found()?;
                    if !event.is_organizer(organizer_id) {
                        return Err(AppError::Forbidden);
                    }

                    // confirmed_count is stable while the row is locked
                    event.apply(patch)?;
                    ctx.events().update(&event).await?;
                    Ok(event)
                })
            })
            .await?;

        tracing::info!(event_id = %id, organizer_id = %organizer_id, "Event updated");
        Ok(event)
    }

    async fn delete_event(&self, organizer_id: Uuid, id: Uuid) -> AppResult<()> {
        let removed = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let event = ctx.events().find_for_update(id).await?.ok_or_not_found()?;
                    if !event.is_organizer(organizer_id) {
                        return Err(AppError::Forbidden);
                    }

                    let removed = ctx.participants().delete_for_event(id).await?;
                    ctx.events().soft_delete(id).await?;
                    Ok(removed)
                })
            })
            .await?;

        tracing::info!(
            event_id = %id,
            organizer_id = %organizer_id,
            participants_removed = removed,
            "Event deleted"
        );
        Ok(())
    }
}
