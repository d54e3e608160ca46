//! Participation workflow: join requests, organizer decisions and
//! self-cancellation.
//!
//! ```text
//! PENDING ─┬─▶ APPROVED ◀──▶ REJECTED
//!          ├─▶ REJECTED
//!          └─▶ (deleted, requester only)
//! ```
//!
//! Seat capacity is enforced inside the decision transaction while the event
//! row is locked, so concurrent approvals for one event are serialized and
//! `confirmed_count` always equals the number of APPROVED rows.

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Decision, Event, Participant, ParticipantDetails, ParticipantStatus};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{Notifier, UnitOfWork};
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Participation service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ParticipantService: Send + Sync {
    /// Ask to join an event. Organizers are notified.
    async fn request_join(&self, user_id: Uuid, event_id: Uuid) -> AppResult<Participant>;

    /// Approve or reject a request. Repeating a decision is a no-op.
    async fn decide(
        &self,
        organizer_id: Uuid,
        participant_id: Uuid,
        decision: Decision,
    ) -> AppResult<Participant>;

    /// Withdraw a request that is still PENDING
    async fn cancel(&self, user_id: Uuid, participant_id: Uuid) -> AppResult<()>;

    /// The caller's own requests
    async fn list_my_requests(
        &self,
        user_id: Uuid,
        status: Option<ParticipantStatus>,
        pagination: PaginationParams,
    ) -> AppResult<Paginated<ParticipantDetails>>;

    /// Requests on the organizer's live events
    async fn list_for_organizer(
        &self,
        organizer_id: Uuid,
        status: Option<ParticipantStatus>,
        pagination: PaginationParams,
    ) -> AppResult<Paginated<ParticipantDetails>>;
}

/// Concrete implementation of ParticipantService using Unit of Work.
pub struct ParticipantManager<U: UnitOfWork> {
    uow: Arc<U>,
    notifier: Arc<dyn Notifier>,
}

impl<U: UnitOfWork> ParticipantManager<U> {
    pub fn new(uow: Arc<U>, notifier: Arc<dyn Notifier>) -> Self {
        Self { uow, notifier }
    }

    async fn notify_user(&self, user_id: Uuid, subject: &str, body: &str) {
        let user = match self.uow.users().find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return,
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Notification lookup failed");
                return;
            }
        };

        if let Err(e) = self.notifier.send(&user.email, subject, body).await {
            tracing::error!(user_id = %user_id, error = %e, "Failed to send notification");
        }
    }

    async fn notify_organizers(&self, event: &Event, requester_id: Uuid) {
        let subject = format!("New join request for {}", event.title);
        let body = format!(
            "A user has asked to join \"{}\". Review the request in your dashboard.",
            event.title
        );

        let sends = event
            .organizer_ids
            .iter()
            .map(|organizer_id| self.notify_user(*organizer_id, &subject, &body));
        join_all(sends).await;

        tracing::debug!(
            event_id = %event.id,
            requester_id = %requester_id,
            organizers = event.organizer_ids.len(),
            "Organizers notified"
        );
    }
}

#[async_trait]
impl<U: UnitOfWork> ParticipantService for ParticipantManager<U> {
    async fn request_join(&self, user_id: Uuid, event_id: Uuid) -> AppResult<Participant> {
        let event = self.uow.events().find_by_id(event_id).await?.ok_or_not_found()?;

        let participant = self
            .uow
            .participants()
            .create(Participant::request(user_id, event_id))
            .await?;

        tracing::info!(
            participant_id = %participant.id,
            user_id = %user_id,
            event_id = %event_id,
            "Join requested"
        );

        self.notify_organizers(&event, user_id).await;
        Ok(participant)
    }

    async fn decide(
        &self,
        organizer_id: Uuid,
        participant_id: Uuid,
        decision: Decision,
    ) -> AppResult<Participant> {
        let target = ParticipantStatus::from(decision);

        let participant = self
            .uow
            .participants()
            .find_by_id(participant_id)
            .await?
            .ok_or_not_found()?;
        let event = self
            .uow
            .events()
            .find_by_id(participant.event_id)
            .await?
            .ok_or_not_found()?;

        if !event.is_organizer(organizer_id) {
            return Err(AppError::Forbidden);
        }
        if participant.status == target {
            return Ok(participant);
        }

        let event_id = event.id;
        let (participant, changed) = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let event = ctx
                        .events()
                        .find_for_update(event_id)
                        .await?
                        .ok_or_not_found()?;
                    let current = ctx
                        .participants()
                        .find_by_id(participant_id)
                        .await?
                        .ok_or_not_found()?;

                    // Decided concurrently while we waited for the lock
                    if current.status == target {
                        return Ok((current, false));
                    }

                    if target == ParticipantStatus::Approved {
                        let approved = ctx.participants().count_approved(event_id).await?;
                        if !event.has_free_seat(approved) {
                            return Err(AppError::SeatsFull);
                        }
                    }

                    let updated = ctx
                        .participants()
                        .update_status(participant_id, target)
                        .await?;

                    let approved = ctx.participants().count_approved(event_id).await?;
                    let confirmed = i32::try_from(approved)
                        .map_err(|_| AppError::internal("Approved count out of range"))?;
                    ctx.events().set_confirmed_count(event_id, confirmed).await?;

                    Ok((updated, true))
                })
            })
            .await?;

        if changed {
            tracing::info!(
                participant_id = %participant.id,
                event_id = %event_id,
                status = %participant.status,
                "Participation decided"
            );

            let subject = format!("Your request for {} was {}", event.title, participant.status);
            let body = format!(
                "Your request to join \"{}\" is now {}.",
                event.title, participant.status
            );
            self.notify_user(participant.user_id, &subject, &body).await;
        }

        Ok(participant)
    }

    async fn cancel(&self, user_id: Uuid, participant_id: Uuid) -> AppResult<()> {
        let participant = self
            .uow
            .participants()
            .find_by_id(participant_id)
            .await?
            .ok_or_not_found()?;

        if participant.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        if !participant.is_pending() {
            return Err(AppError::InvalidState);
        }

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    // Re-read: the row may have been withdrawn or decided meanwhile
                    let current = ctx
                        .participants()
                        .find_by_id(participant_id)
                        .await?
                        .ok_or_not_found()?;
                    if !current.is_pending() {
                        return Err(AppError::InvalidState);
                    }
                    if !ctx.participants().delete_if_pending(participant_id).await? {
                        // Lost the race for the same row
                        return match ctx.participants().find_by_id(participant_id).await? {
                            Some(_) => Err(AppError::InvalidState),
                            None => Err(AppError::NotFound),
                        };
                    }
                    Ok(())
                })
            })
            .await?;

        tracing::info!(participant_id = %participant_id, user_id = %user_id, "Request cancelled");
        Ok(())
    }

    async fn list_my_requests(
        &self,
        user_id: Uuid,
        status: Option<ParticipantStatus>,
        pagination: PaginationParams,
    ) -> AppResult<Paginated<ParticipantDetails>> {
        let PaginationParams { page, per_page } = pagination.normalized();
        let (rows, total) = self
            .uow
            .participants()
            .list_for_user(user_id, status, page, per_page)
            .await?;
        Ok(Paginated::new(rows, page, per_page, total))
    }

    async fn list_for_organizer(
        &self,
        organizer_id: Uuid,
        status: Option<ParticipantStatus>,
        pagination: PaginationParams,
    ) -> AppResult<Paginated<ParticipantDetails>> {
        let PaginationParams { page, per_page } = pagination.normalized();
        let (rows, total) = self
            .uow
            .participants()
            .list_for_organizer(organizer_id, status, page, per_page)
            .await?;
        Ok(Paginated::new(rows, page, per_page, total))
    }
}
