//! Participant (join request) repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::participant::{self, ActiveModel, DetailsRow, Entity as ParticipantEntity};
use super::entities::{event, event_organizer, user};
use crate::domain::{Participant, ParticipantDetails, ParticipantStatus};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Participant>>;

    /// Insert a PENDING request; `AlreadyRequested` if the user already
    /// has one for this event
    async fn create(&self, participant: Participant) -> AppResult<Participant>;

    /// Requests made by `user_id`, newest first
    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<ParticipantStatus>,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ParticipantDetails>, u64)>;

    /// Requests on live events that `organizer_id` runs, newest first
    async fn list_for_organizer(
        &self,
        organizer_id: Uuid,
        status: Option<ParticipantStatus>,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ParticipantDetails>, u64)>;
}

pub struct ParticipantStore {
    db: DatabaseConnection,
}

impl ParticipantStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn page(
        &self,
        select: Select<ParticipantEntity>,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ParticipantDetails>, u64)> {
        let paginator = select
            .select_only()
            .column(participant::Column::Id)
            .column(participant::Column::UserId)
            .column(participant::Column::EventId)
            .column(participant::Column::Status)
            .column(participant::Column::CreatedAt)
            .column(participant::Column::UpdatedAt)
            .column_as(user::Column::FullName, "full_name")
            .column_as(user::Column::Email, "email")
            .column_as(event::Column::Title, "event_title")
            .column_as(event::Column::StartAt, "event_start_at")
            .join(JoinType::InnerJoin, participant::Relation::User.def())
            .join(JoinType::InnerJoin, participant::Relation::Event.def())
            .filter(event::Column::DeletedAt.is_null())
            .order_by_desc(participant::Column::CreatedAt)
            .into_model::<DetailsRow>()
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((rows.into_iter().map(ParticipantDetails::from).collect(), total))
    }
}

#[async_trait]
impl ParticipantRepository for ParticipantStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Participant>> {
        find_by_id(&self.db, id).await
    }

    async fn create(&self, participant: Participant) -> AppResult<Participant> {
        let active_model = ActiveModel {
            id: Set(participant.id),
            user_id: Set(participant.user_id),
            event_id: Set(participant.event_id),
            status: Set(participant.status.to_string()),
            created_at: Set(participant.created_at),
            updated_at: Set(participant.updated_at),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => AppError::AlreadyRequested,
                _ => AppError::from(e),
            })?;

        Ok(Participant::from(model))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<ParticipantStatus>,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ParticipantDetails>, u64)> {
        let select = with_status(
            ParticipantEntity::find().filter(participant::Column::UserId.eq(user_id)),
            status,
        );
        self.page(select, page, per_page).await
    }

    async fn list_for_organizer(
        &self,
        organizer_id: Uuid,
        status: Option<ParticipantStatus>,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ParticipantDetails>, u64)> {
        let select = with_status(
            ParticipantEntity::find().filter(
                participant::Column::EventId.in_subquery(
                    Query::select()
                        .column(event_organizer::Column::EventId)
                        .from(event_organizer::Entity)
                        .and_where(event_organizer::Column::UserId.eq(organizer_id))
                        .to_owned(),
                ),
            ),
            status,
        );
        self.page(select, page, per_page).await
    }
}

fn with_status(
    select: Select<ParticipantEntity>,
    status: Option<ParticipantStatus>,
) -> Select<ParticipantEntity> {
    match status {
        Some(status) => select.filter(participant::Column::Status.eq(status.as_str())),
        None => select,
    }
}

pub(crate) async fn find_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<Option<Participant>> {
    let result = ParticipantEntity::find_by_id(id).one(conn).await?;
    Ok(result.map(Participant::from))
}

pub(crate) async fn count_approved<C: ConnectionTrait>(conn: &C, event_id: Uuid) -> AppResult<u64> {
    let count = ParticipantEntity::find()
        .filter(participant::Column::EventId.eq(event_id))
        .filter(participant::Column::Status.eq(ParticipantStatus::Approved.as_str()))
        .count(conn)
        .await?;
    Ok(count)
}

pub(crate) async fn update_status<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    status: ParticipantStatus,
) -> AppResult<Participant> {
    let model = ParticipantEntity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = model.into();
    active.status = Set(status.to_string());
    active.updated_at = Set(Utc::now());

    let model = active.update(conn).await?;
    Ok(Participant::from(model))
}

/// Delete the request only if it is still PENDING. Returns `false` when the
/// row is gone or was decided in the meantime.
pub(crate) async fn delete_if_pending<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<bool> {
    let result = ParticipantEntity::delete_many()
        .filter(participant::Column::Id.eq(id))
        .filter(participant::Column::Status.eq(ParticipantStatus::Pending.as_str()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected == 1)
}

pub(crate) async fn delete_for_event<C: ConnectionTrait>(
    conn: &C,
    event_id: Uuid,
) -> AppResult<u64> {
    let result = ParticipantEntity::delete_many()
        .filter(participant::Column::EventId.eq(event_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
