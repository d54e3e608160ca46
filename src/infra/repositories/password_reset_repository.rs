//! Password reset request store.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use super::entities::password_reset::{self, ActiveModel, Entity as PasswordResetEntity};
use crate::domain::PasswordReset;
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Store a reset request, replacing any earlier one for the same user
    async fn replace_for_user(&self, reset: PasswordReset) -> AppResult<PasswordReset>;

    async fn find_by_token(&self, token: &str) -> AppResult<Option<PasswordReset>>;
}

pub struct PasswordResetStore {
    db: DatabaseConnection,
}

impl PasswordResetStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PasswordResetRepository for PasswordResetStore {
    async fn replace_for_user(&self, reset: PasswordReset) -> AppResult<PasswordReset> {
        PasswordResetEntity::delete_many()
            .filter(password_reset::Column::UserId.eq(reset.user_id))
            .exec(&self.db)
            .await?;

        let active_model = ActiveModel {
            id: Set(reset.id),
            user_id: Set(reset.user_id),
            token: Set(reset.token),
            expires_at: Set(reset.expires_at),
            created_at: Set(reset.created_at),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(PasswordReset::from(model))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<PasswordReset>> {
        find_by_token(&self.db, token).await
    }
}

pub(crate) async fn find_by_token<C: ConnectionTrait>(
    conn: &C,
    token: &str,
) -> AppResult<Option<PasswordReset>> {
    let result = PasswordResetEntity::find()
        .filter(password_reset::Column::Token.eq(token))
        .one(conn)
        .await?;

    Ok(result.map(PasswordReset::from))
}

/// Remove a consumed reset request. Returns `false` if it was already gone.
pub(crate) async fn consume<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<bool> {
    let result = PasswordResetEntity::delete_by_id(id).exec(conn).await?;
    Ok(result.rows_affected == 1)
}
