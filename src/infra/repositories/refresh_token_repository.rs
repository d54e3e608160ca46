//! Refresh token store.
//!
//! Revocation is always a conditional update on `revoked_at IS NULL`, so a
//! token is consumed by at most one caller even without row locks.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use super::entities::refresh_token::{self, ActiveModel, Entity as RefreshTokenEntity};
use crate::domain::RefreshToken;
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Look up a stored token by its exact value
    async fn find_by_token(&self, token: &str) -> AppResult<Option<RefreshToken>>;

    /// Persist a newly issued token
    async fn create(&self, token: RefreshToken) -> AppResult<RefreshToken>;

    /// Revoke every unrevoked token of a user, returning how many changed
    async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64>;
}

pub struct RefreshTokenStore {
    db: DatabaseConnection,
}

impl RefreshTokenStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RefreshTokenRepository for RefreshTokenStore {
    async fn find_by_token(&self, token: &str) -> AppResult<Option<RefreshToken>> {
        find_by_token(&self.db, token).await
    }

    async fn create(&self, token: RefreshToken) -> AppResult<RefreshToken> {
        insert(&self.db, token).await
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        revoke_all_for_user(&self.db, user_id).await
    }
}

pub(crate) async fn find_by_token<C: ConnectionTrait>(
    conn: &C,
    token: &str,
) -> AppResult<Option<RefreshToken>> {
    let result = RefreshTokenEntity::find()
        .filter(refresh_token::Column::Token.eq(token))
        .one(conn)
        .await?;

    Ok(result.map(RefreshToken::from))
}

pub(crate) async fn insert<C: ConnectionTrait>(
    conn: &C,
    token: RefreshToken,
) -> AppResult<RefreshToken> {
    let active_model = ActiveModel {
        id: Set(token.id),
        token: Set(token.token),
        user_id: Set(token.user_id),
        expires_at: Set(token.expires_at),
        revoked_at: Set(token.revoked_at),
        created_at: Set(token.created_at),
    };

    let model = active_model.insert(conn).await?;
    Ok(RefreshToken::from(model))
}

/// Revoke a single token if it is still active. Returns `false` when the
/// token is unknown or someone else revoked it first.
pub(crate) async fn revoke_if_active<C: ConnectionTrait>(conn: &C, token: &str) -> AppResult<bool> {
    let result = RefreshTokenEntity::update_many()
        .col_expr(refresh_token::Column::RevokedAt, Expr::value(Utc::now()))
        .filter(refresh_token::Column::Token.eq(token))
        .filter(refresh_token::Column::RevokedAt.is_null())
        .exec(conn)
        .await?;

    Ok(result.rows_affected == 1)
}

pub(crate) async fn revoke_all_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<u64> {
    let result = RefreshTokenEntity::update_many()
        .col_expr(refresh_token::Column::RevokedAt, Expr::value(Utc::now()))
        .filter(refresh_token::Column::UserId.eq(user_id))
        .filter(refresh_token::Column::RevokedAt.is_null())
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}
