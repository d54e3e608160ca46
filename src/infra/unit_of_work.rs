//! Unit of Work pattern implementation.
//!
//! The Unit of Work:
//! - Centralizes access to all repositories
//! - Manages database transactions (begin, commit, rollback)
//! - Hands transaction-bound repositories to the closure it runs

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::{
    event_repository, participant_repository, password_reset_repository,
    refresh_token_repository, user_repository, EventRepository, EventStore,
    ParticipantRepository, ParticipantStore, PasswordResetRepository, PasswordResetStore,
    RefreshTokenRepository, RefreshTokenStore, UserRepository, UserStore,
};
use crate::domain::{Event, Participant, ParticipantStatus, PasswordReset, RefreshToken, User};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories and transaction management.
/// Note: This trait is not mockable directly due to generic methods.
/// For testing, mock at the repository level or use integration tests.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn refresh_tokens(&self) -> Arc<dyn RefreshTokenRepository>;

    fn events(&self) -> Arc<dyn EventRepository>;

    fn participants(&self) -> Arc<dyn ParticipantRepository>;

    fn password_resets(&self) -> Arc<dyn PasswordResetRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is committed on success or rolled back on error.
    /// Runs at ReadCommitted; callers that need exclusion take row locks.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
///
/// All repository operations performed through this context are part
/// of the same database transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn users(&self) -> TxUserRepository<'_> {
        TxUserRepository { txn: self.txn }
    }

    pub fn refresh_tokens(&self) -> TxRefreshTokenRepository<'_> {
        TxRefreshTokenRepository { txn: self.txn }
    }

    pub fn events(&self) -> TxEventRepository<'_> {
        TxEventRepository { txn: self.txn }
    }

    pub fn participants(&self) -> TxParticipantRepository<'_> {
        TxParticipantRepository { txn: self.txn }
    }

    pub fn password_resets(&self) -> TxPasswordResetRepository<'_> {
        TxPasswordResetRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork over a sea-orm connection pool
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    refresh_token_repo: Arc<RefreshTokenStore>,
    event_repo: Arc<EventStore>,
    participant_repo: Arc<ParticipantStore>,
    password_reset_repo: Arc<PasswordResetStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            refresh_token_repo: Arc::new(RefreshTokenStore::new(db.clone())),
            event_repo: Arc::new(EventStore::new(db.clone())),
            participant_repo: Arc::new(ParticipantStore::new(db.clone())),
            password_reset_repo: Arc::new(PasswordResetStore::new(db.clone())),
            db,
        }
    }

    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn refresh_tokens(&self) -> Arc<dyn RefreshTokenRepository> {
        self.refresh_token_repo.clone()
    }

    fn events(&self) -> Arc<dyn EventRepository> {
        self.event_repo.clone()
    }

    fn participants(&self) -> Arc<dyn ParticipantRepository> {
        self.participant_repo.clone()
    }

    fn password_resets(&self) -> Arc<dyn PasswordResetRepository> {
        self.password_reset_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f)
            .await
    }
}

/// Transaction-bound user repository.
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        user_repository::find_by_id(self.txn, id).await
    }

    pub async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        user_repository::update_password(self.txn, id, password_hash).await
    }
}

/// Transaction-bound refresh token repository.
pub struct TxRefreshTokenRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxRefreshTokenRepository<'a> {
    pub async fn create(&self, token: RefreshToken) -> AppResult<RefreshToken> {
        refresh_token_repository::insert(self.txn, token).await
    }

    /// Mark a token revoked only if it is still active.
    pub async fn revoke_if_active(&self, token: &str) -> AppResult<bool> {
        refresh_token_repository::revoke_if_active(self.txn, token).await
    }

    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        refresh_token_repository::revoke_all_for_user(self.txn, user_id).await
    }
}

/// Transaction-bound event repository.
pub struct TxEventRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxEventRepository<'a> {
    /// Load a live event and lock its row until commit.
    pub async fn find_for_update(&self, id: Uuid) -> AppResult<Option<Event>> {
        event_repository::find_for_update(self.txn, id).await
    }

    /// Insert an event together with its organizer links.
    pub async fn create(&self, event: &Event) -> AppResult<()> {
        event_repository::insert(self.txn, event).await
    }

    pub async fn update(&self, event: &Event) -> AppResult<()> {
        event_repository::update(self.txn, event).await
    }

    pub async fn set_confirmed_count(&self, id: Uuid, count: i32) -> AppResult<()> {
        event_repository::set_confirmed_count(self.txn, id, count).await
    }

    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        event_repository::soft_delete(self.txn, id).await
    }
}

/// Transaction-bound participant repository.
pub struct TxParticipantRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxParticipantRepository<'a> {
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Participant>> {
        participant_repository::find_by_id(self.txn, id).await
    }

    pub async fn count_approved(&self, event_id: Uuid) -> AppResult<u64> {
        participant_repository::count_approved(self.txn, event_id).await
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: ParticipantStatus,
    ) -> AppResult<Participant> {
        participant_repository::update_status(self.txn, id, status).await
    }

    pub async fn delete_if_pending(&self, id: Uuid) -> AppResult<bool> {
        participant_repository::delete_if_pending(self.txn, id).await
    }

    pub async fn delete_for_event(&self, event_id: Uuid) -> AppResult<u64> {
        participant_repository::delete_for_event(self.txn, event_id).await
    }
}

/// Transaction-bound password reset repository.
pub struct TxPasswordResetRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxPasswordResetRepository<'a> {
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<PasswordReset>> {
        password_reset_repository::find_by_token(self.txn, token).await
    }

    /// Delete a reset request. Returns `false` if another caller got there first.
    pub async fn consume(&self, id: Uuid) -> AppResult<bool> {
        password_reset_repository::consume(self.txn, id).await
    }
}
