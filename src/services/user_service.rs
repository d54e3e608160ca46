//! User service - Handles user-related business logic.
//!
//! Orchestrates account operations via Unit of Work.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Password, UpdateProfile, User, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Page through users, searching name and email case-insensitively
    async fn list_users(
        &self,
        search: Option<String>,
        pagination: PaginationParams,
    ) -> AppResult<Paginated<User>>;

    /// Update the caller's own name/phone
    async fn update_profile(&self, id: Uuid, profile: UpdateProfile) -> AppResult<User>;

    /// Change another user's role, subject to the actor's own role
    async fn update_role(
        &self,
        actor_role: UserRole,
        target_id: Uuid,
        role: UserRole,
    ) -> AppResult<User>;

    /// Replace the password after checking the current one
    async fn change_password(
        &self,
        id: Uuid,
        old_password: String,
        new_password: String,
    ) -> AppResult<()>;

    /// Permanently delete a user
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_users(
        &self,
        search: Option<String>,
        pagination: PaginationParams,
    ) -> AppResult<Paginated<User>> {
        let PaginationParams { page, per_page } = pagination.normalized();
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let (users, total) = self.uow.users().list(search, page, per_page).await?;
        Ok(Paginated::new(users, page, per_page, total))
    }

    async fn update_profile(&self, id: Uuid, profile: UpdateProfile) -> AppResult<User> {
        let user = self.uow.users().update_profile(id, profile).await?;
        tracing::info!(user_id = %id, "Profile updated");
        Ok(user)
    }

    async fn update_role(
        &self,
        actor_role: UserRole,
        target_id: Uuid,
        role: UserRole,
    ) -> AppResult<User> {
        if !actor_role.can_assign(role) {
            return Err(AppError::Forbidden);
        }

        let target = self.get_user(target_id).await?;
        // Only admins touch admin accounts
        if target.is_admin() && !actor_role.is_admin() {
            return Err(AppError::Forbidden);
        }

        let user = self.uow.users().update_role(target_id, role).await?;
        tracing::info!(user_id = %target_id, from = %target.role, to = %role, "Role changed");
        Ok(user)
    }

    async fn change_password(
        &self,
        id: Uuid,
        old_password: String,
        new_password: String,
    ) -> AppResult<()> {
        let user = self.get_user(id).await?;

        if !Password::from_hash(user.password_hash).verify(&old_password) {
            return Err(AppError::validation("Current password is incorrect"));
        }

        let password = Password::new(&new_password)?;
        self.uow
            .users()
            .update_password(id, password.into_string())
            .await?;

        tracing::info!(user_id = %id, "Password changed");
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.uow.users().delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}
