//! User service unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::predicate::eq;
use uuid::Uuid;

use eventhub_api::config::MAX_PAGE_SIZE;
use eventhub_api::domain::{Password, User, UserRole};
use eventhub_api::errors::{AppError, AppResult};
use eventhub_api::infra::{
    EventRepository, MockEventRepository, MockParticipantRepository,
    MockPasswordResetRepository, MockRefreshTokenRepository, MockUserRepository,
    ParticipantRepository, PasswordResetRepository, RefreshTokenRepository, TransactionContext,
    UnitOfWork, UserRepository,
};
use eventhub_api::services::{UserManager, UserService};
use eventhub_api::types::PaginationParams;

fn create_test_user(id: Uuid, role: UserRole) -> User {
    let mut user = User::new(
        "test@example.com".to_string(),
        "hashed".to_string(),
        "Test User".to_string(),
        None,
        role,
    );
    user.id = id;
    user
}

/// Test mock for UnitOfWork that wraps a MockUserRepository
struct TestUnitOfWork {
    user_repo: Arc<MockUserRepository>,
}

impl TestUnitOfWork {
    fn new(user_repo: MockUserRepository) -> Self {
        Self {
            user_repo: Arc::new(user_repo),
        }
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    // The user service never touches these; an unexpected call panics.
    fn refresh_tokens(&self) -> Arc<dyn RefreshTokenRepository> {
        Arc::new(MockRefreshTokenRepository::new())
    }

    fn events(&self) -> Arc<dyn EventRepository> {
        Arc::new(MockEventRepository::new())
    }

    fn participants(&self) -> Arc<dyn ParticipantRepository> {
        Arc::new(MockParticipantRepository::new())
    }

    fn password_resets(&self) -> Arc<dyn PasswordResetRepository> {
        Arc::new(MockPasswordResetRepository::new())
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        // Transaction not supported in test mock
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}

fn service(repo: MockUserRepository) -> UserManager<TestUnitOfWork> {
    UserManager::new(Arc::new(TestUnitOfWork::new(repo)))
}

#[tokio::test]
async fn test_get_user_success() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .with(eq(user_id))
        .returning(|id| Ok(Some(create_test_user(id, UserRole::Participant))));

    let result = service(repo).get_user(user_id).await;

    assert!(result.is_ok());
    assert_eq!(result.unwrap().id, user_id);
}

#[tokio::test]
async fn test_get_user_not_found() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().returning(|_| Ok(None));

    let result = service(repo).get_user(Uuid::new_v4()).await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn test_list_users_clamps_pagination_and_trims_search() {
    let mut repo = MockUserRepository::new();
    repo.expect_list()
        .with(eq(Some("jane".to_string())), eq(1), eq(MAX_PAGE_SIZE))
        .times(1)
        .returning(|_, _, _| {
            Ok((
                vec![
                    create_test_user(Uuid::new_v4(), UserRole::Participant),
                    create_test_user(Uuid::new_v4(), UserRole::Organizer),
                ],
                2,
            ))
        });

    let pagination = PaginationParams {
        page: 0,
        per_page: 5_000,
    };
    let page = service(repo)
        .list_users(Some("  jane ".into()), pagination)
        .await
        .unwrap();

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.meta.per_page, MAX_PAGE_SIZE);
    assert_eq!(page.meta.total_pages, 1);
}

#[tokio::test]
async fn test_blank_search_is_ignored() {
    let mut repo = MockUserRepository::new();
    repo.expect_list()
        .with(eq(None::<String>), eq(1), eq(10))
        .returning(|_, _, _| Ok((vec![], 0)));

    let page = service(repo)
        .list_users(Some("   ".into()), PaginationParams::default())
        .await
        .unwrap();

    assert_eq!(page.meta.total, 0);
}

#[tokio::test]
async fn test_participant_cannot_change_roles() {
    let repo = MockUserRepository::new();

    let result = service(repo)
        .update_role(UserRole::Participant, Uuid::new_v4(), UserRole::Organizer)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_organizer_cannot_grant_admin() {
    let repo = MockUserRepository::new();

    let result = service(repo)
        .update_role(UserRole::Organizer, Uuid::new_v4(), UserRole::Admin)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_organizer_cannot_demote_admin() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(create_test_user(id, UserRole::Admin))));
    repo.expect_update_role().never();

    let result = service(repo)
        .update_role(UserRole::Organizer, Uuid::new_v4(), UserRole::Participant)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_organizer_promotes_participant() {
    let target = Uuid::new_v4();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .returning(|id| Ok(Some(create_test_user(id, UserRole::Participant))));
    repo.expect_update_role()
        .with(eq(target), eq(UserRole::Organizer))
        .times(1)
        .returning(|id, role| Ok(create_test_user(id, role)));

    let user = service(repo)
        .update_role(UserRole::Organizer, target, UserRole::Organizer)
        .await
        .unwrap();

    assert_eq!(user.role, UserRole::Organizer);
}

#[tokio::test]
async fn test_change_password_requires_current_password() {
    let hash = Password::new("current-password").unwrap().into_string();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().returning(move |id| {
        let mut user = create_test_user(id, UserRole::Participant);
        user.password_hash = hash.clone();
        Ok(Some(user))
    });
    repo.expect_update_password().never();

    let result = service(repo)
        .change_password(Uuid::new_v4(), "wrong-guess".into(), "next-password".into())
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_change_password_stores_new_hash() {
    let user_id = Uuid::new_v4();
    let hash = Password::new("current-password").unwrap().into_string();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().returning(move |id| {
        let mut user = create_test_user(id, UserRole::Participant);
        user.password_hash = hash.clone();
        Ok(Some(user))
    });
    repo.expect_update_password()
        .withf(move |id, new_hash| {
            *id == user_id && Password::from_hash(new_hash.as_str()).verify("next-password")
        })
        .times(1)
        .returning(|_, _| Ok(()));

    service(repo)
        .change_password(user_id, "current-password".into(), "next-password".into())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_user_propagates_not_found() {
    let mut repo = MockUserRepository::new();
    repo.expect_delete().returning(|_| Err(AppError::NotFound));

    let result = service(repo).delete_user(Uuid::new_v4()).await;

    assert!(matches!(result, Err(AppError::NotFound)));
}
