//! Session/token manager tests against a real database.

mod common;

use eventhub_api::domain::UserRole;
use eventhub_api::errors::AppError;
use eventhub_api::infra::UnitOfWork;
use eventhub_api::services::ServiceContainer;

use common::spawn_app;

#[tokio::test]
async fn test_issued_access_token_verifies_to_user() {
    let app = spawn_app().await;
    let user = app.register("alice@example.com", UserRole::Organizer).await;

    let pair = app.services.sessions().issue_token_pair(&user).await.unwrap();
    let claims = app.services.sessions().verify_access(&pair.access_token).unwrap();

    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.role, UserRole::Organizer);
    assert_eq!(pair.token_type, "Bearer");
}

#[tokio::test]
async fn test_refresh_token_rotates_exactly_once() {
    let app = spawn_app().await;
    let sessions = app.services.sessions();
    let user = app.register("bob@example.com", UserRole::Participant).await;

    let first = sessions.issue_token_pair(&user).await.unwrap();
    let second = sessions.rotate_refresh(&first.refresh_token).await.unwrap();
    assert_ne!(first.refresh_token, second.refresh_token);

    let replay = sessions.rotate_refresh(&first.refresh_token).await;
    assert!(matches!(replay, Err(AppError::TokenRevoked)));

    // The replacement is still good for one more rotation
    let third = sessions.rotate_refresh(&second.refresh_token).await.unwrap();
    let claims = sessions.verify_access(&third.access_token).unwrap();
    assert_eq!(claims.sub, user.id);

    let stored = app
        .uow
        .refresh_tokens()
        .find_by_token(&first.refresh_token)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.revoked_at.is_some());
}

#[tokio::test]
async fn test_revoke_all_is_idempotent() {
    let app = spawn_app().await;
    let sessions = app.services.sessions();
    let user = app.register("carol@example.com", UserRole::Participant).await;

    let laptop = sessions.issue_token_pair(&user).await.unwrap();
    let phone = sessions.issue_token_pair(&user).await.unwrap();

    assert_eq!(sessions.revoke_all_for_user(user.id).await.unwrap(), 2);
    assert_eq!(sessions.revoke_all_for_user(user.id).await.unwrap(), 0);

    for token in [laptop.refresh_token, phone.refresh_token] {
        assert!(matches!(
            sessions.rotate_refresh(&token).await,
            Err(AppError::TokenRevoked)
        ));
    }
}

#[tokio::test]
async fn test_revoke_all_leaves_other_users_alone() {
    let app = spawn_app().await;
    let sessions = app.services.sessions();
    let dave = app.register("dave@example.com", UserRole::Participant).await;
    let erin = app.register("erin@example.com", UserRole::Participant).await;

    sessions.issue_token_pair(&dave).await.unwrap();
    let erin_pair = sessions.issue_token_pair(&erin).await.unwrap();

    sessions.revoke_all_for_user(dave.id).await.unwrap();
    assert!(sessions.rotate_refresh(&erin_pair.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_replayed_refresh_token_ends_every_session() {
    let app = spawn_app().await;
    let auth = app.services.auth();
    app.register("frank@example.com", UserRole::Participant).await;

    let login = auth
        .login("frank@example.com".into(), common::PASSWORD.into())
        .await
        .unwrap();
    let rotated = auth.refresh(login.tokens.refresh_token.clone()).await.unwrap();

    let replay = auth.refresh(login.tokens.refresh_token).await;
    assert!(matches!(replay, Err(AppError::TokenRevoked)));

    // The legitimate holder's newer token went down with the replay
    let after = auth.refresh(rotated.refresh_token).await;
    assert!(matches!(after, Err(AppError::TokenRevoked)));
}

#[tokio::test]
async fn test_malformed_refresh_token_is_invalid() {
    let app = spawn_app().await;

    let result = app.services.sessions().rotate_refresh("not-a-token").await;
    assert!(matches!(result, Err(AppError::TokenInvalid)));
}

#[tokio::test]
async fn test_access_token_is_not_a_refresh_token() {
    let app = spawn_app().await;
    let user = app.register("grace@example.com", UserRole::Participant).await;
    let pair = app.services.sessions().issue_token_pair(&user).await.unwrap();

    let result = app.services.sessions().rotate_refresh(&pair.access_token).await;
    assert!(matches!(result, Err(AppError::TokenInvalid)));
}
