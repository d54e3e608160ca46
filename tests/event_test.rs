//! Event service tests: creation rules, organizer-only maintenance and
//! listing filters.

mod common;

use chrono::{Duration, Utc};

use eventhub_api::domain::{Decision, EventFilter, EventPatch, EventQuery, EventType, UserRole};
use eventhub_api::errors::AppError;
use eventhub_api::services::ServiceContainer;

use common::{online_event, onsite_event, spawn_app};

#[tokio::test]
async fn test_create_event_makes_creator_organizer() {
    let app = spawn_app().await;
    let organizer = app.register("org@example.com", UserRole::Organizer).await;

    let event = app.create_event(&organizer, Some(10)).await;
    let stored = app.services.events().get_event(event.id).await.unwrap();

    assert_eq!(stored.organizer_ids, vec![organizer.id]);
    assert_eq!(stored.total_seats, Some(10));
    assert_eq!(stored.confirmed_count, 0);
}

#[tokio::test]
async fn test_create_event_enforces_invariants() {
    let app = spawn_app().await;
    let organizer = app.register("org@example.com", UserRole::Organizer).await;
    let events = app.services.events();

    let mut backwards = online_event("Backwards", None);
    backwards.end_at = backwards.start_at - Duration::hours(1);

    let mut no_venue = onsite_event("Nowhere", "Hall A");
    no_venue.venue = Some("   ".into());

    let mut no_link = online_event("Linkless", None);
    no_link.join_link = None;

    for data in [backwards, no_venue, no_link] {
        let result = events.create_event(organizer.id, data).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}

#[tokio::test]
async fn test_only_organizers_of_the_event_may_update_it() {
    let app = spawn_app().await;
    let owner = app.register("owner@example.com", UserRole::Organizer).await;
    let other = app.register("other@example.com", UserRole::Organizer).await;
    let event = app.create_event(&owner, None).await;

    let patch = EventPatch {
        title: Some("Hijacked".into()),
        ..Default::default()
    };
    let result = app.services.events().update_event(other.id, event.id, patch).await;
    assert!(matches!(result, Err(AppError::Forbidden)));

    let patch = EventPatch {
        title: Some("Rust meetup #2".into()),
        ..Default::default()
    };
    let updated = app
        .services
        .events()
        .update_event(owner.id, event.id, patch)
        .await
        .unwrap();
    assert_eq!(updated.title, "Rust meetup #2");
    assert_eq!(updated.description, event.description);
}

#[tokio::test]
async fn test_update_revalidates_merged_event() {
    let app = spawn_app().await;
    let owner = app.register("owner@example.com", UserRole::Organizer).await;
    let event = app.create_event(&owner, Some(5)).await;
    let events = app.services.events();

    // Switching to onsite without a venue
    let patch = EventPatch {
        event_type: Some(EventType::Onsite),
        ..Default::default()
    };
    let result = events.update_event(owner.id, event.id, patch).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let patch = EventPatch {
        unlimited_seats: true,
        ..Default::default()
    };
    let updated = events.update_event(owner.id, event.id, patch).await.unwrap();
    assert_eq!(updated.total_seats, None);
}

#[tokio::test]
async fn test_seats_cannot_drop_below_approved_count() {
    let app = spawn_app().await;
    let owner = app.register("owner@example.com", UserRole::Organizer).await;
    let event = app.create_event(&owner, Some(3)).await;

    for email in ["p1@example.com", "p2@example.com"] {
        let user = app.register(email, UserRole::Participant).await;
        let request = app
            .services
            .participants()
            .request_join(user.id, event.id)
            .await
            .unwrap();
        app.services
            .participants()
            .decide(owner.id, request.id, Decision::Approved)
            .await
            .unwrap();
    }

    let patch = EventPatch {
        total_seats: Some(1),
        ..Default::default()
    };
    let result = app.services.events().update_event(owner.id, event.id, patch).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let patch = EventPatch {
        total_seats: Some(2),
        ..Default::default()
    };
    let updated = app
        .services
        .events()
        .update_event(owner.id, event.id, patch)
        .await
        .unwrap();
    assert_eq!(updated.total_seats, Some(2));
    assert_eq!(updated.confirmed_count, 2);
}

#[tokio::test]
async fn test_delete_event_hides_it_and_drops_requests() {
    let app = spawn_app().await;
    let owner = app.register("owner@example.com", UserRole::Organizer).await;
    let guest = app.register("guest@example.com", UserRole::Participant).await;
    let event = app.create_event(&owner, None).await;
    let request = app
        .services
        .participants()
        .request_join(guest.id, event.id)
        .await
        .unwrap();

    assert!(matches!(
        app.services.events().delete_event(guest.id, event.id).await,
        Err(AppError::Forbidden)
    ));
    app.services.events().delete_event(owner.id, event.id).await.unwrap();

    assert!(matches!(
        app.services.events().get_event(event.id).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        app.services.participants().cancel(guest.id, request.id).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        app.services.events().delete_event(owner.id, event.id).await,
        Err(AppError::NotFound)
    ));

    let listed = app
        .services
        .events()
        .list_events(EventQuery::default())
        .await
        .unwrap();
    assert_eq!(listed.meta.total, 0);
}

#[tokio::test]
async fn test_list_events_filters_and_paginates() {
    let app = spawn_app().await;
    let owner = app.register("owner@example.com", UserRole::Organizer).await;
    let events = app.services.events();

    events
        .create_event(owner.id, online_event("Rust meetup", None))
        .await
        .unwrap();
    events
        .create_event(owner.id, onsite_event("Go night", "Hall B"))
        .await
        .unwrap();

    let mut finished = online_event("Rust retro", None);
    finished.start_at = Utc::now() - Duration::days(3);
    finished.end_at = finished.start_at + Duration::hours(2);
    events.create_event(owner.id, finished).await.unwrap();

    let search = events
        .list_events(EventQuery {
            search: Some("RUST".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(search.meta.total, 2);

    let onsite = events
        .list_events(EventQuery {
            event_type: Some(EventType::Onsite),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(onsite.meta.total, 1);
    assert_eq!(onsite.data[0].title, "Go night");

    let past = events
        .list_events(EventQuery {
            filter: Some(EventFilter::Past),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(past.meta.total, 1);
    assert_eq!(past.data[0].title, "Rust retro");

    let incoming = events
        .list_events(EventQuery {
            filter: Some(EventFilter::Incoming),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(incoming.meta.total, 2);

    let paged = events
        .list_events(EventQuery {
            page: Some(2),
            per_page: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(paged.data.len(), 1);
    assert_eq!(paged.meta.total, 3);
    assert_eq!(paged.meta.total_pages, 2);
}

#[tokio::test]
async fn test_list_my_events_only_returns_own_events() {
    let app = spawn_app().await;
    let mine = app.register("mine@example.com", UserRole::Organizer).await;
    let theirs = app.register("theirs@example.com", UserRole::Organizer).await;
    let own_event = app.create_event(&mine, None).await;
    app.create_event(&theirs, None).await;

    let listed = app
        .services
        .events()
        .list_my_events(mine.id, EventQuery::default())
        .await
        .unwrap();

    assert_eq!(listed.meta.total, 1);
    assert_eq!(listed.data[0].id, own_event.id);
}
