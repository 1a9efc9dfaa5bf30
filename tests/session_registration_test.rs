//! Session registration engine integration tests
//!
//! Seat ceiling, duplicate precedence, idempotent unregistration, the
//! two-sided roster mirror, attendance marking and feedback aggregation.

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use serial_test::serial;
use ExpoHub::ExpoHubError;

#[tokio::test]
#[serial]
async fn test_seat_ceiling_is_enforced() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 0).await;
    let session = create_session(&services, &organizer, expo.id, 2).await;

    for user_id in [100, 101] {
        registered_attendee(&services, expo.id, user_id).await;
        services
            .session_service
            .register(&attendee_actor(user_id), session.id)
            .await
            .expect("registration under the ceiling should succeed");
    }

    registered_attendee(&services, expo.id, 102).await;
    let err = services
        .session_service
        .register(&attendee_actor(102), session.id)
        .await
        .unwrap_err();
    assert_matches!(err, ExpoHubError::Capacity(_));

    let full = services.session_service.get(session.id).await.unwrap();
    assert_eq!(full.attendee_count, 2);
    assert!(full.is_full());
}

#[tokio::test]
#[serial]
async fn test_duplicate_wins_over_capacity() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 0).await;
    let session = create_session(&services, &organizer, expo.id, 1).await;

    registered_attendee(&services, expo.id, 100).await;
    services
        .session_service
        .register(&attendee_actor(100), session.id)
        .await
        .unwrap();

    // The session is now full, but a re-registration by the same user must
    // read as Duplicate, not Capacity
    let err = services
        .session_service
        .register(&attendee_actor(100), session.id)
        .await
        .unwrap_err();
    assert_matches!(err, ExpoHubError::Duplicate(_));
}

#[tokio::test]
#[serial]
async fn test_registration_requires_expo_registration() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 0).await;
    let session = create_session(&services, &organizer, expo.id, 5).await;

    let err = services
        .session_service
        .register(&attendee_actor(999), session.id)
        .await
        .unwrap_err();
    assert_matches!(err, ExpoHubError::Validation(_));
}

#[tokio::test]
#[serial]
async fn test_unregister_is_idempotent_and_returns_the_seat() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 0).await;
    let session = create_session(&services, &organizer, expo.id, 1).await;

    let attendee = registered_attendee(&services, expo.id, 100).await;
    let actor = attendee_actor(100);
    services.session_service.register(&actor, session.id).await.unwrap();

    services.session_service.unregister(&actor, session.id).await.unwrap();
    // Second unregister is a no-op, not an error, and must not drive the
    // counter negative
    services.session_service.unregister(&actor, session.id).await.unwrap();

    let empty = services.session_service.get(session.id).await.unwrap();
    assert_eq!(empty.attendee_count, 0);

    // Both roster sides are clear
    let mirror = db.db().attendees.get_session_registrations(attendee.id).await.unwrap();
    assert!(mirror.is_empty());

    // The freed seat is takeable again
    registered_attendee(&services, expo.id, 101).await;
    services
        .session_service
        .register(&attendee_actor(101), session.id)
        .await
        .expect("freed seat should be takeable");
}

#[tokio::test]
#[serial]
async fn test_unregister_without_expo_registration_is_a_noop() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 0).await;
    let session = create_session(&services, &organizer, expo.id, 2).await;

    // A user who never registered for the expo has nothing to remove on
    // either roster side; that is still a success
    services
        .session_service
        .unregister(&attendee_actor(999), session.id)
        .await
        .expect("unregistering an unregistered user is a no-op");

    let untouched = services.session_service.get(session.id).await.unwrap();
    assert_eq!(untouched.attendee_count, 0);
}

#[tokio::test]
#[serial]
async fn test_registration_writes_both_roster_sides() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 0).await;
    let session = create_session(&services, &organizer, expo.id, 5).await;

    let attendee = registered_attendee(&services, expo.id, 100).await;
    services
        .session_service
        .register(&attendee_actor(100), session.id)
        .await
        .unwrap();

    let roster = db.db().sessions.get_attendees(session.id).await.unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].user_id, 100);

    let mirror = db.db().attendees.get_session_registrations(attendee.id).await.unwrap();
    assert_eq!(mirror.len(), 1);
    assert_eq!(mirror[0].session_id, session.id);
}

#[tokio::test]
#[serial]
async fn test_feedback_requires_attendance_and_overwrites() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 0).await;
    let session = create_session(&services, &organizer, expo.id, 5).await;

    registered_attendee(&services, expo.id, 100).await;
    let actor = attendee_actor(100);
    services.session_service.register(&actor, session.id).await.unwrap();

    // Registered but not yet marked attended
    let err = services
        .session_service
        .submit_feedback(&actor, session.id, 4, None)
        .await
        .unwrap_err();
    assert_matches!(err, ExpoHubError::Validation(_));

    services
        .session_service
        .mark_attendance(&organizer, session.id, 100, true)
        .await
        .unwrap();

    // Rating outside 1..=5 is refused
    let err = services
        .session_service
        .submit_feedback(&actor, session.id, 6, None)
        .await
        .unwrap_err();
    assert_matches!(err, ExpoHubError::Validation(_));

    // First submission, then an overwrite; the aggregate follows the latest
    services
        .session_service
        .submit_feedback(&actor, session.id, 3, Some("ok".to_string()))
        .await
        .unwrap();
    services
        .session_service
        .submit_feedback(&actor, session.id, 5, Some("great".to_string()))
        .await
        .unwrap();

    let rated = services.session_service.get(session.id).await.unwrap();
    assert_eq!(rated.rating_count, 1);
    assert!((rated.rating_average - 5.0).abs() < f64::EPSILON);
}

#[tokio::test]
#[serial]
async fn test_attendance_marking_is_organizer_gated() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 0).await;
    let session = create_session(&services, &organizer, expo.id, 5).await;

    registered_attendee(&services, expo.id, 100).await;
    let actor = attendee_actor(100);
    services.session_service.register(&actor, session.id).await.unwrap();

    // The attendee cannot mark their own attendance
    let err = services
        .session_service
        .mark_attendance(&actor, session.id, 100, true)
        .await
        .unwrap_err();
    assert_matches!(err, ExpoHubError::AccessDenied(_));

    // Marking an unregistered user is refused
    let err = services
        .session_service
        .mark_attendance(&organizer, session.id, 999, true)
        .await
        .unwrap_err();
    assert_matches!(err, ExpoHubError::NotFound { .. });
}

#[tokio::test]
#[serial]
async fn test_session_with_attendees_cannot_be_deleted_or_shrunk() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 0).await;
    let session = create_session(&services, &organizer, expo.id, 5).await;

    for user_id in [100, 101] {
        registered_attendee(&services, expo.id, user_id).await;
        services
            .session_service
            .register(&attendee_actor(user_id), session.id)
            .await
            .unwrap();
    }

    let err = services
        .session_service
        .delete(&organizer, session.id)
        .await
        .unwrap_err();
    assert_matches!(err, ExpoHubError::Conflict(_));

    // Ceiling may not drop below the roster
    let err = services
        .session_service
        .update(
            &organizer,
            session.id,
            ExpoHub::models::session::UpdateSessionRequest {
                max_attendees: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ExpoHubError::Validation(_));

    // Shrinking to exactly the roster size is allowed
    let updated = services
        .session_service
        .update(
            &organizer,
            session.id,
            ExpoHub::models::session::UpdateSessionRequest {
                max_attendees: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.max_attendees, 2);
}

#[tokio::test]
#[serial]
async fn test_analytics_reflect_roster_and_feedback() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 0).await;
    let session = create_session(&services, &organizer, expo.id, 4).await;

    for user_id in [100, 101] {
        registered_attendee(&services, expo.id, user_id).await;
        services
            .session_service
            .register(&attendee_actor(user_id), session.id)
            .await
            .unwrap();
    }
    services
        .session_service
        .mark_attendance(&organizer, session.id, 100, true)
        .await
        .unwrap();
    services
        .session_service
        .submit_feedback(&attendee_actor(100), session.id, 4, None)
        .await
        .unwrap();

    let analytics = services.session_service.analytics(session.id).await.unwrap();
    assert_eq!(analytics.total_registered, 2);
    assert_eq!(analytics.total_attended, 1);
    assert!((analytics.attendance_rate - 0.5).abs() < f64::EPSILON);
    assert_eq!(analytics.total_feedback, 1);
    assert!((analytics.average_rating - 4.0).abs() < f64::EPSILON);
    assert_eq!(analytics.capacity, 4);
    assert!((analytics.occupancy_rate - 0.5).abs() < f64::EPSILON);
}
