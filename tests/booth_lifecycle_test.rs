//! Booth lifecycle integration tests
//!
//! Exercises the booking state machine against the expo-level booked-booths
//! ledger: booking, double-booking refusal, release with counter settlement,
//! reservation holds and deletion guards.

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use serial_test::serial;
use ExpoHub::ExpoHubError;

#[tokio::test]
#[serial]
async fn test_book_and_release_settle_the_ledger() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 2).await;
    let booths = create_booths(&services, &organizer, expo.id, 2).await;
    let exhibitor = approved_exhibitor(&services, &organizer, expo.id, 20).await;

    let booked = services
        .booth_service
        .book(&exhibitor_actor(20), booths[0].id, exhibitor.id, None)
        .await
        .expect("booking should succeed");
    assert_eq!(booked.status, "booked");
    assert_eq!(booked.exhibitor_id, Some(exhibitor.id));

    let expo_after = services.expo_service.get(expo.id).await.unwrap();
    assert_eq!(expo_after.booked_booths, 1);

    // Back-reference points at the booked booth
    let application = services.exhibitor_service.get(exhibitor.id).await.unwrap();
    assert_eq!(application.assigned_booth_id, Some(booths[0].id));

    // A second exhibitor cannot take the same booth
    let rival = approved_exhibitor(&services, &organizer, expo.id, 21).await;
    let err = services
        .booth_service
        .book(&exhibitor_actor(21), booths[0].id, rival.id, None)
        .await
        .unwrap_err();
    assert_matches!(err, ExpoHubError::Conflict(_));

    // Release returns the booth and settles counter and back-reference
    let released = services
        .booth_service
        .release(&organizer, booths[0].id)
        .await
        .expect("release should succeed");
    assert_eq!(released.status, "available");
    assert_eq!(released.exhibitor_id, None);

    let expo_final = services.expo_service.get(expo.id).await.unwrap();
    assert_eq!(expo_final.booked_booths, 0);
    let application = services.exhibitor_service.get(exhibitor.id).await.unwrap();
    assert_eq!(application.assigned_booth_id, None);
}

#[tokio::test]
#[serial]
async fn test_release_is_idempotent_on_available_booth() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 1).await;
    let booths = create_booths(&services, &organizer, expo.id, 1).await;

    // Releasing an already-available booth must not drive the counter negative
    services.booth_service.release(&organizer, booths[0].id).await.unwrap();
    services.booth_service.release(&organizer, booths[0].id).await.unwrap();

    let expo_after = services.expo_service.get(expo.id).await.unwrap();
    assert_eq!(expo_after.booked_booths, 0);
}

#[tokio::test]
#[serial]
async fn test_reservation_hold_blocks_and_booking_overrides() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 1).await;
    let booths = create_booths(&services, &organizer, expo.id, 1).await;
    let holder = exhibitor_actor(30);

    let reserved = services
        .booth_service
        .reserve(&holder, booths[0].id, Some(15))
        .await
        .expect("reserve should succeed");
    assert_eq!(reserved.status, "reserved");
    assert!(reserved.reserved_until.is_some());

    // A live hold blocks a second reservation
    let err = services
        .booth_service
        .reserve(&exhibitor_actor(31), booths[0].id, None)
        .await
        .unwrap_err();
    assert_matches!(err, ExpoHubError::Conflict(_));

    // But booking finalizes the hold
    let exhibitor = approved_exhibitor(&services, &organizer, expo.id, 30).await;
    let booked = services
        .booth_service
        .book(&holder, booths[0].id, exhibitor.id, None)
        .await
        .expect("booking over own hold should succeed");
    assert_eq!(booked.status, "booked");
    assert_eq!(booked.reserved_until, None);
}

#[tokio::test]
#[serial]
async fn test_lapsed_hold_is_reservable_again() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 1).await;
    let booths = create_booths(&services, &organizer, expo.id, 1).await;

    services
        .booth_service
        .reserve(&exhibitor_actor(30), booths[0].id, Some(15))
        .await
        .unwrap();

    // Force the hold into the past; no sweeper runs, expiry is lazy
    sqlx::query("UPDATE booths SET reserved_until = NOW() - INTERVAL '1 minute' WHERE id = $1")
        .bind(booths[0].id)
        .execute(&db.pool)
        .await
        .unwrap();

    let reserved = services
        .booth_service
        .reserve(&exhibitor_actor(31), booths[0].id, None)
        .await
        .expect("lapsed hold should be reservable");
    assert_eq!(reserved.status, "reserved");
}

#[tokio::test]
#[serial]
async fn test_reservation_duration_is_bounded() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 1).await;
    let booths = create_booths(&services, &organizer, expo.id, 1).await;

    let err = services
        .booth_service
        .reserve(&exhibitor_actor(30), booths[0].id, Some(100_000))
        .await
        .unwrap_err();
    assert_matches!(err, ExpoHubError::Validation(_));

    let err = services
        .booth_service
        .reserve(&exhibitor_actor(30), booths[0].id, Some(0))
        .await
        .unwrap_err();
    assert_matches!(err, ExpoHubError::Validation(_));
}

#[tokio::test]
#[serial]
async fn test_booked_booth_cannot_be_deleted() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 1).await;
    let booths = create_booths(&services, &organizer, expo.id, 1).await;
    let exhibitor = approved_exhibitor(&services, &organizer, expo.id, 20).await;

    services
        .booth_service
        .book(&exhibitor_actor(20), booths[0].id, exhibitor.id, None)
        .await
        .unwrap();

    let err = services
        .booth_service
        .delete(&organizer, booths[0].id)
        .await
        .unwrap_err();
    assert_matches!(err, ExpoHubError::Conflict(_));

    // The expo itself is also protected while a booth is booked
    let err = services.expo_service.delete(&organizer, expo.id).await.unwrap_err();
    assert_matches!(err, ExpoHubError::Conflict(_));

    // After release both deletions go through
    services.booth_service.release(&organizer, booths[0].id).await.unwrap();
    services.booth_service.delete(&organizer, booths[0].id).await.unwrap();
    services.expo_service.delete(&organizer, expo.id).await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_assign_booth_moves_without_losing_the_ledger() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 2).await;
    let booths = create_booths(&services, &organizer, expo.id, 2).await;
    let exhibitor = approved_exhibitor(&services, &organizer, expo.id, 20).await;

    let assigned = services
        .exhibitor_service
        .assign_booth(&organizer, exhibitor.id, booths[0].id)
        .await
        .expect("first assignment should succeed");
    assert_eq!(assigned.assigned_booth_id, Some(booths[0].id));

    let moved = services
        .exhibitor_service
        .assign_booth(&organizer, exhibitor.id, booths[1].id)
        .await
        .expect("move should succeed");
    assert_eq!(moved.assigned_booth_id, Some(booths[1].id));

    // The old booth went back to the pool and the ledger counted the move
    // exactly once
    let old_booth = services.booth_service.get(booths[0].id).await.unwrap();
    assert_eq!(old_booth.status, "available");
    let expo_after = services.expo_service.get(expo.id).await.unwrap();
    assert_eq!(expo_after.booked_booths, 1);
}

#[tokio::test]
#[serial]
async fn test_failed_move_keeps_the_current_booth() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 2).await;
    let booths = create_booths(&services, &organizer, expo.id, 2).await;
    let first = approved_exhibitor(&services, &organizer, expo.id, 20).await;
    let second = approved_exhibitor(&services, &organizer, expo.id, 21).await;

    services
        .exhibitor_service
        .assign_booth(&organizer, first.id, booths[0].id)
        .await
        .unwrap();
    services
        .exhibitor_service
        .assign_booth(&organizer, second.id, booths[1].id)
        .await
        .unwrap();

    // Moving onto an occupied booth fails, and the mover keeps their booth
    let err = services
        .exhibitor_service
        .assign_booth(&organizer, first.id, booths[1].id)
        .await
        .unwrap_err();
    assert_matches!(err, ExpoHubError::Conflict(_));

    let unchanged = services.exhibitor_service.get(first.id).await.unwrap();
    assert_eq!(unchanged.assigned_booth_id, Some(booths[0].id));
    let still_booked = services.booth_service.get(booths[0].id).await.unwrap();
    assert_eq!(still_booked.status, "booked");
    let expo_after = services.expo_service.get(expo.id).await.unwrap();
    assert_eq!(expo_after.booked_booths, 2);
}

#[tokio::test]
#[serial]
async fn test_unapproved_exhibitor_cannot_book() {
    let db = TestDatabase::new().await.expect("test database");
    db.cleanup().await.expect("cleanup");
    let services = db.services();

    let organizer = organizer_actor(10);
    let expo = create_published_expo(&services, &organizer, 1).await;
    let booths = create_booths(&services, &organizer, expo.id, 1).await;

    let applicant = exhibitor_actor(40);
    let application = services
        .exhibitor_service
        .apply(
            &applicant,
            ExpoHub::models::exhibitor::ApplyExhibitorRequest {
                expo_id: expo.id,
                user_id: 40,
                company_name: "Pending Co".to_string(),
                company_description: None,
            },
        )
        .await
        .unwrap();

    let err = services
        .booth_service
        .book(&applicant, booths[0].id, application.id, None)
        .await
        .unwrap_err();
    assert_matches!(err, ExpoHubError::Validation(_));
}
