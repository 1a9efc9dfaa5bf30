//! Test data builders
//!
//! Builders that run through the real services so every fixture respects the
//! same invariants the tests then exercise.

use chrono::{Duration, Utc};
use fake::faker::company::en::CompanyName;
use fake::Fake;

use ExpoHub::models::actor::{Actor, Role};
use ExpoHub::models::attendee::{Attendee, RegisterAttendeeRequest};
use ExpoHub::models::booth::{Booth, CreateBoothRequest};
use ExpoHub::models::exhibitor::{
    ApplicationStatus, ApplyExhibitorRequest, Exhibitor, ReviewApplicationRequest,
};
use ExpoHub::models::expo::{CreateExpoRequest, Expo, ExpoStatus};
use ExpoHub::models::session::{CreateSessionRequest, Session};
use ExpoHub::services::ServiceFactory;

pub fn admin_actor() -> Actor {
    Actor::new(1, Role::Admin)
}

pub fn organizer_actor(user_id: i64) -> Actor {
    Actor::new(user_id, Role::Organizer)
}

pub fn attendee_actor(user_id: i64) -> Actor {
    Actor::new(user_id, Role::Attendee)
}

pub fn exhibitor_actor(user_id: i64) -> Actor {
    Actor::new(user_id, Role::Exhibitor)
}

/// Create an expo and publish it so registration is open
pub async fn create_published_expo(
    services: &ServiceFactory,
    organizer: &Actor,
    total_booths: i32,
) -> Expo {
    let expo = services
        .expo_service
        .create(
            organizer,
            CreateExpoRequest {
                title: format!("{} Expo", CompanyName().fake::<String>()),
                description: Some("Integration test expo".to_string()),
                organizer_id: organizer.user_id,
                registration_deadline: Utc::now() + Duration::days(30),
                total_booths,
            },
        )
        .await
        .expect("Failed to create expo");

    services
        .expo_service
        .set_status(organizer, expo.id, ExpoStatus::Published)
        .await
        .expect("Failed to publish expo")
}

/// Create numbered booths on an expo
pub async fn create_booths(
    services: &ServiceFactory,
    organizer: &Actor,
    expo_id: i64,
    count: usize,
) -> Vec<Booth> {
    let requests = (1..=count)
        .map(|n| CreateBoothRequest {
            expo_id,
            booth_number: format!("B-{n:03}"),
            booth_details: None,
        })
        .collect();

    services
        .booth_service
        .create_many(organizer, expo_id, requests)
        .await
        .expect("Failed to create booths")
}

/// Apply and approve an exhibitor for an expo
pub async fn approved_exhibitor(
    services: &ServiceFactory,
    organizer: &Actor,
    expo_id: i64,
    user_id: i64,
) -> Exhibitor {
    let applicant = exhibitor_actor(user_id);
    let application = services
        .exhibitor_service
        .apply(
            &applicant,
            ApplyExhibitorRequest {
                expo_id,
                user_id,
                company_name: CompanyName().fake(),
                company_description: None,
            },
        )
        .await
        .expect("Failed to apply");

    services
        .exhibitor_service
        .review(
            organizer,
            application.id,
            ReviewApplicationRequest {
                status: ApplicationStatus::Approved,
                review_notes: None,
            },
        )
        .await
        .expect("Failed to approve application")
}

/// Register a user as an attendee of an expo
pub async fn registered_attendee(
    services: &ServiceFactory,
    expo_id: i64,
    user_id: i64,
) -> Attendee {
    let actor = attendee_actor(user_id);
    services
        .attendee_service
        .register(
            &actor,
            RegisterAttendeeRequest {
                expo_id,
                user_id,
                ticket_type: None,
            },
        )
        .await
        .expect("Failed to register attendee")
}

/// Schedule a session with the given seat ceiling
pub async fn create_session(
    services: &ServiceFactory,
    organizer: &Actor,
    expo_id: i64,
    max_attendees: i32,
) -> Session {
    let starts_at = Utc::now() + Duration::days(1);
    services
        .session_service
        .create(
            organizer,
            CreateSessionRequest {
                expo_id,
                title: "Keynote".to_string(),
                description: None,
                room: Some("Hall A".to_string()),
                starts_at,
                ends_at: starts_at + Duration::hours(1),
                max_attendees,
                registration_required: Some(true),
            },
        )
        .await
        .expect("Failed to create session")
}
