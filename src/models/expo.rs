//! Expo model
//!
//! The three counters (`booked_booths`, `exhibitors_count`, `attendees_count`)
//! are cached derivatives of the underlying booth/exhibitor/attendee rows.
//! The per-row status fields are authoritative; the counters are a
//! materialized view maintained by the lifecycle operations and rebuildable
//! through `ExpoService::recompute_counters`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Expo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub organizer_id: i64,
    pub status: String,
    pub registration_deadline: DateTime<Utc>,
    pub total_booths: i32,
    pub booked_booths: i32,
    pub exhibitors_count: i32,
    pub attendees_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExpoRequest {
    pub title: String,
    pub description: Option<String>,
    pub organizer_id: i64,
    pub registration_deadline: DateTime<Utc>,
    pub total_booths: i32,
}

/// Allow-listed expo update. Counters and `status` are never settable here;
/// status moves through `ExpoService::set_status` and counters only through
/// the lifecycle operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateExpoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub total_booths: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpoStatus {
    Draft,
    Published,
    Ongoing,
    Completed,
    Cancelled,
}

impl ExpoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpoStatus::Draft => "draft",
            ExpoStatus::Published => "published",
            ExpoStatus::Ongoing => "ongoing",
            ExpoStatus::Completed => "completed",
            ExpoStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ExpoStatus::Draft),
            "published" => Some(ExpoStatus::Published),
            "ongoing" => Some(ExpoStatus::Ongoing),
            "completed" => Some(ExpoStatus::Completed),
            "cancelled" => Some(ExpoStatus::Cancelled),
            _ => None,
        }
    }

    /// Forward lifecycle plus cancellation from any non-terminal state
    pub fn can_transition_to(&self, to: ExpoStatus) -> bool {
        use ExpoStatus::*;
        match (self, to) {
            (Draft, Published) => true,
            (Published, Ongoing) => true,
            (Ongoing, Completed) => true,
            (Draft, Cancelled) | (Published, Cancelled) | (Ongoing, Cancelled) => true,
            _ => false,
        }
    }
}

impl Expo {
    pub fn status_enum(&self) -> Option<ExpoStatus> {
        ExpoStatus::parse(&self.status)
    }

    /// Registration gates exhibitor applications and attendee registrations
    pub fn is_registration_open(&self, now: DateTime<Utc>) -> bool {
        self.status_enum() == Some(ExpoStatus::Published) && now < self.registration_deadline
    }

    pub fn available_booths(&self) -> i32 {
        self.total_booths - self.booked_booths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_expo(status: &str, deadline: DateTime<Utc>) -> Expo {
        Expo {
            id: 1,
            title: "Tech Expo".to_string(),
            description: None,
            organizer_id: 10,
            status: status.to_string(),
            registration_deadline: deadline,
            total_booths: 20,
            booked_booths: 5,
            exhibitors_count: 5,
            attendees_count: 40,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_registration_open_requires_published_and_future_deadline() {
        let now = Utc::now();
        let future = now + Duration::days(7);
        let past = now - Duration::days(1);

        assert!(sample_expo("published", future).is_registration_open(now));
        assert!(!sample_expo("published", past).is_registration_open(now));
        assert!(!sample_expo("draft", future).is_registration_open(now));
        assert!(!sample_expo("cancelled", future).is_registration_open(now));
    }

    #[test]
    fn test_status_transitions() {
        use ExpoStatus::*;
        assert!(Draft.can_transition_to(Published));
        assert!(Published.can_transition_to(Ongoing));
        assert!(Ongoing.can_transition_to(Completed));
        assert!(Published.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Published.can_transition_to(Draft));
        assert!(!Cancelled.can_transition_to(Published));
    }

    #[test]
    fn test_available_booths() {
        let expo = sample_expo("published", Utc::now());
        assert_eq!(expo.available_booths(), 15);
    }
}
