//! Session (schedule) model
//!
//! A session is a scheduled talk/activity within an expo with a hard
//! capacity ceiling. `attendee_count` is the compare-and-swap seat counter;
//! the roster rows in `session_attendees` are the authoritative membership.
//! `rating_average`/`rating_count` are recomputed from the full feedback
//! list on every feedback write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: i64,
    pub expo_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub room: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub max_attendees: i32,
    pub attendee_count: i32,
    pub registration_required: bool,
    pub status: String,
    pub rating_average: f64,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session-side roster entry, unique per (session, user)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionAttendee {
    pub id: i64,
    pub session_id: i64,
    pub user_id: i64,
    pub registered_at: DateTime<Utc>,
    pub attended: bool,
}

/// One feedback entry per (session, user); later submissions overwrite
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionFeedback {
    pub id: i64,
    pub session_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub expo_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub room: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub max_attendees: i32,
    pub registration_required: Option<bool>,
}

/// Allow-listed session update. The seat counter, roster and rating
/// aggregate are reachable only through the registration operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub room: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub max_attendees: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Ongoing => "ongoing",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(SessionStatus::Scheduled),
            "ongoing" => Some(SessionStatus::Ongoing),
            "completed" => Some(SessionStatus::Completed),
            "cancelled" => Some(SessionStatus::Cancelled),
            _ => None,
        }
    }
}

impl Session {
    pub fn is_full(&self) -> bool {
        self.attendee_count >= self.max_attendees
    }

    pub fn available_spots(&self) -> i32 {
        self.max_attendees - self.attendee_count
    }
}

/// Analytics snapshot for one session, computed from the roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAnalytics {
    pub total_registered: i64,
    pub total_attended: i64,
    pub attendance_rate: f64,
    pub average_rating: f64,
    pub total_feedback: i64,
    pub capacity: i32,
    pub occupancy_rate: f64,
}
