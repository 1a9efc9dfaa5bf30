//! Expo feedback desk model
//!
//! Free-form feedback on an expo (distinct from per-session ratings),
//! submitted by registered attendees and worked by the organizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub id: i64,
    pub expo_id: i64,
    pub user_id: i64,
    pub subject: String,
    pub message: String,
    pub rating: Option<i32>,
    pub status: String,
    pub response: Option<String>,
    pub responded_by: Option<i64>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub expo_id: i64,
    pub user_id: i64,
    pub subject: String,
    pub message: String,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl FeedbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::Open => "open",
            FeedbackStatus::InProgress => "in_progress",
            FeedbackStatus::Resolved => "resolved",
            FeedbackStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(FeedbackStatus::Open),
            "in_progress" => Some(FeedbackStatus::InProgress),
            "resolved" => Some(FeedbackStatus::Resolved),
            "closed" => Some(FeedbackStatus::Closed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_status_round_trip() {
        for status in [
            FeedbackStatus::Open,
            FeedbackStatus::InProgress,
            FeedbackStatus::Resolved,
            FeedbackStatus::Closed,
        ] {
            assert_eq!(FeedbackStatus::parse(status.as_str()), Some(status));
        }
    }
}
