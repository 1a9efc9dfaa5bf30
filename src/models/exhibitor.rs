//! Exhibitor application model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A vendor's application to exhibit at one expo. One application per
/// (user, expo) pair; a booth may be held only while the application is
/// approved.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exhibitor {
    pub id: i64,
    pub expo_id: i64,
    pub user_id: i64,
    pub company_name: String,
    pub company_description: Option<String>,
    pub application_status: String,
    pub application_date: DateTime<Utc>,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub assigned_booth_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyExhibitorRequest {
    pub expo_id: i64,
    pub user_id: i64,
    pub company_name: String,
    pub company_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewApplicationRequest {
    pub status: ApplicationStatus,
    pub review_notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Waitlisted,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Waitlisted => "waitlisted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApplicationStatus::Pending),
            "approved" => Some(ApplicationStatus::Approved),
            "rejected" => Some(ApplicationStatus::Rejected),
            "waitlisted" => Some(ApplicationStatus::Waitlisted),
            _ => None,
        }
    }
}

impl Exhibitor {
    pub fn is_approved(&self) -> bool {
        self.application_status == ApplicationStatus::Approved.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_status_round_trip() {
        for status in [
            ApplicationStatus::Pending,
            ApplicationStatus::Approved,
            ApplicationStatus::Rejected,
            ApplicationStatus::Waitlisted,
        ] {
            assert_eq!(ApplicationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ApplicationStatus::parse("accepted"), None);
    }
}
