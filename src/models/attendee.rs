//! Attendee registration model
//!
//! An attendee record is an individual's registration for one expo, unique
//! per (user, expo). Its `session_registrations` rows mirror the session-side
//! roster; the registration engine updates both sides together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attendee {
    pub id: i64,
    pub expo_id: i64,
    pub user_id: i64,
    pub ticket_type: String,
    pub checked_in: bool,
    pub check_in_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attendee-side mirror of a session roster entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionRegistration {
    pub id: i64,
    pub attendee_id: i64,
    pub session_id: i64,
    pub registered_at: DateTime<Utc>,
    pub attended: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAttendeeRequest {
    pub expo_id: i64,
    pub user_id: i64,
    pub ticket_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    General,
    Vip,
    Press,
    Student,
}

impl TicketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::General => "general",
            TicketType::Vip => "vip",
            TicketType::Press => "press",
            TicketType::Student => "student",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "general" => Some(TicketType::General),
            "vip" => Some(TicketType::Vip),
            "press" => Some(TicketType::Press),
            "student" => Some(TicketType::Student),
            _ => None,
        }
    }
}
