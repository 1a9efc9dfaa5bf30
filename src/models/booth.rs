//! Booth model and state machine
//!
//! Booth lifecycle: available -> reserved -> booked -> available, with
//! occupied/maintenance as organizer-set side states. Reservation expiry is
//! evaluated lazily: a reservation whose deadline has passed behaves as
//! available to every reader even before the row is written back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booth {
    pub id: i64,
    pub expo_id: i64,
    pub booth_number: String,
    pub status: String,
    pub exhibitor_id: Option<i64>,
    pub reserved_until: Option<DateTime<Utc>>,
    /// Opaque payload supplied at booking time (company info, staff list)
    pub booth_details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoothRequest {
    pub expo_id: i64,
    pub booth_number: String,
    pub booth_details: Option<serde_json::Value>,
}

/// Allow-listed booth update. `status`, `exhibitor_id` and `reserved_until`
/// are reachable only through the state-machine operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBoothRequest {
    pub booth_number: Option<String>,
    pub booth_details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoothStatus {
    Available,
    Reserved,
    Booked,
    Occupied,
    Maintenance,
}

impl BoothStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoothStatus::Available => "available",
            BoothStatus::Reserved => "reserved",
            BoothStatus::Booked => "booked",
            BoothStatus::Occupied => "occupied",
            BoothStatus::Maintenance => "maintenance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(BoothStatus::Available),
            "reserved" => Some(BoothStatus::Reserved),
            "booked" => Some(BoothStatus::Booked),
            "occupied" => Some(BoothStatus::Occupied),
            "maintenance" => Some(BoothStatus::Maintenance),
            _ => None,
        }
    }
}

/// Status as any reader must interpret it: a reservation whose deadline has
/// lapsed counts as available.
pub fn effective_status(
    status: BoothStatus,
    reserved_until: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> BoothStatus {
    match (status, reserved_until) {
        (BoothStatus::Reserved, Some(deadline)) if deadline <= now => BoothStatus::Available,
        (BoothStatus::Reserved, None) => BoothStatus::Available,
        (other, _) => other,
    }
}

/// Reserve is allowed only when the booth is effectively available; an
/// unexpired reservation blocks new reservations.
pub fn can_reserve(effective: BoothStatus) -> bool {
    effective == BoothStatus::Available
}

/// Book is allowed from available or reserved regardless of expiry; booking
/// overrides a stale hold, and a live hold is finalized by the booking.
pub fn can_book(raw: BoothStatus) -> bool {
    matches!(raw, BoothStatus::Available | BoothStatus::Reserved)
}

/// Deletion is refused while the booth is booked.
pub fn can_delete(raw: BoothStatus) -> bool {
    raw != BoothStatus::Booked
}

impl Booth {
    pub fn status_enum(&self) -> Option<BoothStatus> {
        BoothStatus::parse(&self.status)
    }

    /// Lazily-evaluated status (see [`effective_status`])
    pub fn effective_status(&self, now: DateTime<Utc>) -> Option<BoothStatus> {
        self.status_enum()
            .map(|s| effective_status(s, self.reserved_until, now))
    }
}
