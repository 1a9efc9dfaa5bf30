//! Attendee registration repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::attendee::{Attendee, RegisterAttendeeRequest, SessionRegistration};
use crate::utils::errors::ExpoHubError;

const ATTENDEE_COLUMNS: &str =
    "id, expo_id, user_id, ticket_type, checked_in, check_in_time, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct AttendeeRepository {
    pool: PgPool,
}

impl AttendeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new expo registration
    pub async fn create(&self, request: RegisterAttendeeRequest) -> Result<Attendee, ExpoHubError> {
        let attendee = sqlx::query_as::<_, Attendee>(
            r#"
            INSERT INTO attendees (expo_id, user_id, ticket_type, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, expo_id, user_id, ticket_type, checked_in, check_in_time, created_at, updated_at
            "#,
        )
        .bind(request.expo_id)
        .bind(request.user_id)
        .bind(request.ticket_type.unwrap_or_else(|| "general".to_string()))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(attendee)
    }

    /// Find registration by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Attendee>, ExpoHubError> {
        let attendee = sqlx::query_as::<_, Attendee>(&format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attendee)
    }

    /// Find the registration a user holds for an expo
    pub async fn find_by_user_and_expo(
        &self,
        user_id: i64,
        expo_id: i64,
    ) -> Result<Option<Attendee>, ExpoHubError> {
        let attendee = sqlx::query_as::<_, Attendee>(&format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE user_id = $1 AND expo_id = $2"
        ))
        .bind(user_id)
        .bind(expo_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attendee)
    }

    /// List registrations for an expo
    pub async fn list_by_expo(&self, expo_id: i64, limit: i64, offset: i64) -> Result<Vec<Attendee>, ExpoHubError> {
        let attendees = sqlx::query_as::<_, Attendee>(&format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE expo_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(expo_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(attendees)
    }

    /// Mark the attendee as checked in; refused when already checked in
    pub async fn check_in(&self, id: i64) -> Result<Option<Attendee>, ExpoHubError> {
        let attendee = sqlx::query_as::<_, Attendee>(
            r#"
            UPDATE attendees
            SET checked_in = true, check_in_time = $2, updated_at = $2
            WHERE id = $1 AND checked_in = false
            RETURNING id, expo_id, user_id, ticket_type, checked_in, check_in_time, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(attendee)
    }

    /// Attendee-side mirror: add a session registration entry
    pub async fn add_session_registration(
        &self,
        attendee_id: i64,
        session_id: i64,
    ) -> Result<SessionRegistration, ExpoHubError> {
        let registration = sqlx::query_as::<_, SessionRegistration>(
            r#"
            INSERT INTO session_registrations (attendee_id, session_id, registered_at)
            VALUES ($1, $2, $3)
            RETURNING id, attendee_id, session_id, registered_at, attended
            "#,
        )
        .bind(attendee_id)
        .bind(session_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Attendee-side mirror: remove a session registration entry
    pub async fn remove_session_registration(
        &self,
        attendee_id: i64,
        session_id: i64,
    ) -> Result<bool, ExpoHubError> {
        let result = sqlx::query(
            "DELETE FROM session_registrations WHERE attendee_id = $1 AND session_id = $2",
        )
        .bind(attendee_id)
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Attendee-side mirror: update the attended flag
    pub async fn set_session_attended(
        &self,
        attendee_id: i64,
        session_id: i64,
        attended: bool,
    ) -> Result<bool, ExpoHubError> {
        let result = sqlx::query(
            "UPDATE session_registrations SET attended = $3 WHERE attendee_id = $1 AND session_id = $2",
        )
        .bind(attendee_id)
        .bind(session_id)
        .bind(attended)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The attendee's session registrations
    pub async fn get_session_registrations(
        &self,
        attendee_id: i64,
    ) -> Result<Vec<SessionRegistration>, ExpoHubError> {
        let registrations = sqlx::query_as::<_, SessionRegistration>(
            "SELECT id, attendee_id, session_id, registered_at, attended FROM session_registrations WHERE attendee_id = $1 ORDER BY registered_at ASC",
        )
        .bind(attendee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }
}
