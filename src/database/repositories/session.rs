//! Session repository implementation
//!
//! The seat ceiling is enforced with a compare-and-swap on the session row:
//! `take_seat` increments the counter only while it is below `max_attendees`,
//! so of N racing registrations at the last seat exactly one sees an affected
//! row. Rating aggregates are recomputed from the full feedback list rather
//! than adjusted incrementally.

use chrono::Utc;
use sqlx::PgPool;

use crate::models::session::{
    CreateSessionRequest, Session, SessionAttendee, SessionFeedback, UpdateSessionRequest,
};
use crate::utils::errors::ExpoHubError;

const SESSION_COLUMNS: &str = "id, expo_id, title, description, room, starts_at, ends_at, \
     max_attendees, attendee_count, registration_required, status, rating_average, rating_count, \
     created_at, updated_at";

#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new session
    pub async fn create(&self, request: CreateSessionRequest) -> Result<Session, ExpoHubError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (expo_id, title, description, room, starts_at, ends_at, max_attendees, registration_required, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'scheduled', $9, $9)
            RETURNING id, expo_id, title, description, room, starts_at, ends_at, max_attendees, attendee_count, registration_required, status, rating_average, rating_count, created_at, updated_at
            "#,
        )
        .bind(request.expo_id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.room)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .bind(request.max_attendees)
        .bind(request.registration_required.unwrap_or(true))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Find session by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Session>, ExpoHubError> {
        let session = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// List sessions for an expo ordered by start time
    pub async fn list_by_expo(&self, expo_id: i64) -> Result<Vec<Session>, ExpoHubError> {
        let sessions = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE expo_id = $1 ORDER BY starts_at ASC"
        ))
        .bind(expo_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// Update session with allow-listed fields; `max_attendees` may not be
    /// lowered below the current roster size
    pub async fn update(&self, id: i64, request: UpdateSessionRequest) -> Result<Option<Session>, ExpoHubError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                room = COALESCE($4, room),
                starts_at = COALESCE($5, starts_at),
                ends_at = COALESCE($6, ends_at),
                max_attendees = COALESCE($7, max_attendees),
                updated_at = $8
            WHERE id = $1 AND ($7 IS NULL OR $7 >= attendee_count)
            RETURNING id, expo_id, title, description, room, starts_at, ends_at, max_attendees, attendee_count, registration_required, status, rating_average, rating_count, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.room)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .bind(request.max_attendees)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Delete the session unless it has registered attendees
    pub async fn delete_if_empty(&self, id: i64) -> Result<bool, ExpoHubError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1 AND attendee_count = 0")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Compare-and-swap seat take: increments the counter only below the
    /// ceiling. Returns whether a seat was taken.
    pub async fn take_seat(&self, id: i64) -> Result<bool, ExpoHubError> {
        let result = sqlx::query(
            "UPDATE sessions SET attendee_count = attendee_count + 1, updated_at = $2 WHERE id = $1 AND attendee_count < max_attendees"
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Return a seat to the pool; never drops below zero
    pub async fn return_seat(&self, id: i64) -> Result<bool, ExpoHubError> {
        let result = sqlx::query(
            "UPDATE sessions SET attendee_count = attendee_count - 1, updated_at = $2 WHERE id = $1 AND attendee_count > 0"
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Session-side roster insert; the unique (session, user) index rejects
    /// duplicate membership
    pub async fn add_attendee(&self, session_id: i64, user_id: i64) -> Result<SessionAttendee, ExpoHubError> {
        let attendee = sqlx::query_as::<_, SessionAttendee>(
            r#"
            INSERT INTO session_attendees (session_id, user_id, registered_at)
            VALUES ($1, $2, $3)
            RETURNING id, session_id, user_id, registered_at, attended
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(attendee)
    }

    /// Session-side roster removal
    pub async fn remove_attendee(&self, session_id: i64, user_id: i64) -> Result<bool, ExpoHubError> {
        let result = sqlx::query(
            "DELETE FROM session_attendees WHERE session_id = $1 AND user_id = $2",
        )
        .bind(session_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check roster membership
    pub async fn is_registered(&self, session_id: i64, user_id: i64) -> Result<bool, ExpoHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM session_attendees WHERE session_id = $1 AND user_id = $2",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Fetch one roster entry
    pub async fn get_attendee_entry(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<Option<SessionAttendee>, ExpoHubError> {
        let entry = sqlx::query_as::<_, SessionAttendee>(
            "SELECT id, session_id, user_id, registered_at, attended FROM session_attendees WHERE session_id = $1 AND user_id = $2",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Full roster ordered by registration time
    pub async fn get_attendees(&self, session_id: i64) -> Result<Vec<SessionAttendee>, ExpoHubError> {
        let attendees = sqlx::query_as::<_, SessionAttendee>(
            "SELECT id, session_id, user_id, registered_at, attended FROM session_attendees WHERE session_id = $1 ORDER BY registered_at ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attendees)
    }

    /// Update the attended flag on the session-side roster entry
    pub async fn set_attended(
        &self,
        session_id: i64,
        user_id: i64,
        attended: bool,
    ) -> Result<bool, ExpoHubError> {
        let result = sqlx::query(
            "UPDATE session_attendees SET attended = $3 WHERE session_id = $1 AND user_id = $2",
        )
        .bind(session_id)
        .bind(user_id)
        .bind(attended)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count roster entries marked attended
    pub async fn count_attended(&self, session_id: i64) -> Result<i64, ExpoHubError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM session_attendees WHERE session_id = $1 AND attended = true",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Upsert one feedback entry per (session, user); later submissions
    /// overwrite the rating and comment
    pub async fn upsert_feedback(
        &self,
        session_id: i64,
        user_id: i64,
        rating: i32,
        comment: Option<String>,
    ) -> Result<SessionFeedback, ExpoHubError> {
        let feedback = sqlx::query_as::<_, SessionFeedback>(
            r#"
            INSERT INTO session_feedback (session_id, user_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (session_id, user_id)
            DO UPDATE SET rating = EXCLUDED.rating, comment = EXCLUDED.comment
            RETURNING id, session_id, user_id, rating, comment, created_at
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .bind(rating)
        .bind(comment)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(feedback)
    }

    /// Full feedback list for a session
    pub async fn get_feedback(&self, session_id: i64) -> Result<Vec<SessionFeedback>, ExpoHubError> {
        let feedback = sqlx::query_as::<_, SessionFeedback>(
            "SELECT id, session_id, user_id, rating, comment, created_at FROM session_feedback WHERE session_id = $1 ORDER BY created_at ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(feedback)
    }

    /// Recompute the rating aggregate from the full feedback list
    pub async fn recompute_rating(&self, session_id: i64) -> Result<Option<Session>, ExpoHubError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET rating_average = COALESCE((SELECT AVG(rating)::float8 FROM session_feedback WHERE session_id = $1), 0),
                rating_count = (SELECT COUNT(*) FROM session_feedback WHERE session_id = $1),
                updated_at = $2
            WHERE id = $1
            RETURNING id, expo_id, title, description, room, starts_at, ends_at, max_attendees, attendee_count, registration_required, status, rating_average, rating_count, created_at, updated_at
            "#,
        )
        .bind(session_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Rebuild the seat counter from the roster. Recovery primitive for
    /// drift after a partial failure.
    pub async fn recompute_attendance(&self, session_id: i64) -> Result<Option<Session>, ExpoHubError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET attendee_count = (SELECT COUNT(*) FROM session_attendees WHERE session_id = $1),
                updated_at = $2
            WHERE id = $1
            RETURNING id, expo_id, title, description, room, starts_at, ends_at, max_attendees, attendee_count, registration_required, status, rating_average, rating_count, created_at, updated_at
            "#,
        )
        .bind(session_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }
}
