//! Expo repository implementation
//!
//! Counter mutations are guarded single-statement updates so a lost race or a
//! replayed request can never push a counter outside its bounds; callers see
//! `false` when the guard rejected the write.

use chrono::Utc;
use sqlx::PgPool;

use crate::models::expo::{CreateExpoRequest, Expo, UpdateExpoRequest};
use crate::utils::errors::ExpoHubError;

const EXPO_COLUMNS: &str = "id, title, description, organizer_id, status, registration_deadline, \
     total_booths, booked_booths, exhibitors_count, attendees_count, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ExpoRepository {
    pool: PgPool,
}

impl ExpoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new expo
    pub async fn create(&self, request: CreateExpoRequest) -> Result<Expo, ExpoHubError> {
        let expo = sqlx::query_as::<_, Expo>(
            r#"
            INSERT INTO expos (title, description, organizer_id, status, registration_deadline, total_booths, created_at, updated_at)
            VALUES ($1, $2, $3, 'draft', $4, $5, $6, $6)
            RETURNING id, title, description, organizer_id, status, registration_deadline, total_booths, booked_booths, exhibitors_count, attendees_count, created_at, updated_at
            "#
        )
        .bind(request.title)
        .bind(request.description)
        .bind(request.organizer_id)
        .bind(request.registration_deadline)
        .bind(request.total_booths)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(expo)
    }

    /// Find expo by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Expo>, ExpoHubError> {
        let expo = sqlx::query_as::<_, Expo>(&format!(
            "SELECT {EXPO_COLUMNS} FROM expos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expo)
    }

    /// Update expo with allow-listed fields
    pub async fn update(&self, id: i64, request: UpdateExpoRequest) -> Result<Option<Expo>, ExpoHubError> {
        let expo = sqlx::query_as::<_, Expo>(
            r#"
            UPDATE expos
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                registration_deadline = COALESCE($4, registration_deadline),
                total_booths = COALESCE($5, total_booths),
                updated_at = $6
            WHERE id = $1
            RETURNING id, title, description, organizer_id, status, registration_deadline, total_booths, booked_booths, exhibitors_count, attendees_count, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.registration_deadline)
        .bind(request.total_booths)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(expo)
    }

    /// Set expo status, conditional on the expected current status
    pub async fn set_status(&self, id: i64, from: &str, to: &str) -> Result<Option<Expo>, ExpoHubError> {
        let expo = sqlx::query_as::<_, Expo>(
            r#"
            UPDATE expos
            SET status = $3, updated_at = $4
            WHERE id = $1 AND status = $2
            RETURNING id, title, description, organizer_id, status, registration_deadline, total_booths, booked_booths, exhibitors_count, attendees_count, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(expo)
    }

    /// Delete expo; child rows cascade
    pub async fn delete(&self, id: i64) -> Result<bool, ExpoHubError> {
        let result = sqlx::query("DELETE FROM expos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List expos with pagination
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Expo>, ExpoHubError> {
        let expos = sqlx::query_as::<_, Expo>(&format!(
            "SELECT {EXPO_COLUMNS} FROM expos ORDER BY registration_deadline ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(expos)
    }

    /// Get expos owned by an organizer
    pub async fn list_by_organizer(&self, organizer_id: i64) -> Result<Vec<Expo>, ExpoHubError> {
        let expos = sqlx::query_as::<_, Expo>(&format!(
            "SELECT {EXPO_COLUMNS} FROM expos WHERE organizer_id = $1 ORDER BY registration_deadline ASC"
        ))
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(expos)
    }

    /// Increment the booked-booths counter; refused when it would exceed
    /// `total_booths`
    pub async fn increment_booked_booths(&self, id: i64) -> Result<bool, ExpoHubError> {
        let result = sqlx::query(
            "UPDATE expos SET booked_booths = booked_booths + 1, updated_at = $2 WHERE id = $1 AND booked_booths < total_booths"
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Decrement the booked-booths counter; never drops below zero
    pub async fn decrement_booked_booths(&self, id: i64) -> Result<bool, ExpoHubError> {
        let result = sqlx::query(
            "UPDATE expos SET booked_booths = booked_booths - 1, updated_at = $2 WHERE id = $1 AND booked_booths > 0"
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Increment the approved-exhibitors counter
    pub async fn increment_exhibitors_count(&self, id: i64) -> Result<bool, ExpoHubError> {
        let result = sqlx::query(
            "UPDATE expos SET exhibitors_count = exhibitors_count + 1, updated_at = $2 WHERE id = $1"
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Increment the registered-attendees counter
    pub async fn increment_attendees_count(&self, id: i64) -> Result<bool, ExpoHubError> {
        let result = sqlx::query(
            "UPDATE expos SET attendees_count = attendees_count + 1, updated_at = $2 WHERE id = $1"
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Rebuild all three counters from full scans of the entity tables.
    /// Recovery primitive for drift after a partial failure.
    pub async fn recompute_counters(&self, id: i64) -> Result<Option<Expo>, ExpoHubError> {
        let expo = sqlx::query_as::<_, Expo>(
            r#"
            UPDATE expos
            SET booked_booths = (SELECT COUNT(*) FROM booths WHERE expo_id = $1 AND status = 'booked'),
                exhibitors_count = (SELECT COUNT(*) FROM exhibitors WHERE expo_id = $1 AND application_status = 'approved'),
                attendees_count = (SELECT COUNT(*) FROM attendees WHERE expo_id = $1),
                updated_at = $2
            WHERE id = $1
            RETURNING id, title, description, organizer_id, status, registration_deadline, total_booths, booked_booths, exhibitors_count, attendees_count, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(expo)
    }

    /// Count booths for an expo, optionally filtered by status
    pub async fn count_booths(&self, expo_id: i64, status: Option<&str>) -> Result<i64, ExpoHubError> {
        let count: (i64,) = match status {
            Some(status) => {
                sqlx::query_as("SELECT COUNT(*) FROM booths WHERE expo_id = $1 AND status = $2")
                    .bind(expo_id)
                    .bind(status)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM booths WHERE expo_id = $1")
                    .bind(expo_id)
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(count.0)
    }

    /// Count exhibitor applications, optionally filtered by status
    pub async fn count_exhibitors(&self, expo_id: i64, status: Option<&str>) -> Result<i64, ExpoHubError> {
        let count: (i64,) = match status {
            Some(status) => {
                sqlx::query_as("SELECT COUNT(*) FROM exhibitors WHERE expo_id = $1 AND application_status = $2")
                    .bind(expo_id)
                    .bind(status)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM exhibitors WHERE expo_id = $1")
                    .bind(expo_id)
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(count.0)
    }

    /// Count attendee registrations, optionally only checked-in ones
    pub async fn count_attendees(&self, expo_id: i64, checked_in_only: bool) -> Result<i64, ExpoHubError> {
        let count: (i64,) = if checked_in_only {
            sqlx::query_as("SELECT COUNT(*) FROM attendees WHERE expo_id = $1 AND checked_in = true")
                .bind(expo_id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_as("SELECT COUNT(*) FROM attendees WHERE expo_id = $1")
                .bind(expo_id)
                .fetch_one(&self.pool)
                .await?
        };

        Ok(count.0)
    }

    /// Total session registrations across all of the expo's sessions
    pub async fn count_session_registrations(&self, expo_id: i64) -> Result<i64, ExpoHubError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM session_attendees sa
            INNER JOIN sessions s ON s.id = sa.session_id
            WHERE s.expo_id = $1
            "#,
        )
        .bind(expo_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Count sessions scheduled for an expo
    pub async fn count_sessions(&self, expo_id: i64) -> Result<i64, ExpoHubError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE expo_id = $1")
            .bind(expo_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
