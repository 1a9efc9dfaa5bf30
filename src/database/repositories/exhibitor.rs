//! Exhibitor application repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::exhibitor::{ApplyExhibitorRequest, Exhibitor};
use crate::utils::errors::ExpoHubError;

const EXHIBITOR_COLUMNS: &str = "id, expo_id, user_id, company_name, company_description, \
     application_status, application_date, reviewed_by, reviewed_at, review_notes, \
     assigned_booth_id, created_at, updated_at";

/// Review outcome with the status the application held before the review,
/// captured in the same statement so the counter crossing is decided exactly
/// once.
#[derive(Debug, Clone)]
pub struct ReviewedApplication {
    pub exhibitor: Exhibitor,
    pub prior_status: String,
}

#[derive(Debug, Clone)]
pub struct ExhibitorRepository {
    pool: PgPool,
}

impl ExhibitorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new application
    pub async fn create(&self, request: ApplyExhibitorRequest) -> Result<Exhibitor, ExpoHubError> {
        let exhibitor = sqlx::query_as::<_, Exhibitor>(
            r#"
            INSERT INTO exhibitors (expo_id, user_id, company_name, company_description, application_status, application_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'pending', $5, $5, $5)
            RETURNING id, expo_id, user_id, company_name, company_description, application_status, application_date, reviewed_by, reviewed_at, review_notes, assigned_booth_id, created_at, updated_at
            "#,
        )
        .bind(request.expo_id)
        .bind(request.user_id)
        .bind(request.company_name)
        .bind(request.company_description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(exhibitor)
    }

    /// Find application by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Exhibitor>, ExpoHubError> {
        let exhibitor = sqlx::query_as::<_, Exhibitor>(&format!(
            "SELECT {EXHIBITOR_COLUMNS} FROM exhibitors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exhibitor)
    }

    /// Find the application a user holds for an expo
    pub async fn find_by_user_and_expo(
        &self,
        user_id: i64,
        expo_id: i64,
    ) -> Result<Option<Exhibitor>, ExpoHubError> {
        let exhibitor = sqlx::query_as::<_, Exhibitor>(&format!(
            "SELECT {EXHIBITOR_COLUMNS} FROM exhibitors WHERE user_id = $1 AND expo_id = $2"
        ))
        .bind(user_id)
        .bind(expo_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exhibitor)
    }

    /// List applications for an expo, optionally filtered by status
    pub async fn list_by_expo(
        &self,
        expo_id: i64,
        status: Option<&str>,
    ) -> Result<Vec<Exhibitor>, ExpoHubError> {
        let exhibitors = match status {
            Some(status) => {
                sqlx::query_as::<_, Exhibitor>(&format!(
                    "SELECT {EXHIBITOR_COLUMNS} FROM exhibitors WHERE expo_id = $1 AND application_status = $2 ORDER BY application_date DESC"
                ))
                .bind(expo_id)
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Exhibitor>(&format!(
                    "SELECT {EXHIBITOR_COLUMNS} FROM exhibitors WHERE expo_id = $1 ORDER BY application_date DESC"
                ))
                .bind(expo_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(exhibitors)
    }

    /// List a user's applications across expos
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Exhibitor>, ExpoHubError> {
        let exhibitors = sqlx::query_as::<_, Exhibitor>(&format!(
            "SELECT {EXHIBITOR_COLUMNS} FROM exhibitors WHERE user_id = $1 ORDER BY application_date DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(exhibitors)
    }

    /// Record a review decision, atomically capturing the prior status
    pub async fn review(
        &self,
        id: i64,
        status: &str,
        reviewed_by: i64,
        review_notes: Option<String>,
    ) -> Result<Option<ReviewedApplication>, ExpoHubError> {
        let row = sqlx::query_as::<_, ReviewedRow>(
            r#"
            UPDATE exhibitors e
            SET application_status = $2, reviewed_by = $3, reviewed_at = $5,
                review_notes = $4, updated_at = $5
            FROM (SELECT id, application_status AS prior_status
                  FROM exhibitors WHERE id = $1 FOR UPDATE) prior
            WHERE e.id = prior.id
            RETURNING e.id, e.expo_id, e.user_id, e.company_name, e.company_description,
                      e.application_status, e.application_date, e.reviewed_by, e.reviewed_at,
                      e.review_notes, e.assigned_booth_id, e.created_at, e.updated_at,
                      prior.prior_status
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reviewed_by)
        .bind(review_notes)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| ReviewedApplication {
            exhibitor: Exhibitor {
                id: r.id,
                expo_id: r.expo_id,
                user_id: r.user_id,
                company_name: r.company_name,
                company_description: r.company_description,
                application_status: r.application_status,
                application_date: r.application_date,
                reviewed_by: r.reviewed_by,
                reviewed_at: r.reviewed_at,
                review_notes: r.review_notes,
                assigned_booth_id: r.assigned_booth_id,
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
            prior_status: r.prior_status,
        }))
    }

    /// Point the application at its booked booth
    pub async fn set_assigned_booth(
        &self,
        id: i64,
        booth_id: Option<i64>,
    ) -> Result<bool, ExpoHubError> {
        let result = sqlx::query(
            "UPDATE exhibitors SET assigned_booth_id = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(booth_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clear the booth back-reference if it points at the given booth
    pub async fn clear_assigned_booth(&self, booth_id: i64) -> Result<bool, ExpoHubError> {
        let result = sqlx::query(
            "UPDATE exhibitors SET assigned_booth_id = NULL, updated_at = $2 WHERE assigned_booth_id = $1",
        )
        .bind(booth_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct ReviewedRow {
    id: i64,
    expo_id: i64,
    user_id: i64,
    company_name: String,
    company_description: Option<String>,
    application_status: String,
    application_date: chrono::DateTime<Utc>,
    reviewed_by: Option<i64>,
    reviewed_at: Option<chrono::DateTime<Utc>>,
    review_notes: Option<String>,
    assigned_booth_id: Option<i64>,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
    prior_status: String,
}
