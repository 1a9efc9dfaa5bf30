//! Expo feedback desk repository implementation

use chrono::Utc;
use sqlx::PgPool;

use crate::models::feedback::{Feedback, SubmitFeedbackRequest};
use crate::utils::errors::ExpoHubError;

const FEEDBACK_COLUMNS: &str = "id, expo_id, user_id, subject, message, rating, status, \
     response, responded_by, responded_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct FeedbackRepository {
    pool: PgPool,
}

impl FeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new feedback entry in the `open` state
    pub async fn create(&self, request: SubmitFeedbackRequest) -> Result<Feedback, ExpoHubError> {
        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedback (expo_id, user_id, subject, message, rating, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 'open', $6, $6)
            RETURNING id, expo_id, user_id, subject, message, rating, status, response, responded_by, responded_at, created_at, updated_at
            "#,
        )
        .bind(request.expo_id)
        .bind(request.user_id)
        .bind(request.subject)
        .bind(request.message)
        .bind(request.rating)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(feedback)
    }

    /// Find feedback by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Feedback>, ExpoHubError> {
        let feedback = sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(feedback)
    }

    /// List feedback for an expo, optionally filtered by status
    pub async fn list_by_expo(
        &self,
        expo_id: i64,
        status: Option<&str>,
    ) -> Result<Vec<Feedback>, ExpoHubError> {
        let feedback = match status {
            Some(status) => {
                sqlx::query_as::<_, Feedback>(&format!(
                    "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE expo_id = $1 AND status = $2 ORDER BY created_at DESC"
                ))
                .bind(expo_id)
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Feedback>(&format!(
                    "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE expo_id = $1 ORDER BY created_at DESC"
                ))
                .bind(expo_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(feedback)
    }

    /// List feedback a user has submitted
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Feedback>, ExpoHubError> {
        let feedback = sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(feedback)
    }

    /// Record an organizer response and move the entry to the given status
    pub async fn respond(
        &self,
        id: i64,
        response: String,
        responded_by: i64,
        status: &str,
    ) -> Result<Option<Feedback>, ExpoHubError> {
        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            UPDATE feedback
            SET response = $2, responded_by = $3, responded_at = $5, status = $4, updated_at = $5
            WHERE id = $1
            RETURNING id, expo_id, user_id, subject, message, rating, status, response, responded_by, responded_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(response)
        .bind(responded_by)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(feedback)
    }

    /// Move the entry to another workflow status without a response
    pub async fn set_status(&self, id: i64, status: &str) -> Result<Option<Feedback>, ExpoHubError> {
        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            UPDATE feedback
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, expo_id, user_id, subject, message, rating, status, response, responded_by, responded_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(feedback)
    }
}
