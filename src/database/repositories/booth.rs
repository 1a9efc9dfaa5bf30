//! Booth repository implementation
//!
//! State transitions are single conditional statements: the status guard and
//! the mutation are applied atomically on the booth row, so of two racing
//! requests exactly one sees an affected row and the other observes `None`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::booth::{Booth, CreateBoothRequest, UpdateBoothRequest};
use crate::utils::errors::ExpoHubError;

const BOOTH_COLUMNS: &str =
    "id, expo_id, booth_number, status, exhibitor_id, reserved_until, booth_details, created_at, updated_at";

/// Row state captured atomically by a release
#[derive(Debug, Clone)]
pub struct ReleasedBooth {
    pub booth: Booth,
    pub prior_status: String,
    pub prior_exhibitor_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct BoothRepository {
    pool: PgPool,
}

impl BoothRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new booth
    pub async fn create(&self, request: CreateBoothRequest) -> Result<Booth, ExpoHubError> {
        let booth = sqlx::query_as::<_, Booth>(
            r#"
            INSERT INTO booths (expo_id, booth_number, status, booth_details, created_at, updated_at)
            VALUES ($1, $2, 'available', $3, $4, $4)
            RETURNING id, expo_id, booth_number, status, exhibitor_id, reserved_until, booth_details, created_at, updated_at
            "#,
        )
        .bind(request.expo_id)
        .bind(request.booth_number)
        .bind(request.booth_details)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(booth)
    }

    /// Create several booths in one statement
    pub async fn create_many(&self, requests: Vec<CreateBoothRequest>) -> Result<Vec<Booth>, ExpoHubError> {
        let mut booths = Vec::with_capacity(requests.len());
        let mut tx = self.pool.begin().await?;

        for request in requests {
            let booth = sqlx::query_as::<_, Booth>(
                r#"
                INSERT INTO booths (expo_id, booth_number, status, booth_details, created_at, updated_at)
                VALUES ($1, $2, 'available', $3, $4, $4)
                RETURNING id, expo_id, booth_number, status, exhibitor_id, reserved_until, booth_details, created_at, updated_at
                "#,
            )
            .bind(request.expo_id)
            .bind(request.booth_number)
            .bind(request.booth_details)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

            booths.push(booth);
        }

        tx.commit().await?;
        Ok(booths)
    }

    /// Find booth by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Booth>, ExpoHubError> {
        let booth = sqlx::query_as::<_, Booth>(&format!(
            "SELECT {BOOTH_COLUMNS} FROM booths WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booth)
    }

    /// List booths for an expo, optionally filtered by status
    pub async fn list_by_expo(&self, expo_id: i64, status: Option<&str>) -> Result<Vec<Booth>, ExpoHubError> {
        let booths = match status {
            Some(status) => {
                sqlx::query_as::<_, Booth>(&format!(
                    "SELECT {BOOTH_COLUMNS} FROM booths WHERE expo_id = $1 AND status = $2 ORDER BY booth_number ASC"
                ))
                .bind(expo_id)
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Booth>(&format!(
                    "SELECT {BOOTH_COLUMNS} FROM booths WHERE expo_id = $1 ORDER BY booth_number ASC"
                ))
                .bind(expo_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(booths)
    }

    /// Update booth with allow-listed fields
    pub async fn update(&self, id: i64, request: UpdateBoothRequest) -> Result<Option<Booth>, ExpoHubError> {
        let booth = sqlx::query_as::<_, Booth>(
            r#"
            UPDATE booths
            SET booth_number = COALESCE($2, booth_number),
                booth_details = COALESCE($3, booth_details),
                updated_at = $4
            WHERE id = $1
            RETURNING id, expo_id, booth_number, status, exhibitor_id, reserved_until, booth_details, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(request.booth_number)
        .bind(request.booth_details)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(booth)
    }

    /// Place a reservation hold. Allowed from `available` or a lapsed
    /// `reserved`; an unexpired hold blocks the transition and yields `None`.
    pub async fn reserve(
        &self,
        id: i64,
        reserved_until: DateTime<Utc>,
    ) -> Result<Option<Booth>, ExpoHubError> {
        let now = Utc::now();
        let booth = sqlx::query_as::<_, Booth>(
            r#"
            UPDATE booths
            SET status = 'reserved', reserved_until = $2, updated_at = $3
            WHERE id = $1
              AND (status = 'available'
                   OR (status = 'reserved' AND (reserved_until IS NULL OR reserved_until <= $3)))
            RETURNING id, expo_id, booth_number, status, exhibitor_id, reserved_until, booth_details, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(reserved_until)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booth)
    }

    /// Book the booth for an exhibitor. Allowed from `available` or
    /// `reserved` (stale holds are overridden); yields `None` when another
    /// transition won the race.
    pub async fn book(
        &self,
        id: i64,
        exhibitor_id: i64,
        booth_details: Option<serde_json::Value>,
    ) -> Result<Option<Booth>, ExpoHubError> {
        let booth = sqlx::query_as::<_, Booth>(
            r#"
            UPDATE booths
            SET status = 'booked', exhibitor_id = $2, booth_details = COALESCE($3, booth_details),
                reserved_until = NULL, updated_at = $4
            WHERE id = $1 AND status IN ('available', 'reserved')
            RETURNING id, expo_id, booth_number, status, exhibitor_id, reserved_until, booth_details, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(exhibitor_id)
        .bind(booth_details)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(booth)
    }

    /// Reset the booth to `available`, atomically capturing the prior status
    /// and exhibitor so the caller can settle the ledger exactly once.
    pub async fn release(&self, id: i64) -> Result<Option<ReleasedBooth>, ExpoHubError> {
        let row = sqlx::query_as::<_, ReleasedRow>(
            r#"
            UPDATE booths b
            SET status = 'available', exhibitor_id = NULL, reserved_until = NULL,
                booth_details = NULL, updated_at = $2
            FROM (SELECT id, status AS prior_status, exhibitor_id AS prior_exhibitor_id
                  FROM booths WHERE id = $1 FOR UPDATE) prior
            WHERE b.id = prior.id
            RETURNING b.id, b.expo_id, b.booth_number, b.status, b.exhibitor_id, b.reserved_until,
                      b.booth_details, b.created_at, b.updated_at,
                      prior.prior_status, prior.prior_exhibitor_id
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| ReleasedBooth {
            booth: Booth {
                id: r.id,
                expo_id: r.expo_id,
                booth_number: r.booth_number,
                status: r.status,
                exhibitor_id: r.exhibitor_id,
                reserved_until: r.reserved_until,
                booth_details: r.booth_details,
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
            prior_status: r.prior_status,
            prior_exhibitor_id: r.prior_exhibitor_id,
        }))
    }

    /// Delete the booth unless it is booked. Returns whether a row was
    /// deleted; the caller distinguishes "missing" from "booked".
    pub async fn delete_unless_booked(&self, id: i64) -> Result<bool, ExpoHubError> {
        let result = sqlx::query("DELETE FROM booths WHERE id = $1 AND status <> 'booked'")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct ReleasedRow {
    id: i64,
    expo_id: i64,
    booth_number: String,
    status: String,
    exhibitor_id: Option<i64>,
    reserved_until: Option<chrono::DateTime<Utc>>,
    booth_details: Option<serde_json::Value>,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
    prior_status: String,
    prior_exhibitor_id: Option<i64>,
}
