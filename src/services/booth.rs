//! Booth lifecycle service
//!
//! Orchestrates the booth state machine against the expo-level booked-booths
//! ledger. The state transition itself is a conditional single-statement
//! update in the repository; this layer sequences the cross-entity writes
//! (ledger increment, exhibitor back-reference) and converts a failed second
//! write into a `PartialFailure` carrying what already committed.

use chrono::{Duration, Utc};
use tracing::{info, instrument, warn};

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::models::actor::Actor;
use crate::models::booth::{Booth, BoothStatus, CreateBoothRequest, UpdateBoothRequest};
use crate::services::auth::AccessPolicy;
use crate::utils::errors::{ExpoHubError, Result};
use crate::utils::logging::{log_booth_transition, log_counter_change, log_partial_failure};

#[derive(Debug, Clone)]
pub struct BoothService {
    db: DatabaseService,
    settings: Settings,
    policy: AccessPolicy,
}

impl BoothService {
    pub fn new(db: DatabaseService, settings: Settings) -> Self {
        Self {
            db,
            settings,
            policy: AccessPolicy::new(),
        }
    }

    /// Add a booth to an expo
    #[instrument(skip(self, request))]
    pub async fn create(&self, actor: &Actor, request: CreateBoothRequest) -> Result<Booth> {
        let expo = self
            .db
            .expos
            .find_by_id(request.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", request.expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        if request.booth_number.trim().is_empty() {
            return Err(ExpoHubError::Validation(
                "booth_number must not be empty".to_string(),
            ));
        }

        self.db.booths.create(request).await
    }

    /// Add several booths at once (floor-plan import)
    #[instrument(skip(self, requests))]
    pub async fn create_many(
        &self,
        actor: &Actor,
        expo_id: i64,
        requests: Vec<CreateBoothRequest>,
    ) -> Result<Vec<Booth>> {
        let expo = self
            .db
            .expos
            .find_by_id(expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        for request in &requests {
            if request.expo_id != expo_id {
                return Err(ExpoHubError::Validation(
                    "all booths must belong to the same expo".to_string(),
                ));
            }
            if request.booth_number.trim().is_empty() {
                return Err(ExpoHubError::Validation(
                    "booth_number must not be empty".to_string(),
                ));
            }
        }

        self.db.booths.create_many(requests).await
    }

    /// Get booth by ID
    pub async fn get(&self, id: i64) -> Result<Booth> {
        self.db
            .booths
            .find_by_id(id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Booth", id))
    }

    /// List booths for an expo, optionally filtered by status
    pub async fn list(&self, expo_id: i64, status: Option<&str>) -> Result<Vec<Booth>> {
        if let Some(status) = status {
            if BoothStatus::parse(status).is_none() {
                return Err(ExpoHubError::Validation(format!(
                    "unknown booth status: {status}"
                )));
            }
        }
        self.db.booths.list_by_expo(expo_id, status).await
    }

    /// Update booth metadata (number, details); status never moves here
    #[instrument(skip(self, request))]
    pub async fn update(&self, actor: &Actor, id: i64, request: UpdateBoothRequest) -> Result<Booth> {
        let booth = self.get(id).await?;
        let expo = self
            .db
            .expos
            .find_by_id(booth.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", booth.expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        self.db
            .booths
            .update(id, request)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Booth", id))
    }

    /// Place a reservation hold on a booth.
    ///
    /// The hold duration defaults from configuration and is capped at the
    /// configured maximum. A live hold held by anyone blocks the transition;
    /// a lapsed hold is overridden in the same statement.
    #[instrument(skip(self))]
    pub async fn reserve(
        &self,
        actor: &Actor,
        id: i64,
        duration_minutes: Option<i64>,
    ) -> Result<Booth> {
        let minutes = duration_minutes
            .unwrap_or(self.settings.booking.default_reservation_minutes);
        if minutes <= 0 || minutes > self.settings.booking.max_reservation_minutes {
            return Err(ExpoHubError::Validation(format!(
                "reservation duration must be between 1 and {} minutes",
                self.settings.booking.max_reservation_minutes
            )));
        }

        // Existence first so a missing booth is 404, not 409
        let booth = self.get(id).await?;
        let reserved_until = Utc::now() + Duration::minutes(minutes);

        match self.db.booths.reserve(id, reserved_until).await? {
            Some(reserved) => {
                log_booth_transition(id, &booth.status, "reserved", actor.user_id);
                Ok(reserved)
            }
            None => Err(ExpoHubError::Conflict(format!(
                "booth {id} is not available for reservation"
            ))),
        }
    }

    /// Book a booth for an approved exhibitor.
    ///
    /// Sequence: validate the application, flip the booth row, then settle
    /// the expo ledger and the exhibitor back-reference. The booth flip is
    /// the commit point; a failure after it surfaces as `PartialFailure`.
    #[instrument(skip(self, booth_details))]
    pub async fn book(
        &self,
        actor: &Actor,
        id: i64,
        exhibitor_id: i64,
        booth_details: Option<serde_json::Value>,
    ) -> Result<Booth> {
        let booth = self.get(id).await?;
        let exhibitor = self
            .db
            .exhibitors
            .find_by_id(exhibitor_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Exhibitor", exhibitor_id))?;
        let expo = self
            .db
            .expos
            .find_by_id(booth.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", booth.expo_id))?;
        self.policy
            .ensure_self_or_manager(actor, exhibitor.user_id, &expo)?;

        if exhibitor.expo_id != booth.expo_id {
            return Err(ExpoHubError::Validation(format!(
                "exhibitor {exhibitor_id} belongs to a different expo than booth {id}"
            )));
        }
        if !exhibitor.is_approved() {
            return Err(ExpoHubError::Validation(format!(
                "exhibitor application {exhibitor_id} is not approved"
            )));
        }

        let booked = self
            .db
            .booths
            .book(id, exhibitor_id, booth_details)
            .await?
            .ok_or_else(|| {
                ExpoHubError::Conflict(format!("booth {id} is not available for booking"))
            })?;
        log_booth_transition(id, &booth.status, "booked", actor.user_id);

        // Ledger and back-reference follow the commit point
        if let Err(source) = self.settle_booking(&booked, exhibitor_id).await {
            log_partial_failure("Booth", id, "booth row booked", "ledger/back-reference");
            return Err(ExpoHubError::PartialFailure {
                entity: "Booth",
                id,
                committed: "booth row booked".to_string(),
                source: Box::new(source),
            });
        }

        Ok(booked)
    }

    async fn settle_booking(&self, booth: &Booth, exhibitor_id: i64) -> Result<()> {
        if self.db.expos.increment_booked_booths(booth.expo_id).await? {
            log_counter_change(booth.expo_id, "booked_booths", 1);
        } else {
            // Guard refused: counter already at total_booths, drift upstream
            warn!(
                expo_id = booth.expo_id,
                booth_id = booth.id,
                "Booked-booths increment refused by ledger guard"
            );
        }
        self.db
            .exhibitors
            .set_assigned_booth(exhibitor_id, Some(booth.id))
            .await?;
        Ok(())
    }

    /// Release a booth back to `available`.
    ///
    /// Idempotent on an already-available booth. The repository captures the
    /// prior status atomically, so the ledger is decremented exactly once
    /// per booked-to-available crossing.
    #[instrument(skip(self))]
    pub async fn release(&self, actor: &Actor, id: i64) -> Result<Booth> {
        let booth = self.get(id).await?;
        let expo = self
            .db
            .expos
            .find_by_id(booth.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", booth.expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        let released = self
            .db
            .booths
            .release(id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Booth", id))?;
        log_booth_transition(id, &released.prior_status, "available", actor.user_id);

        if released.prior_status == BoothStatus::Booked.as_str() {
            if let Err(source) = self.settle_release(&released.booth, id).await {
                log_partial_failure("Booth", id, "booth row released", "ledger/back-reference");
                return Err(ExpoHubError::PartialFailure {
                    entity: "Booth",
                    id,
                    committed: "booth row released".to_string(),
                    source: Box::new(source),
                });
            }
        }

        Ok(released.booth)
    }

    async fn settle_release(&self, booth: &Booth, booth_id: i64) -> Result<()> {
        if self.db.expos.decrement_booked_booths(booth.expo_id).await? {
            log_counter_change(booth.expo_id, "booked_booths", -1);
        } else {
            warn!(
                expo_id = booth.expo_id,
                booth_id = booth_id,
                "Booked-booths decrement refused by ledger guard"
            );
        }
        self.db.exhibitors.clear_assigned_booth(booth_id).await?;
        Ok(())
    }

    /// Delete a booth; refused while it is booked
    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &Actor, id: i64) -> Result<()> {
        let booth = self.get(id).await?;
        let expo = self
            .db
            .expos
            .find_by_id(booth.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", booth.expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        if self.db.booths.delete_unless_booked(id).await? {
            info!(booth_id = id, actor_id = actor.user_id, "Booth deleted");
            return Ok(());
        }

        // The conditional delete affected no row: either the booth vanished
        // meanwhile or it is booked
        match self.db.booths.find_by_id(id).await? {
            Some(_) => Err(ExpoHubError::Conflict(format!(
                "booth {id} is booked and cannot be deleted"
            ))),
            None => Err(ExpoHubError::not_found("Booth", id)),
        }
    }
}
