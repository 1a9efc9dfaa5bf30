//! Exhibitor application service
//!
//! Applications are unique per (user, expo) and move through
//! pending/approved/rejected/waitlisted under organizer review. The
//! approved-exhibitors counter on the expo is advanced only on the first
//! crossing into `approved`; the prior status is captured atomically by the
//! repository so a re-reviewed application cannot double-count.

use tracing::{info, instrument};

use crate::database::repositories::is_unique_violation;
use crate::database::DatabaseService;
use crate::models::actor::Actor;
use crate::models::exhibitor::{
    ApplicationStatus, ApplyExhibitorRequest, Exhibitor, ReviewApplicationRequest,
};
use crate::services::auth::AccessPolicy;
use crate::services::booth::BoothService;
use crate::utils::errors::{ExpoHubError, Result};
use crate::utils::logging::{log_admin_action, log_counter_change, log_partial_failure};
use chrono::Utc;

#[derive(Debug, Clone)]
pub struct ExhibitorService {
    db: DatabaseService,
    booths: BoothService,
    policy: AccessPolicy,
}

impl ExhibitorService {
    pub fn new(db: DatabaseService, booths: BoothService) -> Self {
        Self {
            db,
            booths,
            policy: AccessPolicy::new(),
        }
    }

    /// Submit an application to exhibit at an expo. One application per
    /// (user, expo); refused once the registration window closed.
    #[instrument(skip(self, request))]
    pub async fn apply(&self, actor: &Actor, request: ApplyExhibitorRequest) -> Result<Exhibitor> {
        if request.user_id != actor.user_id && !actor.is_admin() {
            return Err(ExpoHubError::AccessDenied(format!(
                "user {} may not apply on behalf of user {}",
                actor.user_id, request.user_id
            )));
        }
        if request.company_name.trim().is_empty() {
            return Err(ExpoHubError::Validation(
                "company_name must not be empty".to_string(),
            ));
        }

        let expo = self
            .db
            .expos
            .find_by_id(request.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", request.expo_id))?;
        if !expo.is_registration_open(Utc::now()) {
            return Err(ExpoHubError::Validation(format!(
                "registration for expo {} is closed",
                expo.id
            )));
        }

        if self
            .db
            .exhibitors
            .find_by_user_and_expo(request.user_id, request.expo_id)
            .await?
            .is_some()
        {
            return Err(ExpoHubError::Duplicate(format!(
                "user {} already applied to expo {}",
                request.user_id, request.expo_id
            )));
        }

        match self.db.exhibitors.create(request).await {
            Ok(exhibitor) => Ok(exhibitor),
            Err(err) if is_unique_violation(&err) => Err(ExpoHubError::Duplicate(
                "application already exists for this expo".to_string(),
            )),
            Err(err) => Err(err),
        }
    }

    /// Get application by ID
    pub async fn get(&self, id: i64) -> Result<Exhibitor> {
        self.db
            .exhibitors
            .find_by_id(id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Exhibitor", id))
    }

    /// List an expo's applications, optionally filtered by status
    pub async fn list(
        &self,
        actor: &Actor,
        expo_id: i64,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Exhibitor>> {
        let expo = self
            .db
            .expos
            .find_by_id(expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        self.db
            .exhibitors
            .list_by_expo(expo_id, status.map(|s| s.as_str()))
            .await
    }

    /// The acting user's applications across expos
    pub async fn my_applications(&self, actor: &Actor) -> Result<Vec<Exhibitor>> {
        self.db.exhibitors.list_by_user(actor.user_id).await
    }

    /// Review an application.
    ///
    /// The expo's approved-exhibitors counter advances only when the review
    /// crosses into `approved` from any other state. The counter is a
    /// high-water mark: it is never decremented on rejection of a previously
    /// approved application (the reconciliation primitive rebuilds it).
    #[instrument(skip(self, request))]
    pub async fn review(
        &self,
        actor: &Actor,
        id: i64,
        request: ReviewApplicationRequest,
    ) -> Result<Exhibitor> {
        let exhibitor = self.get(id).await?;
        let expo = self
            .db
            .expos
            .find_by_id(exhibitor.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", exhibitor.expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        let reviewed = self
            .db
            .exhibitors
            .review(
                id,
                request.status.as_str(),
                actor.user_id,
                request.review_notes,
            )
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Exhibitor", id))?;
        log_admin_action(
            actor.user_id,
            "review_application",
            Some(&format!("exhibitor {id} -> {}", request.status.as_str())),
        );

        let crossed_into_approved = request.status == ApplicationStatus::Approved
            && reviewed.prior_status != ApplicationStatus::Approved.as_str();
        if crossed_into_approved {
            if let Err(source) = self.db.expos.increment_exhibitors_count(expo.id).await {
                log_partial_failure(
                    "Exhibitor",
                    id,
                    "application approved",
                    "exhibitors counter",
                );
                return Err(ExpoHubError::PartialFailure {
                    entity: "Exhibitor",
                    id,
                    committed: "application approved".to_string(),
                    source: Box::new(source),
                });
            }
            log_counter_change(expo.id, "exhibitors_count", 1);
        }

        Ok(reviewed.exhibitor)
    }

    /// Assign (or move) an approved exhibitor to a booth.
    ///
    /// Runs through the booth state machine: the target booth is booked
    /// first and the previously held booth is released only once the booking
    /// succeeded, so a lost race on the target leaves the current assignment
    /// untouched.
    #[instrument(skip(self))]
    pub async fn assign_booth(&self, actor: &Actor, id: i64, booth_id: i64) -> Result<Exhibitor> {
        let exhibitor = self.get(id).await?;
        let expo = self
            .db
            .expos
            .find_by_id(exhibitor.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", exhibitor.expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        if !exhibitor.is_approved() {
            return Err(ExpoHubError::Validation(format!(
                "exhibitor application {id} is not approved"
            )));
        }

        if exhibitor.assigned_booth_id == Some(booth_id) {
            return Ok(exhibitor);
        }

        self.booths.book(actor, booth_id, id, None).await?;
        if let Some(previous) = exhibitor.assigned_booth_id {
            // Booking already repointed the back-reference at the new booth;
            // the release settles the old booth and the ledger
            self.booths.release(actor, previous).await?;
        }
        info!(
            exhibitor_id = id,
            booth_id = booth_id,
            actor_id = actor.user_id,
            "Booth assigned to exhibitor"
        );

        self.get(id).await
    }
}
