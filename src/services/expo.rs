//! Expo lifecycle service
//!
//! Expos move draft -> published -> ongoing -> completed, with cancellation
//! from any non-terminal state. The transition guard runs in the model and
//! again in the conditional update, so a concurrent transition loses cleanly
//! as a `Conflict`.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::models::actor::Actor;
use crate::models::booth::BoothStatus;
use crate::models::exhibitor::ApplicationStatus;
use crate::models::expo::{CreateExpoRequest, Expo, ExpoStatus, UpdateExpoRequest};
use crate::services::auth::AccessPolicy;
use crate::utils::errors::{ExpoHubError, Result};
use crate::utils::logging::{log_admin_action, log_reconciliation};

/// Organizer analytics snapshot for one expo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpoAnalytics {
    pub total_booths: i64,
    pub booked_booths: i64,
    pub available_booths: i64,
    pub pending_applications: i64,
    pub approved_exhibitors: i64,
    pub registered_attendees: i64,
    pub checked_in_attendees: i64,
    pub total_sessions: i64,
    pub session_registrations: i64,
}

#[derive(Debug, Clone)]
pub struct ExpoService {
    db: DatabaseService,
    settings: Settings,
    policy: AccessPolicy,
}

impl ExpoService {
    pub fn new(db: DatabaseService, settings: Settings) -> Self {
        Self {
            db,
            settings,
            policy: AccessPolicy::new(),
        }
    }

    /// Create a new expo in `draft`
    #[instrument(skip(self, request))]
    pub async fn create(&self, actor: &Actor, request: CreateExpoRequest) -> Result<Expo> {
        if request.organizer_id != actor.user_id && !actor.is_admin() {
            return Err(ExpoHubError::AccessDenied(format!(
                "user {} may not create an expo for organizer {}",
                actor.user_id, request.organizer_id
            )));
        }
        if request.title.trim().is_empty() {
            return Err(ExpoHubError::Validation("title must not be empty".to_string()));
        }
        if request.total_booths < 0 {
            return Err(ExpoHubError::Validation(
                "total_booths must not be negative".to_string(),
            ));
        }

        let expo = self.db.expos.create(request).await?;
        info!(expo_id = expo.id, organizer_id = expo.organizer_id, "Expo created");
        Ok(expo)
    }

    /// Get expo by ID
    pub async fn get(&self, id: i64) -> Result<Expo> {
        self.db
            .expos
            .find_by_id(id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", id))
    }

    /// List expos with pagination
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Expo>> {
        self.db.expos.list(limit, offset).await
    }

    /// List expos owned by an organizer
    pub async fn list_by_organizer(&self, organizer_id: i64) -> Result<Vec<Expo>> {
        self.db.expos.list_by_organizer(organizer_id).await
    }

    /// Update expo metadata. The booth total may not be lowered below the
    /// number already booked.
    #[instrument(skip(self, request))]
    pub async fn update(&self, actor: &Actor, id: i64, request: UpdateExpoRequest) -> Result<Expo> {
        let expo = self.get(id).await?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        if let Some(total) = request.total_booths {
            if total < expo.booked_booths {
                return Err(ExpoHubError::Validation(format!(
                    "total_booths cannot be lowered below the {} booked booths",
                    expo.booked_booths
                )));
            }
        }

        self.db
            .expos
            .update(id, request)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", id))
    }

    /// Move the expo to a new lifecycle status
    #[instrument(skip(self))]
    pub async fn set_status(&self, actor: &Actor, id: i64, to: ExpoStatus) -> Result<Expo> {
        let expo = self.get(id).await?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        let from = expo
            .status_enum()
            .ok_or_else(|| ExpoHubError::Conflict(format!("expo {id} has unknown status")))?;
        if !from.can_transition_to(to) {
            return Err(ExpoHubError::Conflict(format!(
                "expo {id} cannot move from {} to {}",
                from.as_str(),
                to.as_str()
            )));
        }

        // Conditional on the status just read; a concurrent transition loses
        let updated = self
            .db
            .expos
            .set_status(id, from.as_str(), to.as_str())
            .await?
            .ok_or_else(|| {
                ExpoHubError::Conflict(format!("expo {id} status changed concurrently"))
            })?;
        log_admin_action(
            actor.user_id,
            "expo_status_change",
            Some(&format!("expo {id}: {} -> {}", from.as_str(), to.as_str())),
        );
        Ok(updated)
    }

    /// Delete an expo and its child rows; refused while any booth is booked
    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &Actor, id: i64) -> Result<()> {
        let expo = self.get(id).await?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        let booked = self
            .db
            .expos
            .count_booths(id, Some(BoothStatus::Booked.as_str()))
            .await?;
        if booked > 0 {
            return Err(ExpoHubError::Conflict(format!(
                "expo {id} has {booked} booked booths and cannot be deleted"
            )));
        }

        if !self.db.expos.delete(id).await? {
            return Err(ExpoHubError::not_found("Expo", id));
        }
        log_admin_action(actor.user_id, "expo_delete", Some(&format!("expo {id}")));
        Ok(())
    }

    /// Rebuild the expo's three cached counters from full entity scans.
    /// Recovery primitive after a reported partial failure.
    #[instrument(skip(self))]
    pub async fn recompute_counters(&self, actor: &Actor, id: i64) -> Result<Expo> {
        let expo = self.get(id).await?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        let rebuilt = self
            .db
            .expos
            .recompute_counters(id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", id))?;
        log_reconciliation(
            id,
            rebuilt.booked_booths,
            rebuilt.exhibitors_count,
            rebuilt.attendees_count,
        );
        Ok(rebuilt)
    }

    /// Organizer analytics computed from the entity rows, not the cached
    /// counters
    pub async fn analytics(&self, actor: &Actor, id: i64) -> Result<ExpoAnalytics> {
        if !self.settings.features.analytics {
            return Err(ExpoHubError::Config(
                "analytics are disabled by configuration".to_string(),
            ));
        }

        let expo = self.get(id).await?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        let total_booths = self.db.expos.count_booths(id, None).await?;
        let booked_booths = self
            .db
            .expos
            .count_booths(id, Some(BoothStatus::Booked.as_str()))
            .await?;
        let pending_applications = self
            .db
            .expos
            .count_exhibitors(id, Some(ApplicationStatus::Pending.as_str()))
            .await?;
        let approved_exhibitors = self
            .db
            .expos
            .count_exhibitors(id, Some(ApplicationStatus::Approved.as_str()))
            .await?;
        let registered_attendees = self.db.expos.count_attendees(id, false).await?;
        let checked_in_attendees = self.db.expos.count_attendees(id, true).await?;
        let total_sessions = self.db.expos.count_sessions(id).await?;
        let session_registrations = self.db.expos.count_session_registrations(id).await?;

        Ok(ExpoAnalytics {
            total_booths,
            booked_booths,
            available_booths: total_booths - booked_booths,
            pending_applications,
            approved_exhibitors,
            registered_attendees,
            checked_in_attendees,
            total_sessions,
            session_registrations,
        })
    }
}
