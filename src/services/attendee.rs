//! Attendee registration service
//!
//! Expo-level registration (distinct from per-session registration). The
//! expo's attendees counter advances with each registration and, like the
//! exhibitors counter, is never decremented; the reconciliation primitive
//! rebuilds it from the rows.

use chrono::Utc;
use tracing::{info, instrument};

use crate::database::repositories::is_unique_violation;
use crate::database::DatabaseService;
use crate::models::actor::Actor;
use crate::models::attendee::{Attendee, RegisterAttendeeRequest, TicketType};
use crate::services::auth::AccessPolicy;
use crate::utils::errors::{ExpoHubError, Result};
use crate::utils::logging::{log_counter_change, log_partial_failure};

#[derive(Debug, Clone)]
pub struct AttendeeService {
    db: DatabaseService,
    policy: AccessPolicy,
}

impl AttendeeService {
    pub fn new(db: DatabaseService) -> Self {
        Self {
            db,
            policy: AccessPolicy::new(),
        }
    }

    /// Register a user for an expo. One registration per (user, expo);
    /// refused once the registration window closed.
    #[instrument(skip(self, request))]
    pub async fn register(&self, actor: &Actor, request: RegisterAttendeeRequest) -> Result<Attendee> {
        if request.user_id != actor.user_id && !actor.is_admin() {
            return Err(ExpoHubError::AccessDenied(format!(
                "user {} may not register user {}",
                actor.user_id, request.user_id
            )));
        }
        if let Some(ticket) = &request.ticket_type {
            if TicketType::parse(ticket).is_none() {
                return Err(ExpoHubError::Validation(format!(
                    "unknown ticket type: {ticket}"
                )));
            }
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
            .attendees
            .find_by_user_and_expo(request.user_id, request.expo_id)
            .await?
            .is_some()
        {
            return Err(ExpoHubError::Duplicate(format!(
                "user {} is already registered for expo {}",
                request.user_id, request.expo_id
            )));
        }

        let expo_id = request.expo_id;
        let attendee = match self.db.attendees.create(request).await {
            Ok(attendee) => attendee,
            Err(err) if is_unique_violation(&err) => {
                return Err(ExpoHubError::Duplicate(
                    "registration already exists for this expo".to_string(),
                ));
            }
            Err(err) => return Err(err),
        };

        // Counter follows the commit point
        if let Err(source) = self.db.expos.increment_attendees_count(expo_id).await {
            log_partial_failure(
                "Attendee",
                attendee.id,
                "registration row written",
                "attendees counter",
            );
            return Err(ExpoHubError::PartialFailure {
                entity: "Attendee",
                id: attendee.id,
                committed: "registration row written".to_string(),
                source: Box::new(source),
            });
        }
        log_counter_change(expo_id, "attendees_count", 1);

        info!(
            expo_id = expo_id,
            user_id = attendee.user_id,
            "Attendee registered for expo"
        );
        Ok(attendee)
    }

    /// Get registration by ID
    pub async fn get(&self, id: i64) -> Result<Attendee> {
        self.db
            .attendees
            .find_by_id(id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Attendee", id))
    }

    /// List an expo's registrations (organizer view)
    pub async fn list(
        &self,
        actor: &Actor,
        expo_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Attendee>> {
        let expo = self
            .db
            .expos
            .find_by_id(expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        self.db.attendees.list_by_expo(expo_id, limit, offset).await
    }

    /// Check an attendee in at the door. One check-in per registration;
    /// repeats read as `Duplicate`.
    #[instrument(skip(self))]
    pub async fn check_in(&self, actor: &Actor, id: i64) -> Result<Attendee> {
        let attendee = self.get(id).await?;
        let expo = self
            .db
            .expos
            .find_by_id(attendee.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", attendee.expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        match self.db.attendees.check_in(id).await? {
            Some(checked_in) => {
                info!(
                    attendee_id = id,
                    expo_id = checked_in.expo_id,
                    actor_id = actor.user_id,
                    "Attendee checked in"
                );
                Ok(checked_in)
            }
            None => Err(ExpoHubError::Duplicate(format!(
                "attendee {id} is already checked in"
            ))),
        }
    }
}
