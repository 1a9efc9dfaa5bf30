//! Session registration engine
//!
//! Seats are claimed by a compare-and-swap on the session row before any
//! roster row exists, so the ceiling holds under concurrency without a
//! transaction spanning both tables. The roster is mirrored on the attendee
//! side (`session_registrations`); the two sides are written in sequence and
//! a failed second write surfaces as `PartialFailure` so the recompute
//! primitives can repair the drift.

use tracing::{info, instrument};

use crate::database::repositories::is_unique_violation;
use crate::database::DatabaseService;
use crate::models::actor::Actor;
use crate::models::attendee::Attendee;
use crate::models::session::{
    CreateSessionRequest, Session, SessionAnalytics, SessionAttendee, SessionFeedback,
    UpdateSessionRequest,
};
use crate::services::auth::AccessPolicy;
use crate::utils::errors::{ExpoHubError, Result};
use crate::utils::logging::log_partial_failure;

#[derive(Debug, Clone)]
pub struct SessionService {
    db: DatabaseService,
    policy: AccessPolicy,
}

impl SessionService {
    pub fn new(db: DatabaseService) -> Self {
        Self {
            db,
            policy: AccessPolicy::new(),
        }
    }

    /// Schedule a new session within an expo
    #[instrument(skip(self, request))]
    pub async fn create(&self, actor: &Actor, request: CreateSessionRequest) -> Result<Session> {
        let expo = self
            .db
            .expos
            .find_by_id(request.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", request.expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        if request.max_attendees <= 0 {
            return Err(ExpoHubError::Validation(
                "max_attendees must be positive".to_string(),
            ));
        }
        if request.ends_at <= request.starts_at {
            return Err(ExpoHubError::Validation(
                "session must end after it starts".to_string(),
            ));
        }

        self.db.sessions.create(request).await
    }

    /// Get session by ID
    pub async fn get(&self, id: i64) -> Result<Session> {
        self.db
            .sessions
            .find_by_id(id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Session", id))
    }

    /// List an expo's schedule
    pub async fn list(&self, expo_id: i64) -> Result<Vec<Session>> {
        self.db.sessions.list_by_expo(expo_id).await
    }

    /// Update session metadata. The seat ceiling may not be lowered below
    /// the current roster size.
    #[instrument(skip(self, request))]
    pub async fn update(&self, actor: &Actor, id: i64, request: UpdateSessionRequest) -> Result<Session> {
        let session = self.get(id).await?;
        let expo = self
            .db
            .expos
            .find_by_id(session.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", session.expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        match self.db.sessions.update(id, request).await? {
            Some(updated) => Ok(updated),
            // The guarded update affected no row: the ceiling would have
            // dropped below the roster (the session was just re-read)
            None => Err(ExpoHubError::Validation(format!(
                "max_attendees cannot be lowered below the {} registered attendees",
                session.attendee_count
            ))),
        }
    }

    /// Delete a session; refused while attendees are registered
    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &Actor, id: i64) -> Result<()> {
        let session = self.get(id).await?;
        let expo = self
            .db
            .expos
            .find_by_id(session.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", session.expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        if self.db.sessions.delete_if_empty(id).await? {
            info!(session_id = id, actor_id = actor.user_id, "Session deleted");
            return Ok(());
        }

        match self.db.sessions.find_by_id(id).await? {
            Some(s) => Err(ExpoHubError::Conflict(format!(
                "session {id} has {} registered attendees and cannot be deleted",
                s.attendee_count
            ))),
            None => Err(ExpoHubError::not_found("Session", id)),
        }
    }

    /// Register the acting user for a session.
    ///
    /// Precondition chain: session exists, user holds an expo registration,
    /// the session takes registrations, no existing roster entry, then the
    /// seat CAS. The duplicate check runs before the capacity check so a
    /// re-submitted request reads as `Duplicate`, never `Capacity`.
    #[instrument(skip(self))]
    pub async fn register(&self, actor: &Actor, session_id: i64) -> Result<SessionAttendee> {
        let session = self.get(session_id).await?;
        let attendee = self.require_expo_registration(actor.user_id, session.expo_id).await?;

        if !session.registration_required {
            return Err(ExpoHubError::Validation(format!(
                "session {session_id} is open seating and takes no registrations"
            )));
        }
        if self.db.sessions.is_registered(session_id, actor.user_id).await? {
            return Err(ExpoHubError::Duplicate(format!(
                "user {} is already registered for session {session_id}",
                actor.user_id
            )));
        }

        if !self.db.sessions.take_seat(session_id).await? {
            return Err(ExpoHubError::Capacity(format!(
                "session {session_id} is full ({} seats)",
                session.max_attendees
            )));
        }

        let entry = match self.db.sessions.add_attendee(session_id, actor.user_id).await {
            Ok(entry) => entry,
            Err(err) if is_unique_violation(&err) => {
                // Lost a duplicate race after the pre-check; hand the seat back
                self.db.sessions.return_seat(session_id).await?;
                return Err(ExpoHubError::Duplicate(format!(
                    "user {} is already registered for session {session_id}",
                    actor.user_id
                )));
            }
            Err(err) => {
                self.db.sessions.return_seat(session_id).await?;
                return Err(err);
            }
        };

        // Attendee-side mirror follows the commit point
        if let Err(source) = self
            .db
            .attendees
            .add_session_registration(attendee.id, session_id)
            .await
        {
            log_partial_failure(
                "Session",
                session_id,
                "seat taken and session roster written",
                "attendee-side mirror",
            );
            return Err(ExpoHubError::PartialFailure {
                entity: "Session",
                id: session_id,
                committed: "seat taken and session roster written".to_string(),
                source: Box::new(source),
            });
        }

        info!(
            session_id = session_id,
            user_id = actor.user_id,
            "Session registration completed"
        );
        Ok(entry)
    }

    /// Remove the acting user from a session. Idempotent: unregistering when
    /// not registered is a no-op, and the seat is only returned when a roster
    /// row was actually removed.
    #[instrument(skip(self))]
    pub async fn unregister(&self, actor: &Actor, session_id: i64) -> Result<()> {
        let session = self.get(session_id).await?;

        // Without an expo registration there is nothing on either roster
        // side; still a success so client retries stay simple
        let Some(attendee) = self
            .db
            .attendees
            .find_by_user_and_expo(actor.user_id, session.expo_id)
            .await?
        else {
            return Ok(());
        };

        let removed = self
            .db
            .sessions
            .remove_attendee(session_id, actor.user_id)
            .await?;
        if !removed {
            return Ok(());
        }

        if let Err(source) = self.settle_unregister(session_id, attendee.id).await {
            log_partial_failure(
                "Session",
                session_id,
                "session roster entry removed",
                "seat return/attendee-side mirror",
            );
            return Err(ExpoHubError::PartialFailure {
                entity: "Session",
                id: session_id,
                committed: "session roster entry removed".to_string(),
                source: Box::new(source),
            });
        }

        info!(
            session_id = session_id,
            user_id = actor.user_id,
            "Session registration removed"
        );
        Ok(())
    }

    async fn settle_unregister(&self, session_id: i64, attendee_id: i64) -> Result<()> {
        self.db.sessions.return_seat(session_id).await?;
        self.db
            .attendees
            .remove_session_registration(attendee_id, session_id)
            .await?;
        Ok(())
    }

    /// Mark whether a registered user actually attended. Organizer-gated;
    /// both roster sides are updated.
    #[instrument(skip(self))]
    pub async fn mark_attendance(
        &self,
        actor: &Actor,
        session_id: i64,
        user_id: i64,
        attended: bool,
    ) -> Result<()> {
        let session = self.get(session_id).await?;
        let expo = self
            .db
            .expos
            .find_by_id(session.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", session.expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        if !self.db.sessions.set_attended(session_id, user_id, attended).await? {
            // No roster row for this user on this session
            return Err(ExpoHubError::not_found("SessionRegistration", user_id));
        }

        if let Some(attendee) = self
            .db
            .attendees
            .find_by_user_and_expo(user_id, session.expo_id)
            .await?
        {
            if let Err(source) = self
                .db
                .attendees
                .set_session_attended(attendee.id, session_id, attended)
                .await
            {
                log_partial_failure(
                    "Session",
                    session_id,
                    "session-side attendance written",
                    "attendee-side mirror",
                );
                return Err(ExpoHubError::PartialFailure {
                    entity: "Session",
                    id: session_id,
                    committed: "session-side attendance written".to_string(),
                    source: Box::new(source),
                });
            }
        }

        Ok(())
    }

    /// Submit or overwrite session feedback. Only attendees marked as having
    /// attended may rate; the aggregate is recomputed from the full list.
    #[instrument(skip(self, comment))]
    pub async fn submit_feedback(
        &self,
        actor: &Actor,
        session_id: i64,
        rating: i32,
        comment: Option<String>,
    ) -> Result<SessionFeedback> {
        if !(1..=5).contains(&rating) {
            return Err(ExpoHubError::Validation(
                "rating must be between 1 and 5".to_string(),
            ));
        }

        // Session must exist before the roster lookup
        self.get(session_id).await?;

        let entry = self
            .db
            .sessions
            .get_attendee_entry(session_id, actor.user_id)
            .await?
            .ok_or_else(|| {
                ExpoHubError::Validation(format!(
                    "user {} is not registered for session {session_id}",
                    actor.user_id
                ))
            })?;
        if !entry.attended {
            return Err(ExpoHubError::Validation(
                "feedback requires a recorded attendance".to_string(),
            ));
        }

        let feedback = self
            .db
            .sessions
            .upsert_feedback(session_id, actor.user_id, rating, comment)
            .await?;
        self.db.sessions.recompute_rating(session_id).await?;

        Ok(feedback)
    }

    /// Attendance and rating analytics for one session
    pub async fn analytics(&self, session_id: i64) -> Result<SessionAnalytics> {
        let session = self.get(session_id).await?;
        let roster = self.db.sessions.get_attendees(session_id).await?;
        let total_registered = roster.len() as i64;
        let total_attended = self.db.sessions.count_attended(session_id).await?;
        let total_feedback = self.db.sessions.get_feedback(session_id).await?.len() as i64;

        let attendance_rate = if total_registered > 0 {
            total_attended as f64 / total_registered as f64
        } else {
            0.0
        };
        let occupancy_rate = if session.max_attendees > 0 {
            total_registered as f64 / session.max_attendees as f64
        } else {
            0.0
        };

        Ok(SessionAnalytics {
            total_registered,
            total_attended,
            attendance_rate,
            average_rating: session.rating_average,
            total_feedback,
            capacity: session.max_attendees,
            occupancy_rate,
        })
    }

    /// The acting user's session registrations within an expo
    pub async fn my_sessions(&self, actor: &Actor, expo_id: i64) -> Result<Vec<Session>> {
        let attendee = self.require_expo_registration(actor.user_id, expo_id).await?;
        let registrations = self
            .db
            .attendees
            .get_session_registrations(attendee.id)
            .await?;

        let mut sessions = Vec::with_capacity(registrations.len());
        for registration in registrations {
            if let Some(session) = self.db.sessions.find_by_id(registration.session_id).await? {
                sessions.push(session);
            }
        }
        Ok(sessions)
    }

    /// Rebuild seat counter and rating aggregate from the underlying rows.
    /// Recovery primitive after a reported partial failure.
    #[instrument(skip(self))]
    pub async fn recompute_stats(&self, actor: &Actor, session_id: i64) -> Result<Session> {
        let session = self.get(session_id).await?;
        let expo = self
            .db
            .expos
            .find_by_id(session.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", session.expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        self.db.sessions.recompute_attendance(session_id).await?;
        let rebuilt = self
            .db
            .sessions
            .recompute_rating(session_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Session", session_id))?;

        info!(
            session_id = session_id,
            attendee_count = rebuilt.attendee_count,
            rating_count = rebuilt.rating_count,
            "Session stats recomputed from roster and feedback"
        );
        Ok(rebuilt)
    }

    async fn require_expo_registration(&self, user_id: i64, expo_id: i64) -> Result<Attendee> {
        self.db
            .attendees
            .find_by_user_and_expo(user_id, expo_id)
            .await?
            .ok_or_else(|| {
                ExpoHubError::Validation(format!(
                    "user {user_id} is not registered for expo {expo_id}"
                ))
            })
    }
}
