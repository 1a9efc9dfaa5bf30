//! Expo feedback desk service
//!
//! Free-form feedback on an expo, submitted by registered attendees and
//! worked by the organizer through an open/in_progress/resolved/closed
//! workflow. The whole desk sits behind a feature flag.

use tracing::instrument;

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::models::actor::Actor;
use crate::models::feedback::{Feedback, FeedbackStatus, SubmitFeedbackRequest};
use crate::services::auth::AccessPolicy;
use crate::utils::errors::{ExpoHubError, Result};

#[derive(Debug, Clone)]
pub struct FeedbackService {
    db: DatabaseService,
    settings: Settings,
    policy: AccessPolicy,
}

impl FeedbackService {
    pub fn new(db: DatabaseService, settings: Settings) -> Self {
        Self {
            db,
            settings,
            policy: AccessPolicy::new(),
        }
    }

    fn ensure_enabled(&self) -> Result<()> {
        if self.settings.features.feedback_desk {
            return Ok(());
        }
        Err(ExpoHubError::Config(
            "feedback desk is disabled by configuration".to_string(),
        ))
    }

    /// Submit feedback on an expo. Only registered attendees may submit.
    #[instrument(skip(self, request))]
    pub async fn submit(&self, actor: &Actor, request: SubmitFeedbackRequest) -> Result<Feedback> {
        self.ensure_enabled()?;

        if request.user_id != actor.user_id && !actor.is_admin() {
            return Err(ExpoHubError::AccessDenied(format!(
                "user {} may not submit feedback as user {}",
                actor.user_id, request.user_id
            )));
        }
        if request.subject.trim().is_empty() || request.message.trim().is_empty() {
            return Err(ExpoHubError::Validation(
                "subject and message must not be empty".to_string(),
            ));
        }
        if let Some(rating) = request.rating {
            if !(1..=5).contains(&rating) {
                return Err(ExpoHubError::Validation(
                    "rating must be between 1 and 5".to_string(),
                ));
            }
        }

        self.db
            .expos
            .find_by_id(request.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", request.expo_id))?;
        self.db
            .attendees
            .find_by_user_and_expo(request.user_id, request.expo_id)
            .await?
            .ok_or_else(|| {
                ExpoHubError::Validation(format!(
                    "user {} is not registered for expo {}",
                    request.user_id, request.expo_id
                ))
            })?;

        self.db.feedback.create(request).await
    }

    /// Get feedback by ID
    pub async fn get(&self, id: i64) -> Result<Feedback> {
        self.ensure_enabled()?;
        self.db
            .feedback
            .find_by_id(id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Feedback", id))
    }

    /// List an expo's feedback (organizer view), optionally filtered by
    /// workflow status
    pub async fn list(
        &self,
        actor: &Actor,
        expo_id: i64,
        status: Option<FeedbackStatus>,
    ) -> Result<Vec<Feedback>> {
        self.ensure_enabled()?;

        let expo = self
            .db
            .expos
            .find_by_id(expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        self.db
            .feedback
            .list_by_expo(expo_id, status.map(|s| s.as_str()))
            .await
    }

    /// Feedback the acting user has submitted
    pub async fn my_feedback(&self, actor: &Actor) -> Result<Vec<Feedback>> {
        self.ensure_enabled()?;
        self.db.feedback.list_by_user(actor.user_id).await
    }

    /// Respond to a feedback entry and move it to the given workflow status
    #[instrument(skip(self, response))]
    pub async fn respond(
        &self,
        actor: &Actor,
        id: i64,
        response: String,
        status: FeedbackStatus,
    ) -> Result<Feedback> {
        self.ensure_enabled()?;

        if response.trim().is_empty() {
            return Err(ExpoHubError::Validation(
                "response must not be empty".to_string(),
            ));
        }

        let feedback = self.get(id).await?;
        let expo = self
            .db
            .expos
            .find_by_id(feedback.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", feedback.expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        self.db
            .feedback
            .respond(id, response, actor.user_id, status.as_str())
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Feedback", id))
    }

    /// Move a feedback entry to another workflow status without responding
    #[instrument(skip(self))]
    pub async fn set_status(&self, actor: &Actor, id: i64, status: FeedbackStatus) -> Result<Feedback> {
        self.ensure_enabled()?;

        let feedback = self.get(id).await?;
        let expo = self
            .db
            .expos
            .find_by_id(feedback.expo_id)
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Expo", feedback.expo_id))?;
        self.policy.ensure_can_manage_expo(actor, &expo)?;

        self.db
            .feedback
            .set_status(id, status.as_str())
            .await?
            .ok_or_else(|| ExpoHubError::not_found("Feedback", id))
    }
}
