//! Access policy implementation
//!
//! Role-based access control over expo management operations. Token
//! validation happens upstream; this service only judges an already-resolved
//! [`Actor`] against the entity it is trying to touch.

use tracing::debug;

use crate::models::actor::Actor;
use crate::models::expo::Expo;
use crate::utils::errors::{ExpoHubError, Result};

/// Access control decisions for expo-scoped operations
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Admins manage everything; organizers manage only expos they own
    pub fn can_manage_expo(&self, actor: &Actor, expo: &Expo) -> bool {
        actor.is_admin() || expo.organizer_id == actor.user_id
    }

    /// Guard for mutating organizer operations
    pub fn ensure_can_manage_expo(&self, actor: &Actor, expo: &Expo) -> Result<()> {
        if self.can_manage_expo(actor, expo) {
            return Ok(());
        }

        debug!(
            actor_id = actor.user_id,
            expo_id = expo.id,
            "Management access refused"
        );
        Err(ExpoHubError::AccessDenied(format!(
            "user {} may not manage expo {}",
            actor.user_id, expo.id
        )))
    }

    /// Guard for admin-only operations
    pub fn ensure_admin(&self, actor: &Actor) -> Result<()> {
        if actor.is_admin() {
            return Ok(());
        }

        Err(ExpoHubError::AccessDenied(format!(
            "user {} is not an admin",
            actor.user_id
        )))
    }

    /// Self-or-manager guard: a user may act on their own records, an
    /// organizer or admin on anyone's within their expo
    pub fn ensure_self_or_manager(
        &self,
        actor: &Actor,
        subject_user_id: i64,
        expo: &Expo,
    ) -> Result<()> {
        if actor.user_id == subject_user_id || self.can_manage_expo(actor, expo) {
            return Ok(());
        }

        Err(ExpoHubError::AccessDenied(format!(
            "user {} may not act for user {}",
            actor.user_id, subject_user_id
        )))
    }
}
