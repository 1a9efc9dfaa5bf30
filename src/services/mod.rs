//! Services module
//!
//! This module contains business logic services

pub mod attendee;
pub mod auth;
pub mod booth;
pub mod exhibitor;
pub mod expo;
pub mod feedback;
pub mod session;

// Re-export commonly used services
pub use attendee::AttendeeService;
pub use auth::AccessPolicy;
pub use booth::BoothService;
pub use exhibitor::ExhibitorService;
pub use expo::{ExpoAnalytics, ExpoService};
pub use feedback::FeedbackService;
pub use session::SessionService;

use crate::config::settings::Settings;
use crate::database::DatabaseService;

/// Service factory for creating and managing all services
#[derive(Debug, Clone)]
pub struct ServiceFactory {
    pub expo_service: ExpoService,
    pub booth_service: BoothService,
    pub exhibitor_service: ExhibitorService,
    pub attendee_service: AttendeeService,
    pub session_service: SessionService,
    pub feedback_service: FeedbackService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: Settings, db: DatabaseService) -> Self {
        let booth_service = BoothService::new(db.clone(), settings.clone());
        let expo_service = ExpoService::new(db.clone(), settings.clone());
        let exhibitor_service = ExhibitorService::new(db.clone(), booth_service.clone());
        let attendee_service = AttendeeService::new(db.clone());
        let session_service = SessionService::new(db.clone());
        let feedback_service = FeedbackService::new(db, settings);

        Self {
            expo_service,
            booth_service,
            exhibitor_service,
            attendee_service,
            session_service,
            feedback_service,
        }
    }
}
