//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod attendee;
pub mod booth;
pub mod exhibitor;
pub mod expo;
pub mod feedback;
pub mod session;

// Re-export repositories
pub use attendee::AttendeeRepository;
pub use booth::{BoothRepository, ReleasedBooth};
pub use exhibitor::{ExhibitorRepository, ReviewedApplication};
pub use expo::ExpoRepository;
pub use feedback::FeedbackRepository;
pub use session::SessionRepository;

/// Whether a repository error is a unique-index violation. Racing duplicate
/// inserts land here after the service's membership pre-check passed.
pub fn is_unique_violation(err: &crate::utils::errors::ExpoHubError) -> bool {
    match err {
        crate::utils::errors::ExpoHubError::Database(sqlx::Error::Database(db_err)) => {
            db_err.is_unique_violation()
        }
        _ => false,
    }
}
