//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod actor;
pub mod attendee;
pub mod booth;
pub mod exhibitor;
pub mod expo;
pub mod feedback;
pub mod session;

// Re-export commonly used models
pub use actor::{Actor, Role};
pub use attendee::{Attendee, RegisterAttendeeRequest, SessionRegistration, TicketType};
pub use booth::{Booth, BoothStatus, CreateBoothRequest, UpdateBoothRequest};
pub use exhibitor::{ApplicationStatus, ApplyExhibitorRequest, Exhibitor, ReviewApplicationRequest};
pub use expo::{CreateExpoRequest, Expo, ExpoStatus, UpdateExpoRequest};
pub use feedback::{Feedback, FeedbackStatus, SubmitFeedbackRequest};
pub use session::{
    CreateSessionRequest, Session, SessionAnalytics, SessionAttendee, SessionFeedback,
    SessionStatus, UpdateSessionRequest,
};
