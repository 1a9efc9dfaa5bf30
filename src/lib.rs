//! ExpoHub
//!
//! A multi-tenant expo management backend. This library provides modular
//! components for expo lifecycle management, booth booking with a capacity
//! ledger, exhibitor applications, attendee registration, session scheduling
//! with seat limits, and an organizer feedback desk.

#![allow(non_snake_case)]

pub mod api;
pub mod config;
pub mod database;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ExpoHubError, Result};

// Re-export main components for easy access
pub use api::ApiResponse;
pub use database::DatabaseService;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
