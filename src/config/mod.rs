//! Configuration module
//!
//! This module handles application settings loading and validation

pub mod settings;
pub mod validation;

pub use settings::{BookingConfig, DatabaseConfig, FeaturesConfig, LoggingConfig, Settings};
