//! Error handling for ExpoHub
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for ExpoHub application
#[derive(Error, Debug)]
pub enum ExpoHubError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Capacity exceeded: {0}")]
    Capacity(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// A multi-entity side-effect sequence partially committed. The entity
    /// id and the writes that already succeeded are carried so operators can
    /// run the reconciliation primitive against the right expo or session.
    #[error("Partial failure on {entity} {id} ({committed}): {source}")]
    PartialFailure {
        entity: &'static str,
        id: i64,
        committed: String,
        #[source]
        source: Box<ExpoHubError>,
    },
}

/// Result type alias for ExpoHub operations
pub type Result<T> = std::result::Result<T, ExpoHubError>;

impl ExpoHubError {
    /// Shorthand for a missing entity
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        ExpoHubError::NotFound { entity, id }
    }

    /// HTTP status the request boundary maps this error to
    pub fn http_status(&self) -> u16 {
        match self {
            ExpoHubError::NotFound { .. } => 404,
            ExpoHubError::Validation(_) => 400,
            ExpoHubError::Conflict(_) => 409,
            ExpoHubError::Capacity(_) => 409,
            ExpoHubError::Duplicate(_) => 409,
            ExpoHubError::AccessDenied(_) => 403,
            ExpoHubError::PartialFailure { .. } => 500,
            ExpoHubError::Database(_) => 500,
            ExpoHubError::Migration(_) => 500,
            ExpoHubError::Config(_) => 500,
            ExpoHubError::Serialization(_) => 500,
        }
    }

    /// Check if the error is recoverable by retrying the request
    pub fn is_recoverable(&self) -> bool {
        match self {
            ExpoHubError::Database(_) => true,
            ExpoHubError::Migration(_) => false,
            ExpoHubError::Config(_) => false,
            ExpoHubError::Serialization(_) => false,
            ExpoHubError::NotFound { .. } => false,
            ExpoHubError::Validation(_) => false,
            // The winner of the race may release later
            ExpoHubError::Conflict(_) => true,
            ExpoHubError::Capacity(_) => true,
            ExpoHubError::Duplicate(_) => false,
            ExpoHubError::AccessDenied(_) => false,
            // Needs reconciliation first, not a blind retry
            ExpoHubError::PartialFailure { .. } => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ExpoHubError::Database(_) => ErrorSeverity::Critical,
            ExpoHubError::Migration(_) => ErrorSeverity::Critical,
            ExpoHubError::Config(_) => ErrorSeverity::Critical,
            ExpoHubError::PartialFailure { .. } => ErrorSeverity::Critical,
            ExpoHubError::AccessDenied(_) => ErrorSeverity::Warning,
            ExpoHubError::Conflict(_) => ErrorSeverity::Info,
            ExpoHubError::Capacity(_) => ErrorSeverity::Info,
            ExpoHubError::Duplicate(_) => ErrorSeverity::Info,
            ExpoHubError::Validation(_) => ErrorSeverity::Info,
            ExpoHubError::NotFound { .. } => ErrorSeverity::Info,
            ExpoHubError::Serialization(_) => ErrorSeverity::Error,
        }
    }

    /// Whether this error class should trigger an out-of-band alert instead
    /// of a plain 4xx body. Only partial commits qualify.
    pub fn needs_alert(&self) -> bool {
        matches!(self, ExpoHubError::PartialFailure { .. })
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ExpoHubError::not_found("Booth", 1).http_status(), 404);
        assert_eq!(ExpoHubError::Validation("bad".into()).http_status(), 400);
        assert_eq!(ExpoHubError::Conflict("taken".into()).http_status(), 409);
        assert_eq!(ExpoHubError::Capacity("full".into()).http_status(), 409);
        assert_eq!(ExpoHubError::Duplicate("again".into()).http_status(), 409);
        assert_eq!(ExpoHubError::AccessDenied("no".into()).http_status(), 403);
    }

    #[test]
    fn test_partial_failure_is_critical_and_alerts() {
        let err = ExpoHubError::PartialFailure {
            entity: "Booth",
            id: 7,
            committed: "booth row booked".to_string(),
            source: Box::new(ExpoHubError::Database(sqlx::Error::PoolClosed)),
        };
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.needs_alert());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_conflict_is_retryable_but_duplicate_is_not() {
        assert!(ExpoHubError::Conflict("booth not available".into()).is_recoverable());
        assert!(!ExpoHubError::Duplicate("already applied".into()).is_recoverable());
    }
}
