//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the ExpoHub application.

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::utils::errors::{ExpoHubError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard owns the background writer for the file appender;
/// dropping it stops file logging, so the caller must keep it alive for the
/// lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "expohub.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .try_init()
        .map_err(|e| ExpoHubError::Config(format!("failed to initialize logging: {e}")))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log a booth state transition
pub fn log_booth_transition(booth_id: i64, from: &str, to: &str, actor_id: i64) {
    info!(
        booth_id = booth_id,
        from = from,
        to = to,
        actor_id = actor_id,
        "Booth state transition"
    );
}

/// Log a counter mutation on an expo
pub fn log_counter_change(expo_id: i64, counter: &str, delta: i64) {
    debug!(
        expo_id = expo_id,
        counter = counter,
        delta = delta,
        "Expo counter updated"
    );
}

/// Log a partially committed multi-entity write sequence.
///
/// Carries enough context (entity ids, which writes succeeded) to drive
/// manual or automatic reconciliation; this is the one class of failure that
/// should raise an out-of-band alert.
pub fn log_partial_failure(entity: &str, id: i64, committed: &str, failed: &str) {
    error!(
        entity = entity,
        id = id,
        committed = committed,
        failed = failed,
        alert = true,
        "Partial failure: counters may have drifted, reconciliation required"
    );
}

/// Log admin/organizer actions
pub fn log_admin_action(actor_id: i64, action: &str, target: Option<&str>) {
    warn!(
        actor_id = actor_id,
        action = action,
        target = target,
        "Privileged action performed"
    );
}

/// Log a counter reconciliation run
pub fn log_reconciliation(expo_id: i64, booked_booths: i32, exhibitors: i32, attendees: i32) {
    info!(
        expo_id = expo_id,
        booked_booths = booked_booths,
        exhibitors_count = exhibitors,
        attendees_count = attendees,
        "Expo counters recomputed from entity scans"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_hands_back_the_writer_guard() {
        let log_dir = std::env::temp_dir().join("expohub-logging-test");
        std::fs::create_dir_all(&log_dir).unwrap();

        let config = LoggingConfig {
            level: "info".to_string(),
            file_path: log_dir.to_string_lossy().to_string(),
        };

        // The global dispatcher can only be set once per process; this is
        // the only unit test that installs it
        let guard = init_logging(&config).expect("logging should initialize");
        drop(guard);
    }
}
