//! Configuration validation
//!
//! Sanity checks applied after settings are loaded, before any service starts.

use crate::config::Settings;
use crate::utils::errors::ExpoHubError;

/// Validate the loaded settings
pub fn validate_settings(settings: &Settings) -> Result<(), ExpoHubError> {
    if settings.database.url.is_empty() {
        return Err(ExpoHubError::Config("database.url must not be empty".to_string()));
    }

    if !settings.database.url.starts_with("postgres") {
        return Err(ExpoHubError::Config(format!(
            "database.url must be a postgres URL, got: {}",
            settings.database.url
        )));
    }

    if settings.database.min_connections > settings.database.max_connections {
        return Err(ExpoHubError::Config(
            "database.min_connections cannot exceed database.max_connections".to_string(),
        ));
    }

    if settings.booking.default_reservation_minutes <= 0 {
        return Err(ExpoHubError::Config(
            "booking.default_reservation_minutes must be positive".to_string(),
        ));
    }

    if settings.booking.max_reservation_minutes < settings.booking.default_reservation_minutes {
        return Err(ExpoHubError::Config(
            "booking.max_reservation_minutes cannot be below the default".to_string(),
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    let level = settings.logging.level.to_lowercase();
    // Directive syntax like "info,sqlx=warn" is passed through to the env filter
    if !level.contains('=') && !level.contains(',') && !valid_levels.contains(&level.as_str()) {
        return Err(ExpoHubError::Config(format!(
            "logging.level must be one of {:?}, got: {}",
            valid_levels, settings.logging.level
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_database_url() {
        let mut settings = Settings::default();
        settings.database.url = String::new();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_non_positive_reservation_duration() {
        let mut settings = Settings::default();
        settings.booking.default_reservation_minutes = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "loud".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_accepts_env_filter_directives() {
        let mut settings = Settings::default();
        settings.logging.level = "info,sqlx=warn".to_string();
        assert!(validate_settings(&settings).is_ok());
    }
}
