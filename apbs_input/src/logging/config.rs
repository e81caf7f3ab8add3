//! Logging configuration
//!
//! Buffer limits come from compile-time constants; the level, format and
//! console switches come from [`LoggingPreferences`].

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

type EventsLogLevel = crate::logging::events::LogLevel;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Preferences are read from the environment once per process
fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES
        .get_or_init(LoggingPreferences::default)
        .clone()
}

pub fn get_min_log_level() -> EventsLogLevel {
    get_runtime_preferences().min_log_level.to_events_log_level()
}

pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

pub fn use_color() -> bool {
    get_runtime_preferences().use_color
}

pub fn include_file_context() -> bool {
    get_runtime_preferences().include_file_context
}

pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE == 0 {
        return Err("LOG_BUFFER_SIZE must be greater than 0".to_string());
    }
    if MAX_LOG_MESSAGE_LENGTH < 80 {
        return Err("MAX_LOG_MESSAGE_LENGTH must allow at least one line".to_string());
    }
    Ok(())
}

pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();
    format!(
        "Logging: level={} structured={} console={} color={} file_context={} buffer={}",
        preferences.min_log_level.as_str(),
        preferences.use_structured_logging,
        preferences.enable_console_logging,
        preferences.use_color,
        preferences.include_file_context,
        LOG_BUFFER_SIZE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validates() {
        assert!(validate_config().is_ok());
        assert!(get_config_summary().starts_with("Logging: level="));
    }
}
