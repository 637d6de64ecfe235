//! Logging configuration: compile-time bounds plus runtime user preferences
//!
//! The build profile fixes the buffer size, message length and the least
//! verbose level a user may select. Everything else comes from
//! [`LoggingPreferences`].

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Initialize runtime preferences. Fails if already initialized.
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime logging preferences already initialized".to_string())
}

fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

/// The least verbose level a user may select
pub fn get_security_log_level() -> LogLevel {
    LogLevel::from_rank(SECURITY_MIN_LOG_LEVEL)
}

/// Minimum log level, raised to the compile-time floor when necessary
pub fn get_min_log_level() -> LogLevel {
    clamp_to_floor(get_runtime_preferences().min_log_level)
}

fn clamp_to_floor(level: LogLevel) -> LogLevel {
    level.max(get_security_log_level())
}

pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

pub fn include_file_context() -> bool {
    get_runtime_preferences().include_file_context
}

pub fn get_log_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

/// Sanity-check the generated limits before the global logger starts
pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE == 0 {
        return Err("log_buffer_size must be greater than zero".to_string());
    }
    if MAX_LOG_MESSAGE_LENGTH < 16 {
        return Err(format!(
            "max_log_message_length {} is too small",
            MAX_LOG_MESSAGE_LENGTH
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_raises_quieter_levels() {
        let floor = get_security_log_level();
        assert_eq!(clamp_to_floor(LogLevel::Error), floor.max(LogLevel::Error));
        assert_eq!(clamp_to_floor(LogLevel::Debug), LogLevel::Debug);
    }

    #[test]
    fn test_generated_limits_validate() {
        assert!(validate_config().is_ok());
        assert!(get_log_buffer_size() > 0);
    }
}
