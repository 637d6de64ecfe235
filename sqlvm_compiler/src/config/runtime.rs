// RUNTIME PREFERENCES (User Experience)

use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;

/// Name of the dialect used when none is requested explicitly
pub const BUILTIN_DEFAULT_DIALECT: &str = "mysql";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerPreferences {
    /// Dialect selected when the caller does not name one
    pub default_dialect: String,

    /// Whether a jump to an undefined label fails the build instead of
    /// falling back to the literal label name
    pub strict_labels: bool,

    /// Whether to trim surrounding whitespace from the generated program
    pub trim_output: bool,

    /// Whether to record per-region reports in the compile result
    pub collect_region_reports: bool,
}

impl Default for CompilerPreferences {
    fn default() -> Self {
        Self {
            default_dialect: env::var(env_vars::DEFAULT_DIALECT)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| BUILTIN_DEFAULT_DIALECT.to_string()),
            strict_labels: env::var(env_vars::STRICT_LABELS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            trim_output: env::var(env_vars::TRIM_OUTPUT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            collect_region_reports: env::var(env_vars::COLLECT_REGION_REPORTS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    /// User preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to include the template path in log events
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
            include_file_context: env::var(env_vars::LOGGING_INCLUDE_FILE_CONTEXT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

/// Parse a log level from its name or numeric rank
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub compiler: CompilerPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Compiler
    pub const DEFAULT_DIALECT: &str = "SQLVM_DEFAULT_DIALECT";
    pub const STRICT_LABELS: &str = "SQLVM_STRICT_LABELS";
    pub const TRIM_OUTPUT: &str = "SQLVM_TRIM_OUTPUT";
    pub const COLLECT_REGION_REPORTS: &str = "SQLVM_COLLECT_REGION_REPORTS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "SQLVM_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "SQLVM_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "SQLVM_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "SQLVM_LOGGING_INCLUDE_FILE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_env_var_names_exist() {
        assert!(env_vars::DEFAULT_DIALECT.starts_with("SQLVM_"));
        assert!(env_vars::STRICT_LABELS.starts_with("SQLVM_"));
        assert!(env_vars::LOGGING_MIN_LEVEL.starts_with("SQLVM_"));
    }

    #[test]
    fn test_default_dialect_is_never_empty() {
        let preferences = CompilerPreferences::default();
        assert!(!preferences.default_dialect.is_empty());
    }
}
