//! Configuration module for the SQLVM compiler
//! Automatically uses generated constants from TOML configuration

// Include generated constants from build.rs
// This file is generated at compile time from the TOML configuration
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{CompilerPreferences, LoggingPreferences, RuntimeConfig};

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("SQLVM_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("SQLVM_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time::*;

    #[test]
    fn test_generated_limits_are_consistent() {
        assert!(file_processing::MAX_FILE_SIZE > 0);
        assert!(lexical::MAX_TOKEN_COUNT > 0);
        assert!(lexical::MAX_IDENTIFIER_LENGTH > 0);
        assert!(syntax::MAX_NESTING_DEPTH > 0);
        assert!(dialect::DEFAULT_STEP_BITS <= dialect::MAX_STEP_BITS);
        assert!(dialect::MAX_STEP_BITS <= 62);
    }

    #[test]
    fn test_source_info_names_profile() {
        let info = super::build_info::source_info();
        assert!(info.contains(super::build_info::profile()));
        assert!(info.ends_with(".toml"));
    }
}
