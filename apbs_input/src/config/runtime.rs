// RUNTIME PREFERENCES (User Experience)

use super::constants::compile_time;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessorPreferences {
    /// Maximum file size in bytes, capped by the compile-time limit
    pub max_file_size: u64,

    /// Whether to require a known legacy or structured extension
    pub require_known_extension: bool,

    /// Whether to log timing information for file reads
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            max_file_size: env::var(env_vars::MAX_FILE_SIZE)
                .ok()
                .and_then(|v| v.parse().ok())
                .map(|v: u64| v.min(compile_time::file_processing::MAX_FILE_SIZE))
                .unwrap_or(compile_time::file_processing::MAX_FILE_SIZE),
            require_known_extension: env::var(env_vars::REQUIRE_KNOWN_EXTENSION)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_performance_logging: env::var(env_vars::ENABLE_PERFORMANCE_LOGGING)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderPreferences {
    /// Maximum number of tokens, capped by the compile-time limit
    pub max_token_count: usize,

    /// Whether deprecated keywords are reported through the logger
    pub warn_on_deprecated: bool,
}

impl Default for DecoderPreferences {
    fn default() -> Self {
        Self {
            max_token_count: env::var(env_vars::MAX_TOKEN_COUNT)
                .ok()
                .and_then(|v| v.parse().ok())
                .map(|v: usize| v.min(compile_time::lexical::MAX_TOKEN_COUNT))
                .unwrap_or(compile_time::lexical::MAX_TOKEN_COUNT),
            warn_on_deprecated: env::var(env_vars::WARN_DEPRECATED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to emit JSON lines instead of console text
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Whether console output is colored
    pub use_color: bool,

    /// Minimum level that reaches the logger
    pub min_log_level: LogLevel,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOG_FORMAT)
                .ok()
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOG_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            use_color: env::var(env_vars::LOG_COLOR)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOG_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
            include_file_context: env::var(env_vars::LOG_FILE_CONTEXT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

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
    pub file_processor: FileProcessorPreferences,
    pub decoder: DecoderPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const MAX_FILE_SIZE: &str = "APBS_MAX_FILE_SIZE";
    pub const REQUIRE_KNOWN_EXTENSION: &str = "APBS_REQUIRE_KNOWN_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "APBS_ENABLE_PERFORMANCE_LOGGING";

    // Decoder
    pub const MAX_TOKEN_COUNT: &str = "APBS_MAX_TOKEN_COUNT";
    pub const WARN_DEPRECATED: &str = "APBS_WARN_DEPRECATED";

    // Logging
    pub const LOG_LEVEL: &str = "APBS_LOG_LEVEL";
    pub const LOG_FORMAT: &str = "APBS_LOG_FORMAT";
    pub const LOG_COLOR: &str = "APBS_LOG_COLOR";
    pub const LOG_CONSOLE: &str = "APBS_LOG_CONSOLE";
    pub const LOG_FILE_CONTEXT: &str = "APBS_LOG_FILE_CONTEXT";
}
