//! Logging configuration structures and validation logic.
//!
//! These types drive `LoggerManager`: the global level, the console layer with
//! its timestamp format, and the optional systemd journald layer. All
//! structures deserialize from the `[logger]` table of the configuration file.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Available formats for console log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        LogFormat::Compact
    }
}

/// Formats available for timestamps in console log entries. All are UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampFormat {
    Rfc3339,
    /// Whole seconds since the Unix epoch.
    Unix,
    /// A `time` format description, e.g. `[hour]:[minute]:[second]`.
    Custom(String),
}

impl Default for TimestampFormat {
    fn default() -> Self {
        TimestampFormat::Rfc3339
    }
}

/// Top-level logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggerConfig {
    /// Global log level. Valid values: trace, debug, info, warn, error (case-insensitive).
    /// `RUST_LOG`, when set, takes precedence.
    #[validate(custom(function = "validate_log_level"))]
    pub level: String,

    /// Optional console output configuration.
    #[validate(nested)]
    pub console: Option<ConsoleConfig>,

    /// Optional systemd journald output configuration.
    #[validate(nested)]
    pub journald: Option<JournaldConfig>,

    /// Timestamp format used by the console output.
    #[validate(custom(function = "validate_timestamp_format"))]
    pub timestamp_format: TimestampFormat,
}

/// Validates that a custom timestamp format is non-empty and parses.
fn validate_timestamp_format(format: &TimestampFormat) -> Result<(), ValidationError> {
    let TimestampFormat::Custom(description) = format else {
        return Ok(());
    };

    let mut err = ValidationError::new("invalid_timestamp_format");
    if description.is_empty() {
        err.message = Some("Custom timestamp format cannot be empty".into());
        return Err(err);
    }
    if let Err(e) = time::format_description::parse_owned::<1>(description) {
        err.message = Some(format!("Invalid timestamp format {:?}: {}", description, e).into());
        return Err(err);
    }
    Ok(())
}

/// Validates that the provided log level is one of the supported values.
pub(crate) fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => {
            let mut err = ValidationError::new("invalid_log_level");
            err.message = Some(format!("Invalid log level: {}", level).into());
            Err(err)
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            level: "info".to_string(),
            console: Some(ConsoleConfig::default()),
            journald: None,
            timestamp_format: TimestampFormat::default(),
        }
    }
}

/// Configuration for console log output.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Whether console output is enabled.
    pub enabled: bool,

    /// Output format for console logs.
    pub format: LogFormat,

    /// Include the log target (module path) in output.
    pub show_target: bool,

    /// Include thread IDs in output.
    pub show_thread_ids: bool,

    /// Enable ANSI color codes in console output.
    pub ansi_colors: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            enabled: true,
            format: LogFormat::default(),
            show_target: false,
            show_thread_ids: false,
            ansi_colors: true,
        }
    }
}

/// Configuration for systemd journald output.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JournaldConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Syslog identifier used for journal entries. Must be non-empty.
    #[validate(length(min = 1))]
    pub identifier: String,
}

impl Default for JournaldConfig {
    fn default() -> Self {
        JournaldConfig {
            enabled: false,
            identifier: "scriptbee".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_validation() {
        assert!(validate_log_level("DEBUG").is_ok());
        assert!(validate_log_level("warn").is_ok());
        assert!(validate_log_level("verbose").is_err());
    }

    #[test]
    fn test_empty_journald_identifier_rejected() {
        let config = LoggerConfig {
            journald: Some(JournaldConfig {
                enabled: true,
                identifier: String::new(),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_console_format_from_toml() {
        let config: LoggerConfig = toml::from_str(
            r#"
                level = "debug"
                [console]
                format = "json"
            "#,
        )
        .unwrap();

        let console = config.console.unwrap();
        assert_eq!(console.format, LogFormat::Json);
        assert!(console.enabled);
        assert_eq!(config.timestamp_format, TimestampFormat::Rfc3339);
    }

    #[test]
    fn test_timestamp_format_from_toml() {
        let config: LoggerConfig = toml::from_str(r#"timestamp_format = "unix""#).unwrap();
        assert_eq!(config.timestamp_format, TimestampFormat::Unix);

        let config: LoggerConfig =
            toml::from_str(r#"timestamp_format = { custom = "[hour]:[minute]" }"#).unwrap();
        assert_eq!(
            config.timestamp_format,
            TimestampFormat::Custom("[hour]:[minute]".to_string())
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_custom_timestamp_format_rejected() {
        for description in ["", "[hour", "[not_a_component]"] {
            let config = LoggerConfig {
                timestamp_format: TimestampFormat::Custom(description.to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{:?} should be rejected", description);
        }
    }
}
