//! Application configuration loading, validation, and management.
//!
//! This module provides the top-level `Config` structure that aggregates
//! logging, metrics, and publisher configurations. It handles locating and
//! loading the TOML file, applying command-line overrides, and validation.
//!
//! The configuration is loaded early in the application lifecycle and is
//! intended to remain immutable thereafter.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use validator::Validate;

use self::{logger::LoggerConfig, metrics::MetricsConfig, publisher::PublisherConfig};
use crate::cli::Cli;

pub mod logger;
pub mod metrics;
pub mod publisher;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "SCRIPTBEE_CONFIG";

/// Configuration file used when neither the flag nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/scriptbee/config.toml";

/// Simple macros for printing timestamped messages to stderr before the tracing
/// subscriber is initialized. These are used during early configuration loading.
#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {
        $crate::config::print_early(console::style("INFO").green(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! print_warn {
    ($($arg:tt)*) => {
        $crate::config::print_early(console::style("WARN").yellow(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {
        $crate::config::print_early(console::style("ERROR").red(), format_args!($($arg)*))
    };
}

#[doc(hidden)]
pub fn print_early(level: console::StyledObject<&str>, message: std::fmt::Arguments<'_>) {
    let timestamp = time::format_description::parse(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z",
    )
    .ok()
    .and_then(|format| time::OffsetDateTime::now_utc().format(&format).ok())
    .unwrap_or_default();

    eprintln!("{}  {} {}", console::style(timestamp).dim(), level, message);
}

/// Errors that can occur during configuration loading, parsing, or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Generic configuration-related error with a descriptive message.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error while accessing configuration files.
    #[error("IO error while reading configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// Failure to parse the TOML configuration file.
    #[error("Parse error while reading configuration: {0}")]
    ParseError(String),

    /// Validation failure after successful parsing.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Top-level application configuration.
#[derive(Serialize, Deserialize, Debug, Validate, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// Logging subsystem configuration.
    #[validate(nested)]
    pub logger: LoggerConfig,

    /// Metrics collection configuration.
    #[validate(nested)]
    pub metrics: MetricsConfig,

    /// Destination of collected metrics.
    #[validate(nested)]
    pub publisher: PublisherConfig,
}

impl Config {
    /// Builds the effective configuration for this run.
    ///
    /// The file named by `--config`, `SCRIPTBEE_CONFIG` or the default path is
    /// loaded if present, built-in defaults are used otherwise, and
    /// command-line flags are applied on top before validation.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if an explicitly named file is missing, or if
    /// any file cannot be read, parsed, or validated.
    pub fn new(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match Self::get_config_path(cli.config.as_deref())? {
            Some(path) => Self::from_file(&path)?,
            None => {
                print_warn!("No configuration file found, using built-in defaults");
                Config::default()
            }
        };

        config.apply_cli(cli);
        config
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(config)
    }

    /// Determines the configuration file path.
    ///
    /// Priority:
    /// 1. the `--config` flag
    /// 2. `SCRIPTBEE_CONFIG` environment variable
    /// 3. `/etc/scriptbee/config.toml`, if it exists
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Config` if a file named by the flag or the
    /// environment does not exist.
    fn get_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
        let named = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::var_os(CONFIG_ENV).map(PathBuf::from),
        };

        if let Some(path) = named {
            if !path.exists() {
                return Err(ConfigError::Config(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
            print_info!("Using config from: {}", path.display());
            return Ok(Some(path));
        }

        let fallback = Path::new(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            print_info!("Using default config path: {}", fallback.display());
            return Ok(Some(fallback.to_path_buf()));
        }

        Ok(None)
    }

    /// Loads and validates configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Propagates IO, parsing, and validation errors as `ConfigError`.
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let config_str = fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&config_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        print_info!("Successfully loaded config from: {}", path.display());
        Ok(config)
    }

    /// Overrides file values with the flags that were given.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(script_path) = &cli.script_path {
            self.metrics.custom_script.script_path = script_path.display().to_string();
        }
        if let Some(level) = &cli.log_level {
            self.logger.level = level.clone();
        }
        for name in &cli.enable_collector {
            if !self.metrics.collectors.enabled.contains(name) {
                self.metrics.collectors.enabled.push(name.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use tempfile::NamedTempFile;

    use super::{publisher::PublisherKind, *};

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_config_from_toml() {
        let file = write_config(
            r#"
                [logger]
                level = "debug"

                [metrics]
                namespace = "edge"

                [metrics.collectors]
                enabled = ["custom_script"]
                collection_interval = 30

                [metrics.custom_script]
                script_path = "/srv/scripts"

                [publisher]
                kind = "pushgateway"
                address = "http://gateway:9091"
            "#,
        );

        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(config.logger.level, "debug");
        assert_eq!(config.metrics.namespace, "edge");
        assert_eq!(config.metrics.collectors.enabled, vec!["custom_script"]);
        assert_eq!(config.metrics.collectors.collection_interval, 30);
        assert_eq!(config.metrics.custom_script.script_path, "/srv/scripts");
        assert_eq!(config.publisher.kind, PublisherKind::Pushgateway);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config("[logger]\nlevel = \"warn\"\n");

        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(config.logger.level, "warn");
        assert_eq!(
            config.metrics.custom_script.script_path,
            metrics::DEFAULT_SCRIPT_PATH
        );
        assert_eq!(config.publisher.kind, PublisherKind::Stdout);
    }

    #[test]
    fn test_invalid_toml() {
        let file = write_config("[metrics\nnamespace = ");

        match Config::from_file(file.path()) {
            Err(ConfigError::ParseError(_)) => {}
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_config("[metrics]\nnamespace = \"bad-namespace\"\n");

        match Config::from_file(file.path()) {
            Err(ConfigError::ValidationError(msg)) => assert!(msg.contains("namespace")),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = write_config(
            r#"
                [metrics.custom_script]
                script_path = "/from/file"
            "#,
        );
        let path = file.path().display().to_string();
        let cli = Cli::parse_from([
            "scriptbee",
            "--config",
            path.as_str(),
            "--script-path",
            "/from/flag",
            "--log-level",
            "trace",
            "--enable-collector",
            "custom_script",
        ]);

        let config = Config::new(&cli).unwrap();

        assert_eq!(config.metrics.custom_script.script_path, "/from/flag");
        assert_eq!(config.logger.level, "trace");
        assert_eq!(config.metrics.collectors.enabled, vec!["custom_script"]);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let cli = Cli::parse_from(["scriptbee", "--config", "/definitely/not/here.toml"]);

        assert!(matches!(Config::new(&cli), Err(ConfigError::Config(_))));
    }
}
