//! Centralized logging configuration and initialization manager.
//!
//! The `LoggerManager` validates logging configuration and installs the
//! global `tracing` subscriber with a console layer and/or a systemd
//! journald layer. Filtering follows `RUST_LOG` when set and the configured
//! level otherwise.
//!
//! Console output goes to stderr. Stdout is reserved for published metrics.

use std::io;

use thiserror::Error;
use time::{
    format_description::{well_known::Rfc3339, OwnedFormatItem},
    OffsetDateTime,
};
use tracing::instrument;
use tracing_subscriber::{
    fmt::{self, format::Writer, time::FormatTime},
    prelude::*,
    EnvFilter, Layer, Registry,
};
use validator::{Validate, ValidationErrors};

use crate::{
    config::logger::{ConsoleConfig, JournaldConfig, LogFormat, LoggerConfig, TimestampFormat},
    print_info, print_warn,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Errors that can occur during logger configuration or initialization.
#[derive(Error, Debug)]
pub enum LoggerError {
    /// The global subscriber could not be installed (usually because one already is).
    #[error("Logger initialization error: {0}")]
    InitializationError(String),

    /// Validation errors from the logger configuration struct.
    #[error("Logger configuration validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    /// The custom timestamp format could not be parsed.
    #[error("Invalid timestamp format {format:?}: {reason}")]
    TimestampFormat { format: String, reason: String },

    /// IO error, typically during journald socket operations.
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// No output layers were successfully configured.
    #[error("No logging layers were configured or successfully initialized")]
    NoLayersConfigured,

    /// Journald was requested alongside the console but could not be reached.
    #[error("Failed to initialize journald logger while console output is enabled. Please check your configuration.")]
    JournaldFailedWithConsoleEnabled,
}

/// Manages logging configuration and global subscriber initialization.
pub struct LoggerManager {
    config: LoggerConfig,
}

impl LoggerManager {
    /// Creates a new `LoggerManager` and validates the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns `LoggerError::ValidationError` if configuration validation fails.
    pub fn new(config: LoggerConfig) -> Result<Self, LoggerError> {
        config.validate()?;

        Ok(LoggerManager { config })
    }

    /// Builds the configured layers without installing them.
    ///
    /// A journald failure is fatal only when the console is enabled too, so
    /// that a misconfigured journal does not silently swallow logs.
    pub fn layers(&self) -> Result<Vec<BoxedLayer>, LoggerError> {
        let mut layers = Vec::new();

        if let Some(console) = self.config.console.as_ref().filter(|c| c.enabled) {
            let timer = LogTimer::new(&self.config.timestamp_format)?;
            layers.push(console_layer(console, timer, self.filter()));
        }

        if let Some(journald) = self.config.journald.as_ref().filter(|j| j.enabled) {
            match journald_layer(journald, self.filter()) {
                Ok(layer) => {
                    layers.push(layer);
                    print_info!(
                        "Systemd journald logger initialized with identifier: {}",
                        journald.identifier
                    );
                }
                Err(e) => {
                    print_warn!("Failed to initialize systemd journald logger: {}", e);
                    if self.config.console.as_ref().is_some_and(|c| c.enabled) {
                        return Err(LoggerError::JournaldFailedWithConsoleEnabled);
                    }
                }
            }
        }

        if layers.is_empty() {
            print_warn!("No logging layers were initialized. Please check your configuration.");
            return Err(LoggerError::NoLayersConfigured);
        }
        Ok(layers)
    }

    /// Installs the global `tracing` subscriber. Must be called once, before
    /// any collector is built, so that collector spans are recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if no layer can be built or a global subscriber is
    /// already installed.
    #[instrument(skip(self))]
    pub fn init(&self) -> Result<(), LoggerError> {
        let layers = self.layers()?;
        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .map_err(|e| LoggerError::InitializationError(e.to_string()))
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.config.level))
    }
}

/// Console timestamp in UTC, rendered per the configured `TimestampFormat`.
#[derive(Debug)]
pub enum LogTimer {
    Rfc3339,
    Unix,
    Custom(OwnedFormatItem),
}

impl LogTimer {
    pub fn new(format: &TimestampFormat) -> Result<Self, LoggerError> {
        Ok(match format {
            TimestampFormat::Rfc3339 => LogTimer::Rfc3339,
            TimestampFormat::Unix => LogTimer::Unix,
            TimestampFormat::Custom(description) => LogTimer::Custom(
                time::format_description::parse_owned::<1>(description).map_err(|e| {
                    LoggerError::TimestampFormat {
                        format: description.clone(),
                        reason: e.to_string(),
                    }
                })?,
            ),
        })
    }
}

impl FormatTime for LogTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = OffsetDateTime::now_utc();
        let formatted = match self {
            LogTimer::Rfc3339 => now.format(&Rfc3339),
            LogTimer::Unix => return write!(w, "{}", now.unix_timestamp()),
            LogTimer::Custom(format) => now.format(format),
        };
        write!(w, "{}", formatted.map_err(|_| std::fmt::Error)?)
    }
}

fn console_layer(config: &ConsoleConfig, timer: LogTimer, filter: EnvFilter) -> BoxedLayer {
    let layer = fmt::layer()
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_ids)
        .with_ansi(config.ansi_colors)
        .with_timer(timer)
        .with_writer(io::stderr);

    match config.format {
        LogFormat::Json => layer.json().with_filter(filter).boxed(),
        LogFormat::Pretty => layer.pretty().with_filter(filter).boxed(),
        LogFormat::Compact => layer.compact().with_filter(filter).boxed(),
    }
}

fn journald_layer(config: &JournaldConfig, filter: EnvFilter) -> Result<BoxedLayer, LoggerError> {
    let layer = tracing_journald::layer()?.with_syslog_identifier(config.identifier.clone());
    Ok(layer.with_filter(filter).boxed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::logger::ConsoleConfig;

    #[test]
    fn test_invalid_level_rejected() {
        let config = LoggerConfig {
            level: "chatty".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            LoggerManager::new(config),
            Err(LoggerError::ValidationError(_))
        ));
    }

    #[test]
    fn test_console_layer_built_for_each_format() {
        for format in [LogFormat::Compact, LogFormat::Pretty, LogFormat::Json] {
            let config = LoggerConfig {
                console: Some(ConsoleConfig {
                    format,
                    ..Default::default()
                }),
                journald: None,
                ..Default::default()
            };

            let layers = LoggerManager::new(config).unwrap().layers().unwrap();
            assert_eq!(layers.len(), 1);
        }
    }

    #[test]
    fn test_unix_timer_writes_epoch_seconds() {
        let timer = LogTimer::new(&TimestampFormat::Unix).unwrap();
        let mut out = String::new();
        timer.format_time(&mut Writer::new(&mut out)).unwrap();

        let seconds: i64 = out.parse().expect("integer timestamp");
        assert!((seconds - OffsetDateTime::now_utc().unix_timestamp()).abs() <= 1);
    }

    #[test]
    fn test_rfc3339_timer_round_trips() {
        let timer = LogTimer::new(&TimestampFormat::Rfc3339).unwrap();
        let mut out = String::new();
        timer.format_time(&mut Writer::new(&mut out)).unwrap();

        assert!(OffsetDateTime::parse(&out, &Rfc3339).is_ok(), "{}", out);
    }

    #[test]
    fn test_custom_timer_uses_description() {
        let timer = LogTimer::new(&TimestampFormat::Custom("[year]".to_string())).unwrap();
        let mut out = String::new();
        timer.format_time(&mut Writer::new(&mut out)).unwrap();

        assert_eq!(out, OffsetDateTime::now_utc().year().to_string());
    }

    #[test]
    fn test_invalid_custom_timestamp_format_is_error() {
        assert!(matches!(
            LogTimer::new(&TimestampFormat::Custom("[hour".to_string())),
            Err(LoggerError::TimestampFormat { .. })
        ));
    }

    #[test]
    fn test_no_layers_is_error() {
        let config = LoggerConfig {
            console: Some(ConsoleConfig {
                enabled: false,
                ..Default::default()
            }),
            journald: None,
            ..Default::default()
        };

        assert!(matches!(
            LoggerManager::new(config).unwrap().layers(),
            Err(LoggerError::NoLayersConfigured)
        ));
    }
}
