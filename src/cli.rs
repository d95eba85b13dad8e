//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::logger::validate_log_level;

/// Runs the scripts of a directory and exposes their `key=value` output as gauges.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "scriptbee", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $SCRIPTBEE_CONFIG, then /etc/scriptbee/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory whose scripts are executed by the custom_script collector
    #[arg(long, value_name = "DIR")]
    pub script_path: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, value_name = "LEVEL", value_parser = validate_log_level_arg)]
    pub log_level: Option<String>,

    /// Enable a collector that is disabled by default (repeatable)
    #[arg(long = "enable-collector", value_name = "NAME")]
    pub enable_collector: Vec<String>,

    /// Run a single collection cycle, publish it and exit
    #[arg(long)]
    pub once: bool,
}

fn validate_log_level_arg(level: &str) -> Result<String, String> {
    validate_log_level(level)
        .map(|_| level.to_lowercase())
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["scriptbee"]);

        assert!(cli.config.is_none());
        assert!(cli.script_path.is_none());
        assert!(cli.enable_collector.is_empty());
        assert!(!cli.once);
    }

    #[test]
    fn test_repeated_collectors() {
        let cli = Cli::parse_from([
            "scriptbee",
            "--enable-collector",
            "custom_script",
            "--enable-collector",
            "other",
            "--once",
        ]);

        assert_eq!(cli.enable_collector, vec!["custom_script", "other"]);
        assert!(cli.once);
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(Cli::try_parse_from(["scriptbee", "--log-level", "loud"]).is_err());
    }
}
