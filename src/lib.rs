//! scriptbee: runs custom shell scripts and exports their output as metrics
//!
//! Every executable directly inside a configured directory is run once per
//! collection cycle. Each script prints one `key=value` line; the values are
//! exposed as Prometheus gauges named `<namespace>_custom_script_<key>`.
//!
//! ## Modules
//!
//! * `cli`: Command-line flags, parsed with `clap`.
//!
//! * `config`: Configuration structures, loading, validation, and defaults.
//!   Supports TOML configuration files with validation via the `validator` crate.
//!
//! * `core`: Core runtime components:
//!   - Collector registry, traits, and the custom script collector
//!   - Metric model
//!   - Collection executor
//!   - Publishers (stdout, Pushgateway)
//!
//! * `logger`: Centralized logging initialization using `tracing`.
//!   Supports console output in multiple formats (compact, pretty, JSON)
//!   and optional systemd journald integration.
//!
//! ## Features
//!
//! * `collector-custom-script`: Builds the `custom_script` collector (default: enabled).

pub mod cli;
pub mod config;
pub mod core;
pub mod logger;
