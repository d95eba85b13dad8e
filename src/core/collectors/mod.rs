/// Custom script collector module.
/// Runs the scripts of a directory and exports their `key=value` output as gauges.
///
/// Available when the `collector-custom-script` feature is enabled (default).
#[cfg(feature = "collector-custom-script")]
pub mod custom_script;

/// Error types and handling utilities.
/// Common error types used across all collectors.
pub mod error;

/// Collector registry and management module.
/// Central registry for instantiating, selecting, and running collectors.
pub mod registry;

/// Core traits and interfaces.
/// Defines the common interfaces for all collectors and data producers.
pub mod traits;

/// Common types and result definitions.
pub mod types;

// ----------------------------------------------------------------------------
// Re-exports for public API
// ----------------------------------------------------------------------------

/// Custom script collector types and implementations.
#[cfg(feature = "collector-custom-script")]
pub use custom_script::{parse_output, CustomScriptBuffer, CustomScriptCollector};
/// Collector error type.
pub use error::CollectorError;
/// Collector registry for managing all available collectors.
pub use registry::{CollectorRegistry, DynCollector};
/// Core traits for data producers and collectors.
pub use traits::{DataProducer, FromConfig, IntoSamples};
/// Common result type for collector operations.
pub use types::CollectorResult;
