//! Configuration structures for metrics collection.
//!
//! This module defines which collectors run, how often a collection cycle is
//! triggered, the namespace every metric name is prefixed with, and the
//! settings of the custom script collector.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Default directory scanned by the custom script collector.
pub const DEFAULT_SCRIPT_PATH: &str = "/opt/prometheus/customScript";

/// Default metric namespace, shared with node-level exporters.
pub const DEFAULT_NAMESPACE: &str = "node";

/// Selection of collectors and collection timing.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CollectorsConfig {
    /// Collectors to run in addition to those enabled by default.
    pub enabled: Vec<String>,

    /// Collectors that must not run, even if enabled by default or listed in `enabled`.
    pub disabled: Vec<String>,

    /// Interval (in seconds) between two collection cycles.
    ///
    /// Must be at least 1 second.
    #[validate(range(min = 1, message = "Collection interval must be at least 1 second"))]
    pub collection_interval: u64,
}

impl Default for CollectorsConfig {
    fn default() -> Self {
        Self {
            enabled: Vec::new(),
            disabled: Vec::new(),
            collection_interval: 15,
        }
    }
}

/// Settings of the `custom_script` collector.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CustomScriptConfig {
    /// Directory whose direct entries are executed as metric scripts.
    #[validate(length(min = 1, message = "Script path must not be empty"))]
    pub script_path: String,
}

impl Default for CustomScriptConfig {
    fn default() -> Self {
        Self {
            script_path: DEFAULT_SCRIPT_PATH.to_string(),
        }
    }
}

/// Top-level metrics configuration container.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prefix of every exported metric name.
    #[validate(custom(function = "validate_namespace"))]
    pub namespace: String,

    /// Configuration for collectors and their execution schedule.
    #[validate(nested)]
    pub collectors: CollectorsConfig,

    /// Custom script collector settings.
    #[validate(nested)]
    pub custom_script: CustomScriptConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            collectors: CollectorsConfig::default(),
            custom_script: CustomScriptConfig::default(),
        }
    }
}

/// Validates that the namespace is usable as a metric name prefix.
fn validate_namespace(namespace: &str) -> Result<(), ValidationError> {
    let mut chars = namespace.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_namespace");
        err.message = Some(format!("Invalid metric namespace: {:?}", namespace).into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MetricsConfig::default();

        assert_eq!(config.namespace, "node");
        assert_eq!(config.custom_script.script_path, "/opt/prometheus/customScript");
        assert!(config.collectors.enabled.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_namespace_validation() {
        assert!(validate_namespace("node").is_ok());
        assert!(validate_namespace("_private_1").is_ok());
        assert!(validate_namespace("").is_err());
        assert!(validate_namespace("1node").is_err());
        assert!(validate_namespace("node-exporter").is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = MetricsConfig::default();
        config.collectors.collection_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_script_path_rejected() {
        let mut config = MetricsConfig::default();
        config.custom_script.script_path = String::new();
        assert!(config.validate().is_err());
    }
}
