//! Configuration of the destination collected metrics are published to.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Where each cycle's metrics go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublisherKind {
    /// Prometheus text exposition format on standard output.
    Stdout,
    /// A Prometheus Pushgateway.
    Pushgateway,
}

impl Default for PublisherKind {
    fn default() -> Self {
        PublisherKind::Stdout
    }
}

/// Publisher configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_publisher"))]
pub struct PublisherConfig {
    pub kind: PublisherKind,

    /// Pushgateway base address, e.g. `http://localhost:9091`.
    pub address: String,

    /// Job name used for the push grouping key.
    #[validate(length(min = 1, message = "Job name must not be empty"))]
    pub job: String,

    /// Value of the `instance` grouping label.
    #[validate(length(min = 1, message = "Instance name must not be empty"))]
    pub instance: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            kind: PublisherKind::default(),
            address: "http://localhost:9091".to_string(),
            job: "scriptbee".to_string(),
            instance: "scriptbee".to_string(),
        }
    }
}

fn validate_publisher(config: &PublisherConfig) -> Result<(), ValidationError> {
    if config.kind == PublisherKind::Pushgateway && config.address.trim().is_empty() {
        let mut err = ValidationError::new("missing_address");
        err.message = Some("Pushgateway publisher requires an address".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_stdout() {
        let config = PublisherConfig::default();
        assert_eq!(config.kind, PublisherKind::Stdout);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pushgateway_requires_address() {
        let config = PublisherConfig {
            kind: PublisherKind::Pushgateway,
            address: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_kind_deserializes_lowercase() {
        let config: PublisherConfig = toml::from_str(
            r#"
                kind = "pushgateway"
                address = "http://gateway:9091"
            "#,
        )
        .unwrap();

        assert_eq!(config.kind, PublisherKind::Pushgateway);
        assert_eq!(config.job, "scriptbee");
    }
}
