//! Destinations for the metric families gathered in one collection cycle.
//!
//! `StdoutPublisher` prints the Prometheus text exposition format, and
//! `PushGatewayPublisher` pushes to a Prometheus Pushgateway.

use std::sync::Arc;

use prometheus::{labels, proto::MetricFamily, Encoder, TextEncoder};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::config::publisher::{PublisherConfig, PublisherKind};

/// Errors raised while publishing a cycle's metrics.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Metric families could not be encoded.
    #[error("Failed to encode metrics: {0}")]
    Encode(#[source] prometheus::Error),

    /// Writing the encoded metrics failed.
    #[error("Failed to write metrics: {0}")]
    Io(#[from] std::io::Error),

    /// The Pushgateway rejected or could not receive the push.
    #[error("Failed to push metrics to {address}: {source}")]
    Push {
        address: String,
        #[source]
        source: prometheus::Error,
    },

    /// The blocking push task panicked or was cancelled.
    #[error("Push task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Trait for publishers that send a cycle's metrics to an external system.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, families: &[MetricFamily]) -> Result<(), PublishError>;
}

/// Encodes `families` in the Prometheus text exposition format.
pub fn render_text(families: &[MetricFamily]) -> Result<String, PublishError> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(families, &mut buffer)
        .map_err(PublishError::Encode)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes every cycle to standard output.
#[derive(Debug, Default)]
pub struct StdoutPublisher;

#[async_trait::async_trait]
impl Publisher for StdoutPublisher {
    async fn publish(&self, families: &[MetricFamily]) -> Result<(), PublishError> {
        let text = render_text(families)?;
        let mut stdout = tokio::io::stdout();
        stdout.write_all(text.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// Pushes every cycle to a Prometheus Pushgateway, replacing the previous
/// push of the same job and instance.
#[derive(Debug, Clone)]
pub struct PushGatewayPublisher {
    address: String,
    job: String,
    instance: String,
}

impl PushGatewayPublisher {
    pub fn new(
        address: impl Into<String>,
        job: impl Into<String>,
        instance: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            job: job.into(),
            instance: instance.into(),
        }
    }
}

#[async_trait::async_trait]
impl Publisher for PushGatewayPublisher {
    async fn publish(&self, families: &[MetricFamily]) -> Result<(), PublishError> {
        let families = families.to_vec();
        let this = self.clone();

        // The push client is blocking.
        let result = tokio::task::spawn_blocking(move || {
            prometheus::push_metrics(
                &this.job,
                labels! {
                    "instance".to_owned() => this.instance.clone(),
                },
                &this.address,
                families,
                None,
            )
        })
        .await?;

        result.map_err(|source| PublishError::Push {
            address: self.address.clone(),
            source,
        })?;

        debug!("Pushed metrics to {}", self.address);
        Ok(())
    }
}

/// Builds the publisher selected by `config`.
pub fn from_config(config: &PublisherConfig) -> Arc<dyn Publisher> {
    match config.kind {
        PublisherKind::Stdout => Arc::new(StdoutPublisher),
        PublisherKind::Pushgateway => Arc::new(PushGatewayPublisher::new(
            config.address.clone(),
            config.job.clone(),
            config.instance.clone(),
        )),
    }
}
