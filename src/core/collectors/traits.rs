use super::types::CollectorResult;
use crate::{config::metrics::MetricsConfig, core::metric::MetricSample};

/// A core trait that every data collector must implement.
///
/// `DataProducer` defines the contract for any component that gathers
/// telemetry for one collection cycle. It is designed to be object-safe when
/// wrapped (see `DynCollector`), thread-safe, and usable across async boundaries.
#[async_trait::async_trait]
pub trait DataProducer: Send + Sync + 'static {
    /// The type of data this producer returns for one cycle.
    type Output: IntoSamples + Send + Sync + 'static;

    /// Asynchronously collects and returns the data for this cycle.
    ///
    /// Any error that makes the cycle meaningless should be returned as a
    /// `CollectorError`; recoverable per-item failures are logged and skipped
    /// by the implementation itself.
    async fn produce(&self) -> CollectorResult<Self::Output>;
}

/// Converts a collector's output into samples of the metric model.
pub trait IntoSamples {
    /// Builds one sample per value, fully qualified under `namespace`.
    ///
    /// Fails when any value cannot be expressed as a valid metric; the caller
    /// then drops the whole batch.
    fn into_samples(self, namespace: &str) -> CollectorResult<Vec<MetricSample>>;
}

/// Builds a collector from the metrics configuration at registration time.
pub trait FromConfig {
    fn from_config(config: &MetricsConfig) -> Self;
}
