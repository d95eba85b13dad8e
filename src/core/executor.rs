//! Metrics collection and publishing executor.
//!
//! The `Executor` runs every enabled collector once per cycle, turns the
//! samples they emit into a fresh `prometheus::Registry`, and hands the
//! gathered metric families to the configured publisher.

use std::sync::Arc;

use prometheus::{proto::MetricFamily, Registry};
use tokio::{
    sync::mpsc,
    time::{sleep, Duration, Instant},
};
use tracing::{debug, error, info, warn, Instrument};

use super::{
    collectors::registry::CollectorRegistry,
    metric::MetricSample,
    publisher::{PublishError, Publisher},
};
use crate::config::metrics::MetricsConfig;

/// Executor that manages periodic collection and publishing of metrics.
pub struct Executor {
    registry: Arc<CollectorRegistry>,
    publisher: Arc<dyn Publisher>,
    config: Arc<MetricsConfig>,
}

impl Executor {
    /// Creates a new Executor instance.
    ///
    /// # Arguments
    /// * `registry` - Instantiated collectors
    /// * `publisher` - Destination of each cycle's metrics
    /// * `config` - Metrics configuration
    pub fn new(
        registry: Arc<CollectorRegistry>,
        publisher: Arc<dyn Publisher>,
        config: Arc<MetricsConfig>,
    ) -> Self {
        Self {
            registry,
            publisher,
            config,
        }
    }

    /// Runs one collection cycle and returns the gathered metric families.
    ///
    /// Each enabled collector runs in its own task. A collector that fails
    /// or panics contributes nothing to this cycle; the others are unaffected.
    pub async fn collect_once(&self) -> Vec<MetricFamily> {
        let collectors = self.registry.enabled_collectors(&self.config.collectors);
        let (tx, mut rx) = mpsc::unbounded_channel::<MetricSample>();

        let tasks: Vec<_> = collectors
            .into_iter()
            .map(|collector| {
                let tx = tx.clone();
                let namespace = self.config.namespace.clone();
                tokio::spawn(async move {
                    let name = collector.name();
                    match collector.update(&namespace, &tx).await {
                        Ok(()) => debug!("Collected data from '{}'", name),
                        Err(e) => error!("Failed to collect from '{}': {}", name, e),
                    }
                }
                .in_current_span())
            })
            .collect();
        drop(tx);

        // Wait for all collection tasks to complete
        for task in tasks {
            if let Err(e) = task.await {
                error!("Collector task failed: {}", e);
            }
        }

        let registry = Registry::new();
        while let Some(sample) = rx.recv().await {
            let registered = sample
                .to_gauge()
                .and_then(|gauge| registry.register(Box::new(gauge)));
            if let Err(e) = registered {
                warn!("Skipping metric '{}': {}", sample.fq_name(), e);
            }
        }

        registry.gather()
    }

    /// Runs one collection cycle and publishes it.
    pub async fn run_once(&self) -> Result<(), PublishError> {
        let families = self.collect_once().await;
        debug!("Publishing {} metric families", families.len());
        self.publisher.publish(&families).await
    }

    /// Runs the executor loop indefinitely, one cycle per collection interval.
    pub async fn run(self) {
        let interval = Duration::from_secs(self.config.collectors.collection_interval);
        info!(
            "Metrics collection started (interval: {}s)",
            self.config.collectors.collection_interval
        );

        loop {
            let start = Instant::now();

            if let Err(e) = self.run_once().await {
                error!("Publish failed: {}", e);
            }

            let elapsed = start.elapsed();
            if elapsed < interval {
                sleep(interval - elapsed).await;
            } else {
                warn!(
                    "Collection cycle took {:?}, longer than the {:?} interval",
                    elapsed, interval
                );
            }
        }
    }
}
