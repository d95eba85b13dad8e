use std::{collections::HashMap, sync::Arc};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, warn};

use super::{
    error::CollectorError,
    traits::{DataProducer, IntoSamples},
    types::CollectorResult,
};
use crate::{
    config::metrics::{CollectorsConfig, MetricsConfig},
    core::metric::MetricSample,
};

/// A trait object that all collectors must implement.
/// It allows us to store different collector types uniformly in the registry
/// while still being able to call them dynamically at runtime.
#[async_trait::async_trait]
pub trait DynCollector: Send + Sync {
    /// Returns a static string identifying the collector.
    /// This name is used when registering and looking up collectors.
    fn name(&self) -> &'static str;

    /// Runs one collection cycle and sends the resulting samples to `sink`.
    ///
    /// Returns an error only when the cycle could not complete. Samples that
    /// cannot be expressed in the metric model are logged and dropped, and the
    /// cycle then counts as a successful no-op.
    async fn update(
        &self,
        namespace: &str,
        sink: &UnboundedSender<MetricSample>,
    ) -> CollectorResult<()>;
}

/// A small wrapper that turns any concrete type implementing `DataProducer`
/// into a type that satisfies the `DynCollector` trait object requirements.
pub struct DynWrapper<T> {
    inner: T,
    name: &'static str,
}

impl<T> DynWrapper<T> {
    /// Creates a new wrapper around a concrete collector instance.
    pub fn new(name: &'static str, inner: T) -> Self {
        Self { name, inner }
    }
}

#[async_trait::async_trait]
impl<T> DynCollector for DynWrapper<T>
where
    T: DataProducer + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    async fn update(
        &self,
        namespace: &str,
        sink: &UnboundedSender<MetricSample>,
    ) -> CollectorResult<()> {
        let output = self.inner.produce().await?;

        // Emission boundary: a batch with any unrepresentable value is dropped whole.
        let samples = match output.into_samples(namespace) {
            Ok(samples) => samples,
            Err(e) => {
                error!(
                    collector = self.name,
                    error = %e,
                    "unsupported collector output, nothing emitted this cycle"
                );
                return Ok(());
            }
        };

        for sample in samples {
            if sink.send(sample).is_err() {
                warn!(collector = self.name, "sample sink closed, stopping emission");
                break;
            }
        }
        Ok(())
    }
}

/// Metadata for a single collector that will be submitted to the global inventory.
/// Each collector provides a name, whether it runs without being asked for,
/// and a factory that builds it from the metrics configuration.
pub struct CollectorMeta {
    pub name: &'static str,
    pub default_enabled: bool,
    pub factory: fn(&MetricsConfig) -> Arc<dyn DynCollector>,
}

// Tell the `inventory` crate to collect all submitted `CollectorMeta` values.
inventory::collect!(CollectorMeta);

struct Registered {
    collector: Arc<dyn DynCollector>,
    default_enabled: bool,
}

/// The registry that holds all instantiated collectors.
/// It is built once at startup from the configuration and then shared.
pub struct CollectorRegistry {
    collectors: HashMap<&'static str, Registered>,
}

impl CollectorRegistry {
    /// Constructs a registry by iterating over all submitted `CollectorMeta`
    /// entries (via the `inventory` crate) and instantiating each collector
    /// with `config`.
    pub fn new(config: &MetricsConfig) -> Self {
        let mut registry = Self::empty();

        for meta in inventory::iter::<CollectorMeta> {
            registry.insert((meta.factory)(config), meta.default_enabled);
        }

        registry
    }

    /// A registry without any collectors.
    pub fn empty() -> Self {
        CollectorRegistry {
            collectors: HashMap::new(),
        }
    }

    /// Adds a collector under its own name, replacing any previous one.
    pub fn insert(&mut self, collector: Arc<dyn DynCollector>, default_enabled: bool) {
        self.collectors.insert(
            collector.name(),
            Registered {
                collector,
                default_enabled,
            },
        );
    }

    /// Retrieves a collector by name. Returns an error if no collector with that name exists.
    pub fn get(&self, name: &str) -> CollectorResult<Arc<dyn DynCollector>> {
        self.collectors
            .get(name)
            .map(|r| r.collector.clone())
            .ok_or_else(|| CollectorError::CollectorNotFound(name.to_string()))
    }

    /// Returns all registered collector names, sorted.
    pub fn list_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.collectors.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Checks whether a collector with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.collectors.contains_key(name)
    }

    /// Whether the named collector runs under `config`.
    ///
    /// An explicit `disabled` entry wins over an explicit `enabled` one;
    /// otherwise the collector's registration default applies. Unknown
    /// names are never enabled.
    pub fn is_enabled(&self, name: &str, config: &CollectorsConfig) -> bool {
        let Some(registered) = self.collectors.get(name) else {
            return false;
        };

        if config.disabled.iter().any(|n| n == name) {
            return false;
        }
        if config.enabled.iter().any(|n| n == name) {
            return true;
        }
        registered.default_enabled
    }

    /// Collectors that run under `config`, sorted by name.
    pub fn enabled_collectors(&self, config: &CollectorsConfig) -> Vec<Arc<dyn DynCollector>> {
        self.list_names()
            .into_iter()
            .filter(|name| self.is_enabled(name, config))
            .filter_map(|name| self.collectors.get(name).map(|r| r.collector.clone()))
            .collect()
    }

    /// Number of registered collectors.
    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    /// True if no collectors are registered.
    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}

impl Default for CollectorRegistry {
    fn default() -> Self {
        Self::new(&MetricsConfig::default())
    }
}

/// Macro used by collector implementations to register themselves
/// with the global inventory at compile time.
///
/// The collector type must implement `FromConfig`; the third argument says
/// whether it runs without being listed in `metrics.collectors.enabled`.
#[macro_export]
macro_rules! register_collector {
    ($collector_type:ty, $name:expr, $default_enabled:expr) => {
        inventory::submit! {
            $crate::core::collectors::registry::CollectorMeta {
                name: $name,
                default_enabled: $default_enabled,
                factory: |config| {
                    std::sync::Arc::new(
                        $crate::core::collectors::registry::DynWrapper::new(
                            $name,
                            <$collector_type as $crate::core::collectors::traits::FromConfig>::from_config(config),
                        )
                    )
                },
            }
        }
    };
}
