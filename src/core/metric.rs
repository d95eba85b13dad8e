//! Metric model shared by collectors and the executor.
//!
//! Collectors describe their values as `MetricSample`s; the executor turns
//! them into `prometheus` gauges once per cycle. Names are validated with the
//! same rules the exporter library applies, so an invalid name is rejected
//! when the sample is built instead of when it is registered.

use std::collections::HashMap;

use prometheus::{core::Desc, Gauge, Opts};

use super::collectors::{error::CollectorError, types::CollectorResult};

/// One named gauge observation for a single collection cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    fq_name: String,
    help: String,
    value: f64,
}

impl MetricSample {
    /// Builds a gauge sample named `<namespace>_<subsystem>_<name>`.
    ///
    /// Empty components are skipped when composing the name, the same way
    /// Prometheus client libraries build fully-qualified names.
    ///
    /// # Errors
    ///
    /// Returns `CollectorError::InvalidMetric` if the resulting name or help
    /// text is not accepted by the exporter.
    pub fn gauge(
        namespace: &str,
        subsystem: &str,
        name: &str,
        help: impl Into<String>,
        value: f64,
    ) -> CollectorResult<Self> {
        let help = help.into();
        let fq_name = Opts::new(name, help.as_str())
            .namespace(namespace)
            .subsystem(subsystem)
            .fq_name();

        Desc::new(fq_name.clone(), help.clone(), Vec::new(), HashMap::new()).map_err(|e| {
            CollectorError::InvalidMetric {
                name: if fq_name.is_empty() {
                    name.to_string()
                } else {
                    fq_name.clone()
                },
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            fq_name,
            help,
            value,
        })
    }

    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Materializes the sample as a label-less `prometheus::Gauge`.
    pub fn to_gauge(&self) -> prometheus::Result<Gauge> {
        let gauge = Gauge::with_opts(Opts::new(self.fq_name.as_str(), self.help.as_str()))?;
        gauge.set(self.value);
        Ok(gauge)
    }
}

#[cfg(test)]
mod tests {
    use prometheus::{core::Collector, Encoder, TextEncoder};

    use super::*;

    #[test]
    fn test_gauge_composes_fully_qualified_name() {
        let sample = MetricSample::gauge("node", "custom_script", "cpu_temp", "help", 42.0)
            .expect("valid sample");

        assert_eq!(sample.fq_name(), "node_custom_script_cpu_temp");
        assert_eq!(sample.help(), "help");
        assert_eq!(sample.value(), 42.0);
    }

    #[test]
    fn test_gauge_without_namespace() {
        let sample =
            MetricSample::gauge("", "custom_script", "load", "help", 1.0).expect("valid sample");
        assert_eq!(sample.fq_name(), "custom_script_load");
    }

    #[test]
    fn test_gauge_rejects_invalid_name() {
        let result = MetricSample::gauge("node", "custom_script", "disk-usage", "help", 1.0);
        match result {
            Err(CollectorError::InvalidMetric { name, .. }) => {
                assert_eq!(name, "node_custom_script_disk-usage");
            }
            other => panic!("expected InvalidMetric, got {:?}", other),
        }
    }

    #[test]
    fn test_gauge_rejects_empty_name() {
        let result = MetricSample::gauge("node", "custom_script", "", "help", 1.0);
        assert!(matches!(result, Err(CollectorError::InvalidMetric { .. })));
    }

    #[test]
    fn test_to_gauge_carries_value_and_help() {
        let sample = MetricSample::gauge("node", "custom_script", "queue_depth", "depth", 7.5)
            .expect("valid sample");
        let gauge = sample.to_gauge().expect("gauge");

        let families = gauge.collect();
        assert_eq!(families.len(), 1);
        assert_eq!(gauge.get(), 7.5);

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buffer)
            .expect("encode");
        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.contains("# HELP node_custom_script_queue_depth depth"));
        assert!(text.contains("# TYPE node_custom_script_queue_depth gauge"));
        assert!(text.contains("node_custom_script_queue_depth 7.5"));
    }
}
