//! Custom script collector.
//!
//! Every entry directly inside the configured directory is made executable,
//! run through `bash -c`, and expected to print a single `key=value` line.
//! The values of one cycle are gathered into a `CustomScriptBuffer` and
//! exported as gauges named `<namespace>_custom_script_<key>`.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    process::Stdio,
};

use serde::Serialize;
use tokio::process::Command;
use tracing::{debug, error, Instrument, Span};

use super::{
    error::CollectorError,
    traits::{DataProducer, FromConfig, IntoSamples},
    types::CollectorResult,
};
use crate::{config::metrics::MetricsConfig, core::metric::MetricSample, register_collector};

/// Registry name of the collector, also used as the metric subsystem.
pub const SUBSYSTEM: &str = "custom_script";

/// Values gathered during one collection cycle, keyed by metric name.
///
/// Keys are unique; inserting an existing key replaces its value, so the
/// script processed last wins. Iteration is in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomScriptBuffer {
    values: BTreeMap<String, f64>,
}

impl CustomScriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `name`, returning the value it replaced.
    pub fn insert(&mut self, name: String, value: f64) -> Option<f64> {
        self.values.insert(name, value)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl IntoSamples for CustomScriptBuffer {
    fn into_samples(self, namespace: &str) -> CollectorResult<Vec<MetricSample>> {
        self.values
            .into_iter()
            .map(|(name, value)| {
                let help = format!("CustomScript information field {}.", name);
                MetricSample::gauge(namespace, SUBSYSTEM, &name, help, value)
            })
            .collect()
    }
}

/// Parses one script's output into a metric name and value.
///
/// The output is split on the first `=`. Whitespace in the key becomes `_`;
/// trailing line terminators are stripped from the value, which must then be
/// a finite `f64`.
///
/// # Errors
///
/// * `CollectorError::MalformedOutput` if there is no `=` or the key is empty.
/// * `CollectorError::InvalidValue` if the value is not a finite number.
pub fn parse_output(script: &Path, raw: &str) -> CollectorResult<(String, f64)> {
    let malformed = || CollectorError::MalformedOutput {
        script: script.display().to_string(),
        raw: raw.to_string(),
    };

    let (key, value) = raw.split_once('=').ok_or_else(malformed)?;

    let name: String = key
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    if name.is_empty() {
        return Err(malformed());
    }

    let value = value.trim_end_matches(|c: char| c == '\n' || c == '\r');
    let invalid = |reason: String| CollectorError::InvalidValue {
        script: script.display().to_string(),
        value: value.to_string(),
        reason,
    };

    let parsed = value.parse::<f64>().map_err(|e| invalid(e.to_string()))?;
    if !parsed.is_finite() {
        return Err(invalid("value is not finite".to_string()));
    }

    Ok((name, parsed))
}

/// Lists every entry directly inside `dir`, sorted by path.
async fn discover(dir: &Path) -> CollectorResult<Vec<PathBuf>> {
    let discovery_error = |source: std::io::Error| CollectorError::Discovery {
        path: dir.display().to_string(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(discovery_error)?;
    let mut scripts = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(discovery_error)? {
        scripts.push(entry.path());
    }
    scripts.sort();

    Ok(scripts)
}

/// Sets the script's mode to `0755`.
#[cfg(unix)]
async fn make_executable(script: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(script, std::fs::Permissions::from_mode(0o755)).await
}

#[cfg(not(unix))]
async fn make_executable(_script: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "permission bits are only supported on unix",
    ))
}

/// Runs `bash -c <script>` and returns its standard output.
///
/// Standard error is discarded and standard input is empty.
async fn run_script(script: &Path) -> CollectorResult<String> {
    let command = format!("bash -c {}", script.display());

    let output = Command::new("bash")
        .arg("-c")
        .arg(script)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|source| CollectorError::CommandExecution {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(CollectorError::CommandStatus {
            command,
            status: output.status.to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Collector that executes the scripts of one directory on every cycle.
///
/// Scripts run one at a time in path order. A script that fails to run,
/// exits unsuccessfully or prints nothing is logged and skipped; unreadable
/// directories and malformed output fail the whole cycle.
#[derive(Debug, Clone)]
pub struct CustomScriptCollector {
    script_path: PathBuf,
    span: Span,
}

impl CustomScriptCollector {
    pub fn new(script_path: impl Into<PathBuf>) -> Self {
        let script_path = script_path.into();
        let span = tracing::info_span!(
            "collector",
            name = SUBSYSTEM,
            path = %script_path.display()
        );
        Self { script_path, span }
    }

    /// Records this collector's events inside `span` instead of its default one.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    async fn collect(&self) -> CollectorResult<CustomScriptBuffer> {
        let scripts = discover(&self.script_path).await?;
        debug!(
            path = %self.script_path.display(),
            count = scripts.len(),
            "get custom script"
        );

        let mut buffer = CustomScriptBuffer::new();
        for script in &scripts {
            if let Err(e) = make_executable(script).await {
                error!(script = %script.display(), error = %e, "chmod +x failed");
            }

            let result = match run_script(script).await {
                Ok(result) if !result.is_empty() => result,
                Ok(_) => {
                    error!(script = %script.display(), "exec script failed: empty output");
                    continue;
                }
                Err(e) => {
                    error!(script = %script.display(), error = %e, "exec script failed");
                    continue;
                }
            };
            debug!(script = %script.display(), "exec custom script");

            let (name, value) = parse_output(script, &result).map_err(|e| {
                error!(script = %script.display(), error = %e, "parse script output failed");
                e
            })?;
            debug!(key = %name, value, "script field");

            buffer.insert(name, value);
        }

        Ok(buffer)
    }
}

impl FromConfig for CustomScriptCollector {
    fn from_config(config: &MetricsConfig) -> Self {
        CustomScriptCollector::new(&config.custom_script.script_path)
    }
}

#[async_trait::async_trait]
impl DataProducer for CustomScriptCollector {
    type Output = CustomScriptBuffer;

    async fn produce(&self) -> CollectorResult<Self::Output> {
        self.collect().instrument(self.span.clone()).await
    }
}

register_collector!(CustomScriptCollector, SUBSYSTEM, false);
