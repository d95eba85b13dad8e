use thiserror::Error;

/// Custom error type for the collector system.
/// Uses `thiserror` for clean, automatic derivation of `Debug`, `Display`, and `Error`
/// traits, with context-rich error messages.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// The script directory could not be listed.
    /// Fatal for the whole collection cycle.
    #[error("Failed to list script directory {path}")]
    Discovery {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A script produced output that is not a `key=value` line,
    /// or whose key is empty after normalization.
    #[error("Malformed output from script {script}: {raw:?}")]
    MalformedOutput { script: String, raw: String },

    /// The value part of a script's output is not a finite floating-point number.
    #[error("Invalid value {value:?} from script {script}: {reason}")]
    InvalidValue {
        script: String,
        value: String,
        reason: String,
    },

    /// A metric could not be represented in the exporter's data model
    /// (for example, a name containing characters Prometheus rejects).
    #[error("Invalid metric {name}: {reason}")]
    InvalidMetric { name: String, reason: String },

    /// An error occurred while spawning or waiting for a command.
    /// Includes the command that was run and the error message.
    #[error("Command '{command}' failed: {source}")]
    CommandExecution {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran but exited unsuccessfully.
    #[error("Command '{command}' exited with {status}")]
    CommandStatus { command: String, status: String },

    /// Tried to access a collector by name, but it was not registered.
    #[error("Collector not found for: {0}")]
    CollectorNotFound(String),
}
