use super::error::CollectorError;

/// A convenient type alias for results returned by collectors.
///
/// Every fallible step of a collection cycle (listing scripts, running them,
/// parsing their output, building metric samples) reports a `CollectorError`.
pub type CollectorResult<T> = std::result::Result<T, CollectorError>;
