//! Scalar metrics recording
//!
//! The evaluator produces maps of scalar metrics; a [`MetricsSink`] records
//! each scalar under a prefixed key at a step counter, so successive
//! evaluation sweeps become series an external dashboard can plot. Backends
//! are pluggable: a JSONL file for persistence, an in-memory sink for tests.
//!
//! # Example
//!
//! ```
//! use equilibrar::tracking::{record_scalars, MemorySink};
//! use std::collections::BTreeMap;
//!
//! let mut sink = MemorySink::new();
//! let mut scalars = BTreeMap::new();
//! scalars.insert("mean_accuracy".to_string(), 0.8f32);
//!
//! record_scalars(&mut sink, &scalars, "val/", 3).unwrap();
//! assert_eq!(sink.series("val/mean_accuracy").unwrap().len(), 1);
//! ```

pub mod storage;

pub use storage::{JsonlBackend, MemorySink, ScalarRecord};

use std::collections::BTreeMap;

/// Errors from metrics recording.
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for metrics recording.
pub type Result<T> = std::result::Result<T, TrackingError>;

/// A sink for scalar metric streams.
pub trait MetricsSink {
    /// Record one scalar under `key` at `step`.
    fn record_scalar(&mut self, key: &str, value: f64, step: u64) -> Result<()>;
}

/// Record every entry of `scalars` under `{prefix}{key}` at `step`.
pub fn record_scalars(
    sink: &mut dyn MetricsSink,
    scalars: &BTreeMap<String, f32>,
    prefix: &str,
    step: u64,
) -> Result<()> {
    for (key, &value) in scalars {
        sink.record_scalar(&format!("{prefix}{key}"), f64::from(value), step)?;
    }
    Ok(())
}
