//! Metrics sink backends
//!
//! A JSONL file backend for persistence and an in-memory sink for tests.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{MetricsSink, Result};

/// One recorded scalar, as serialized by [`JsonlBackend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarRecord {
    /// Prefixed metric key.
    pub key: String,
    /// Scalar value.
    pub value: f64,
    /// Step counter the value was recorded at.
    pub step: u64,
}

/// Appends one JSON line per scalar to a file.
///
/// The file is opened in append mode so successive runs extend the same
/// stream. Records are buffered; call [`flush`](Self::flush) to force them
/// out, or rely on drop.
#[derive(Debug)]
pub struct JsonlBackend {
    writer: BufWriter<File>,
}

impl JsonlBackend {
    /// Open (creating if missing) the JSONL file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Flush buffered records to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl MetricsSink for JsonlBackend {
    fn record_scalar(&mut self, key: &str, value: f64, step: u64) -> Result<()> {
        let record = ScalarRecord {
            key: key.to_string(),
            value,
            step,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl Drop for JsonlBackend {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// In-memory sink: one `(value, step)` series per key.
#[derive(Debug, Default)]
pub struct MemorySink {
    series: HashMap<String, Vec<(f64, u64)>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded series for `key`, if any.
    #[must_use]
    pub fn series(&self, key: &str) -> Option<&[(f64, u64)]> {
        self.series.get(key).map(Vec::as_slice)
    }

    /// Recorded keys, in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Number of distinct keys recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl MetricsSink for MemorySink {
    fn record_scalar(&mut self, key: &str, value: f64, step: u64) -> Result<()> {
        self.series
            .entry(key.to_string())
            .or_default()
            .push((value, step));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_jsonl_backend_writes_one_record_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");

        let mut backend = JsonlBackend::new(&path).unwrap();
        backend.record_scalar("val/mean_accuracy", 0.8, 1).unwrap();
        backend.record_scalar("val/worst_accuracy", 0.6, 1).unwrap();
        backend.flush().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let records: Vec<ScalarRecord> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key, "val/mean_accuracy");
        assert_eq!(records[0].value, 0.8);
        assert_eq!(records[1].step, 1);
    }

    #[test]
    fn test_jsonl_backend_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");

        {
            let mut backend = JsonlBackend::new(&path).unwrap();
            backend.record_scalar("loss", 1.0, 1).unwrap();
        }
        {
            let mut backend = JsonlBackend::new(&path).unwrap();
            backend.record_scalar("loss", 0.5, 2).unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
    }

    #[test]
    fn test_memory_sink_accumulates_per_key() {
        let mut sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.record_scalar("a", 1.0, 1).unwrap();
        sink.record_scalar("a", 2.0, 2).unwrap();
        sink.record_scalar("b", 3.0, 1).unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.series("a"), Some(&[(1.0, 1), (2.0, 2)][..]));
        assert_eq!(sink.series("b"), Some(&[(3.0, 1)][..]));
        assert_eq!(sink.series("c"), None);
    }
}
