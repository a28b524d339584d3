//! Per-subgroup evaluation of a classifier over a grouped data source
//!
//! The sweep runs a model over every batch of a [`GroupedDataSource`],
//! accumulates top-1 accuracy per subgroup, and reports per-group, mean, and
//! worst-group accuracy. Batches carry a class label, a packed group index,
//! and a secondary (place) label per sample.

mod evaluator;
mod loader;

pub use evaluator::{evaluate, evaluate_multitask};
pub use loader::{GroupedBatch, GroupedDataSource, InMemoryLoader, LoaderConfig};
