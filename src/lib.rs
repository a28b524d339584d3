//! Weight-balancing constraints and group-robust evaluation for classifiers
//!
//! `equilibrar` provides the pieces a training loop needs when optimizing for
//! worst-group accuracy: a max-norm projection applied after each optimizer
//! step, tau-normalization of a trained classifier head, running-average
//! meters, a per-subgroup evaluator, a tee logger, and pluggable metrics
//! sinks.
//!
//! ## Architecture
//!
//! - `constraint`: max-norm projection and tau-normalization over a
//!   caller-supplied set of parameter tensors
//! - `head`: linear and multi-task classifier heads plus the model traits
//!   the evaluator relies on
//! - `metrics`: running-average meters, the group index codec, per-group
//!   accuracy aggregation
//! - `eval`: the evaluation sweep over a grouped data source
//! - `logging`: console + file tee logger
//! - `tracking`: scalar metrics sinks (JSONL file, in-memory)
//!
//! # Example
//!
//! ```
//! use equilibrar::{decode_group, evaluate, InMemoryLoader, LinearHead, LoaderConfig, MaxNorm};
//!
//! let config = LoaderConfig::default();
//! let data = InMemoryLoader::synthetic(&config);
//! let mut head = LinearHead::new(config.n_features(), config.n_classes(), 42);
//!
//! // After each optimizer step: clip oversized classifier units.
//! let mut max_norm = MaxNorm::default();
//! max_norm.project(&mut head);
//!
//! // Evaluation phase: per-group accuracy, mean, and worst group.
//! let n_places = config.n_places();
//! let results = evaluate(&mut head, &data, |g| decode_group(g, n_places), false);
//! assert!(results.mean_accuracy >= 0.0);
//! ```

pub mod constraint;
pub mod eval;
pub mod head;
pub mod logging;
pub mod metrics;
pub mod tracking;

pub use constraint::{ConstraintTarget, MaxNorm, TauNorm};
pub use eval::{
    evaluate, evaluate_multitask, GroupedBatch, GroupedDataSource, InMemoryLoader, LoaderConfig,
};
pub use head::{Classifier, LinearHead, MultiTaskClassifier, MultiTaskHead, TrainMode};
pub use logging::{LogMode, Logger};
pub use metrics::{decode_group, encode_group, AverageMeter, GroupResults};
pub use tracking::{record_scalars, MetricsSink};
