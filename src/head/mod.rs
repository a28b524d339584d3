//! Classifier heads and the model traits the evaluator relies on
//!
//! The evaluator never sees a concrete model type: anything that can switch
//! between training and inference mode and map a feature batch to logits is
//! evaluable. [`LinearHead`] and [`MultiTaskHead`] are the reference
//! implementations used over frozen feature extractors.

mod linear;

pub use linear::{LinearHead, MultiTaskHead};

use ndarray::Array2;

/// Train/eval mode switching.
///
/// The evaluation sweep disables training-only behavior (dropout, batch-norm
/// statistics updates) for the duration of the sweep and unconditionally
/// restores training mode before returning.
pub trait TrainMode {
    /// Switch between training (`true`) and inference (`false`) mode.
    fn set_training(&mut self, training: bool);

    /// Current mode.
    fn is_training(&self) -> bool;
}

/// A model producing one logit matrix per batch.
pub trait Classifier: TrainMode {
    /// Map a `(batch, features)` matrix to `(batch, classes)` logits.
    fn forward(&self, inputs: &Array2<f32>) -> Array2<f32>;
}

/// A model producing one logit matrix per task for the same batch.
pub trait MultiTaskClassifier: TrainMode {
    /// Per-task logits, in task order.
    fn forward_tasks(&self, inputs: &Array2<f32>) -> Vec<Array2<f32>>;
}
