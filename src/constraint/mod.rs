//! Weight-norm constraints for classifier heads
//!
//! Two complementary operations over the same parameter seam:
//!
//! - [`MaxNorm`]: one-sided projection that clips output units whose norm
//!   exceeds a cached per-layer threshold, applied after each optimizer step
//! - [`TauNorm`]: unconditional rescaling of every output unit to
//!   `1 / norm^tau`, applied once to a trained head
//!
//! Both operate through [`ConstraintTarget`], so the model decides which
//! tensors are constrained rather than the constraint hard-coding a layer
//! name.

mod max_norm;
mod tau_norm;

pub use max_norm::MaxNorm;
pub use tau_norm::TauNorm;

use ndarray::{ArrayViewD, ArrayViewMutD, Axis};

/// Mutable views of the parameter tensors a weight constraint operates on.
///
/// Typically the final linear layer's weight and bias, in that order. The
/// order must be stable across calls: [`MaxNorm`] caches one threshold per
/// view position.
pub trait ConstraintTarget {
    /// Constrained parameter tensors, in a stable order.
    fn constrained_params(&mut self) -> Vec<ArrayViewMutD<'_, f32>>;
}

/// Raw parameter lists are themselves valid targets.
impl ConstraintTarget for Vec<ndarray::ArrayD<f32>> {
    fn constrained_params(&mut self) -> Vec<ArrayViewMutD<'_, f32>> {
        self.iter_mut().map(|p| p.view_mut()).collect()
    }
}

/// Lp norm of each output unit (axis 0), trailing dimensions flattened.
pub(crate) fn unit_norms(param: &ArrayViewD<'_, f32>, p: f32) -> Vec<f32> {
    param
        .axis_iter(Axis(0))
        .map(|unit| {
            unit.iter()
                .map(|w| w.abs().powf(p))
                .sum::<f32>()
                .powf(p.recip())
        })
        .collect()
}
