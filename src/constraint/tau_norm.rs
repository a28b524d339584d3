//! Tau-normalization of classifier weights
//!
//! Rescales every output unit of a trained classifier head by
//! `1 / norm^tau`, evening out the per-class weight magnitudes that
//! imbalanced training produces. Unlike [`MaxNorm`](super::MaxNorm) this is
//! unconditional and stateless: every unit is rescaled on every call, and no
//! thresholds are cached.

use ndarray::Axis;

use super::{unit_norms, ConstraintTarget};

/// Stateless tau-normalization over a constraint target.
///
/// Only rank ≥ 2 parameters are rescaled; biases are skipped. A zero-norm
/// unit produces a non-finite scale factor: callers must ensure no all-zero
/// output unit exists before applying.
#[derive(Debug, Clone, Copy)]
pub struct TauNorm {
    /// Lp norm order.
    p: f32,
    /// Norm exponent; 1.0 fully normalizes, smaller values normalize partially.
    tau: f32,
}

impl TauNorm {
    /// Create a normalizer with the given norm order and exponent.
    pub fn new(p: f32, tau: f32) -> Self {
        Self { p, tau }
    }

    /// Divide each output unit of each rank ≥ 2 parameter by its own
    /// `norm^tau`, in place.
    pub fn apply(&self, target: &mut impl ConstraintTarget) {
        for mut param in target.constrained_params() {
            if param.ndim() <= 1 {
                continue;
            }
            let norms = unit_norms(&param.view(), self.p);
            for (mut unit, norm) in param.axis_iter_mut(Axis(0)).zip(norms) {
                let scale = norm.powf(self.tau).recip();
                unit.mapv_inplace(|w| w * scale);
            }
        }
    }
}

impl Default for TauNorm {
    /// Euclidean norm, `tau = 1.0`.
    fn default() -> Self {
        Self::new(2.0, 1.0)
    }
}
