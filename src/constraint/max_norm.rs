//! Max-norm constraint enforced by projected gradient descent
//!
//! After each optimizer step, [`MaxNorm::project`] clips every output unit
//! whose norm exceeds a per-layer threshold back onto the constraint ball;
//! units inside the ball are left untouched. Thresholds interpolate between
//! the smallest and largest unit norm observed when they were computed, so
//! the constraint is relative to that snapshot of the weight distribution,
//! not an absolute bound.

use ndarray::Axis;

use super::{unit_norms, ConstraintTarget};

/// Max-norm projection with cached per-layer thresholds.
///
/// # Example
///
/// ```
/// use equilibrar::{LinearHead, MaxNorm};
///
/// let mut head = LinearHead::new(8, 4, 7);
/// let mut max_norm = MaxNorm::new(0.5, 2.0, 1.0);
/// max_norm.set_thresholds(&mut head);
///
/// // Inside the training loop, after optimizer.step():
/// max_norm.project(&mut head);
/// ```
#[derive(Debug, Clone)]
pub struct MaxNorm {
    /// Position of the threshold between min and max unit norm, in [0, 1].
    thresh_frac: f32,
    /// Lp norm order.
    p: f32,
    /// Norm exponent applied when comparing and rescaling.
    tau: f32,
    /// One threshold per constrained parameter; empty until computed.
    per_layer_thresh: Vec<f32>,
}

impl MaxNorm {
    /// Create a projector.
    ///
    /// # Arguments
    /// * `thresh_frac` - threshold position between min and max unit norm, in [0, 1]
    /// * `p` - Lp norm order (2.0 for Euclidean)
    /// * `tau` - exponent applied to unit norms before comparison
    pub fn new(thresh_frac: f32, p: f32, tau: f32) -> Self {
        assert!(
            (0.0..=1.0).contains(&thresh_frac),
            "thresh_frac must be in [0, 1], got {thresh_frac}"
        );
        Self {
            thresh_frac,
            p,
            tau,
            per_layer_thresh: Vec::new(),
        }
    }

    /// Recompute per-parameter thresholds from the current weights.
    ///
    /// Rank ≤ 1 parameters (biases) get an infinite threshold and are never
    /// constrained. For rank ≥ 2 parameters the threshold is
    /// `min + thresh_frac * (max - min)` over the per-unit norms, trailing
    /// dimensions flattened. Overwrites any previous thresholds.
    pub fn set_thresholds(&mut self, target: &mut impl ConstraintTarget) {
        self.per_layer_thresh.clear();
        for param in target.constrained_params() {
            if param.ndim() <= 1 {
                self.per_layer_thresh.push(f32::INFINITY);
                continue;
            }
            let norms = unit_norms(&param.view(), self.p);
            let min = norms.iter().copied().fold(f32::INFINITY, f32::min);
            let max = norms.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            self.per_layer_thresh.push(min + self.thresh_frac * (max - min));
        }
    }

    /// Project oversized units back onto the constraint, in place.
    ///
    /// Computes thresholds first if none are cached. Every unit whose
    /// `norm^tau` strictly exceeds its layer threshold is scaled by
    /// `threshold / norm^tau`; units at or below threshold keep their exact
    /// values. One-sided: a norm is never increased.
    pub fn project(&mut self, target: &mut impl ConstraintTarget) {
        if self.per_layer_thresh.is_empty() {
            self.set_thresholds(target);
        }

        let params = target.constrained_params();
        assert_eq!(
            params.len(),
            self.per_layer_thresh.len(),
            "parameter count changed since thresholds were computed"
        );

        for (mut param, &thresh) in params.into_iter().zip(&self.per_layer_thresh) {
            if param.ndim() <= 1 {
                continue;
            }
            let norms = unit_norms(&param.view(), self.p);
            for (mut unit, norm) in param.axis_iter_mut(Axis(0)).zip(norms) {
                let norm_tau = norm.powf(self.tau);
                if norm_tau > thresh {
                    let scale = thresh / norm_tau;
                    unit.mapv_inplace(|w| w * scale);
                }
            }
        }
    }

    /// Drop cached thresholds; the next [`project`](Self::project) recomputes
    /// them from the weights it sees.
    pub fn reset_thresholds(&mut self) {
        self.per_layer_thresh.clear();
    }

    /// Cached per-parameter thresholds; empty until computed.
    #[must_use]
    pub fn thresholds(&self) -> &[f32] {
        &self.per_layer_thresh
    }
}

impl Default for MaxNorm {
    /// `thresh_frac = 1.0`, Euclidean norm, `tau = 1.0`.
    fn default() -> Self {
        Self::new(1.0, 2.0, 1.0)
    }
}
