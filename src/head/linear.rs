//! Linear classifier heads over shared features

use ndarray::{Array1, Array2, ArrayViewMutD};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Classifier, MultiTaskClassifier, TrainMode};
use crate::constraint::ConstraintTarget;

/// A single linear output head: `logits = x · Wᵀ + b`.
///
/// Weight shape is `(n_classes, n_features)`; inputs are `(batch,
/// n_features)`. Initialization is seeded uniform in `±1/√n_features`.
#[derive(Debug, Clone)]
pub struct LinearHead {
    weight: Array2<f32>,
    bias: Array1<f32>,
    training: bool,
}

impl LinearHead {
    /// Create a head with seeded uniform initialization.
    pub fn new(n_features: usize, n_classes: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::init(n_features, n_classes, &mut rng)
    }

    fn init(n_features: usize, n_classes: usize, rng: &mut StdRng) -> Self {
        let bound = (n_features as f32).sqrt().recip();
        let weight = Array2::from_shape_fn((n_classes, n_features), |_| {
            (rng.random::<f32>() * 2.0 - 1.0) * bound
        });
        let bias = Array1::from_shape_fn(n_classes, |_| (rng.random::<f32>() * 2.0 - 1.0) * bound);
        Self {
            weight,
            bias,
            training: true,
        }
    }

    /// Build a head from existing parameters.
    pub fn from_parts(weight: Array2<f32>, bias: Array1<f32>) -> Self {
        assert_eq!(
            weight.nrows(),
            bias.len(),
            "weight rows must match bias length"
        );
        Self {
            weight,
            bias,
            training: true,
        }
    }

    /// Input feature width.
    pub fn n_features(&self) -> usize {
        self.weight.ncols()
    }

    /// Number of output classes.
    pub fn n_classes(&self) -> usize {
        self.weight.nrows()
    }

    /// Weight matrix, `(n_classes, n_features)`.
    pub fn weight(&self) -> &Array2<f32> {
        &self.weight
    }

    /// Mutable weight matrix.
    pub fn weight_mut(&mut self) -> &mut Array2<f32> {
        &mut self.weight
    }

    /// Bias vector, one entry per class.
    pub fn bias(&self) -> &Array1<f32> {
        &self.bias
    }

    /// Mutable bias vector.
    pub fn bias_mut(&mut self) -> &mut Array1<f32> {
        &mut self.bias
    }
}

impl TrainMode for LinearHead {
    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn is_training(&self) -> bool {
        self.training
    }
}

impl Classifier for LinearHead {
    fn forward(&self, inputs: &Array2<f32>) -> Array2<f32> {
        assert_eq!(
            inputs.ncols(),
            self.n_features(),
            "input feature width must match the head"
        );
        inputs.dot(&self.weight.t()) + &self.bias
    }
}

impl ConstraintTarget for LinearHead {
    /// Weight first, bias second; thresholds are cached in this order.
    fn constrained_params(&mut self) -> Vec<ArrayViewMutD<'_, f32>> {
        vec![
            self.weight.view_mut().into_dyn(),
            self.bias.view_mut().into_dyn(),
        ]
    }
}

/// Independent linear heads over shared input features, one per task.
///
/// No parameter sharing beyond the common input: each task gets its own
/// weight and bias.
#[derive(Debug, Clone)]
pub struct MultiTaskHead {
    heads: Vec<LinearHead>,
    training: bool,
}

impl MultiTaskHead {
    /// Create one head per entry of `n_classes_per_task`, all drawing from a
    /// single seeded stream so the whole stack is reproducible.
    pub fn new(n_features: usize, n_classes_per_task: &[usize], seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let heads = n_classes_per_task
            .iter()
            .map(|&n_classes| LinearHead::init(n_features, n_classes, &mut rng))
            .collect();
        Self {
            heads,
            training: true,
        }
    }

    /// Build from existing heads.
    pub fn from_heads(heads: Vec<LinearHead>) -> Self {
        Self {
            heads,
            training: true,
        }
    }

    /// Number of tasks.
    pub fn n_tasks(&self) -> usize {
        self.heads.len()
    }

    /// Per-task heads, in task order.
    pub fn heads(&self) -> &[LinearHead] {
        &self.heads
    }

    /// Mutable access to one task's head.
    pub fn head_mut(&mut self, task: usize) -> &mut LinearHead {
        &mut self.heads[task]
    }
}

impl TrainMode for MultiTaskHead {
    fn set_training(&mut self, training: bool) {
        self.training = training;
        for head in &mut self.heads {
            head.set_training(training);
        }
    }

    fn is_training(&self) -> bool {
        self.training
    }
}

impl MultiTaskClassifier for MultiTaskHead {
    fn forward_tasks(&self, inputs: &Array2<f32>) -> Vec<Array2<f32>> {
        self.heads.iter().map(|head| head.forward(inputs)).collect()
    }
}

impl ConstraintTarget for MultiTaskHead {
    /// All heads' parameters in task order, weight before bias.
    fn constrained_params(&mut self) -> Vec<ArrayViewMutD<'_, f32>> {
        self.heads
            .iter_mut()
            .flat_map(LinearHead::constrained_params)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_forward_known_values() {
        let head = LinearHead::from_parts(arr2(&[[1.0, 0.0], [0.0, 2.0]]), arr1(&[0.5, -0.5]));
        let logits = head.forward(&arr2(&[[3.0, 4.0]]));

        assert_eq!(logits.shape(), &[1, 2]);
        assert_abs_diff_eq!(logits[[0, 0]], 3.5, epsilon = 1e-6);
        assert_abs_diff_eq!(logits[[0, 1]], 7.5, epsilon = 1e-6);
    }

    #[test]
    fn test_seeded_init_is_deterministic() {
        let a = LinearHead::new(16, 4, 123);
        let b = LinearHead::new(16, 4, 123);
        assert_eq!(a.weight(), b.weight());
        assert_eq!(a.bias(), b.bias());

        let c = LinearHead::new(16, 4, 124);
        assert_ne!(a.weight(), c.weight());
    }

    #[test]
    fn test_init_bound() {
        let head = LinearHead::new(64, 8, 9);
        let bound = (64.0f32).sqrt().recip();
        assert!(head.weight().iter().all(|w| w.abs() <= bound));
    }

    #[test]
    fn test_train_mode_round_trip() {
        let mut head = LinearHead::new(4, 2, 0);
        assert!(head.is_training());
        head.set_training(false);
        assert!(!head.is_training());
        head.set_training(true);
        assert!(head.is_training());
    }

    #[test]
    fn test_constrained_params_order() {
        let mut head = LinearHead::from_parts(arr2(&[[1.0, 2.0]]), arr1(&[3.0]));
        let params = head.constrained_params();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].ndim(), 2);
        assert_eq!(params[1].ndim(), 1);
    }

    #[test]
    #[should_panic(expected = "weight rows must match bias length")]
    fn test_from_parts_shape_mismatch_panics() {
        let _ = LinearHead::from_parts(arr2(&[[1.0, 2.0]]), arr1(&[1.0, 2.0]));
    }

    #[test]
    fn test_multitask_forward_order_and_shapes() {
        let model = MultiTaskHead::new(8, &[3, 5], 7);
        let inputs = Array2::zeros((4, 8));
        let outputs = model.forward_tasks(&inputs);

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].shape(), &[4, 3]);
        assert_eq!(outputs[1].shape(), &[4, 5]);
    }

    #[test]
    fn test_multitask_heads_are_independent() {
        let mut model = MultiTaskHead::new(4, &[2, 2], 11);
        assert_ne!(model.heads()[0].weight(), model.heads()[1].weight());

        model.head_mut(0).weight_mut()[[0, 0]] = 99.0;
        assert_ne!(model.heads()[1].weight()[[0, 0]], 99.0);
    }

    #[test]
    fn test_multitask_mode_propagates_to_heads() {
        let mut model = MultiTaskHead::new(4, &[2, 3], 1);
        model.set_training(false);
        assert!(model.heads().iter().all(|h| !h.is_training()));
    }

    #[test]
    fn test_multitask_constrained_params_cover_all_heads() {
        let mut model = MultiTaskHead::new(4, &[2, 3, 4], 1);
        assert_eq!(model.constrained_params().len(), 6);
    }
}
