//! Grouped batches and data sources

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::metrics::encode_group;

/// One batch of a grouped classification dataset.
///
/// Inputs are `(batch, features)`; the three label vectors align with the
/// input rows. `groups` carries the packed `(label, place)` index.
#[derive(Debug, Clone)]
pub struct GroupedBatch {
    /// Input features.
    pub inputs: Array2<f32>,
    /// Class label per sample.
    pub labels: Vec<usize>,
    /// Packed group index per sample.
    pub groups: Vec<usize>,
    /// Secondary (place) label per sample.
    pub places: Vec<usize>,
}

impl GroupedBatch {
    /// Assemble a batch; all label vectors must match the input row count.
    pub fn new(
        inputs: Array2<f32>,
        labels: Vec<usize>,
        groups: Vec<usize>,
        places: Vec<usize>,
    ) -> Self {
        assert_eq!(inputs.nrows(), labels.len(), "labels must match input rows");
        assert_eq!(inputs.nrows(), groups.len(), "groups must match input rows");
        assert_eq!(inputs.nrows(), places.len(), "places must match input rows");
        Self {
            inputs,
            labels,
            groups,
            places,
        }
    }

    /// Number of samples in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inputs.nrows()
    }

    /// Whether the batch holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A source of grouped evaluation batches.
pub trait GroupedDataSource {
    /// Number of distinct group indices; batches only carry groups in
    /// `[0, n_groups)`.
    fn n_groups(&self) -> usize;

    /// Iterate the batches in order.
    fn batches(&self) -> Box<dyn Iterator<Item = &GroupedBatch> + '_>;
}

/// Configuration for synthetic grouped data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Total number of samples to generate.
    n_samples: usize,
    /// Samples per batch (the last batch may be smaller).
    batch_size: usize,
    /// Input feature width.
    n_features: usize,
    /// Number of class labels.
    n_classes: usize,
    /// Number of place labels.
    n_places: usize,
    /// Random seed.
    seed: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            n_samples: 64,
            batch_size: 8,
            n_features: 16,
            n_classes: 2,
            n_places: 2,
            seed: 42,
        }
    }
}

impl LoaderConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total sample count.
    #[must_use]
    pub fn with_n_samples(mut self, n: usize) -> Self {
        self.n_samples = n;
        self
    }

    /// Set the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the input feature width.
    #[must_use]
    pub fn with_n_features(mut self, n: usize) -> Self {
        self.n_features = n;
        self
    }

    /// Set the number of class labels.
    #[must_use]
    pub fn with_n_classes(mut self, n: usize) -> Self {
        self.n_classes = n;
        self
    }

    /// Set the number of place labels.
    #[must_use]
    pub fn with_n_places(mut self, n: usize) -> Self {
        self.n_places = n;
        self
    }

    /// Set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Total sample count.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Samples per batch.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Input feature width.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of class labels.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Number of place labels.
    #[must_use]
    pub fn n_places(&self) -> usize {
        self.n_places
    }

    /// Number of batches the sample count splits into.
    #[must_use]
    pub fn num_batches(&self) -> usize {
        self.n_samples.div_ceil(self.batch_size)
    }
}

/// In-memory grouped data source.
#[derive(Debug, Clone)]
pub struct InMemoryLoader {
    batches: Vec<GroupedBatch>,
    n_groups: usize,
}

impl InMemoryLoader {
    /// Wrap pre-built batches.
    pub fn new(batches: Vec<GroupedBatch>, n_groups: usize) -> Self {
        Self { batches, n_groups }
    }

    /// Generate seeded synthetic batches: uniform inputs, uniform labels and
    /// places, group index packed from the pair.
    pub fn synthetic(config: &LoaderConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut batches = Vec::with_capacity(config.num_batches());
        let mut remaining = config.n_samples;

        while remaining > 0 {
            let batch_size = remaining.min(config.batch_size);
            remaining -= batch_size;

            let inputs = Array2::from_shape_fn((batch_size, config.n_features), |_| {
                rng.random::<f32>()
            });
            let labels: Vec<usize> =
                (0..batch_size).map(|_| rng.random_range(0..config.n_classes)).collect();
            let places: Vec<usize> =
                (0..batch_size).map(|_| rng.random_range(0..config.n_places)).collect();
            let groups: Vec<usize> = labels
                .iter()
                .zip(&places)
                .map(|(&y, &p)| encode_group(y, p, config.n_places))
                .collect();

            batches.push(GroupedBatch::new(inputs, labels, groups, places));
        }

        Self {
            batches,
            n_groups: config.n_classes * config.n_places,
        }
    }

    /// Number of batches.
    #[must_use]
    pub fn num_batches(&self) -> usize {
        self.batches.len()
    }
}

impl GroupedDataSource for InMemoryLoader {
    fn n_groups(&self) -> usize {
        self.n_groups
    }

    fn batches(&self) -> Box<dyn Iterator<Item = &GroupedBatch> + '_> {
        Box::new(self.batches.iter())
    }
}
