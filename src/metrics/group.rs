//! Group index codec and per-group accuracy aggregation
//!
//! Subgroups are pairs of a class label and a place (domain) label, packed
//! into a single index `g = y * n_places + p`. Accuracy is accumulated per
//! group through one [`AverageMeter`] each and aggregated into
//! [`GroupResults`] at the end of an evaluation sweep.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::Array2;
use serde::Serialize;

use super::AverageMeter;

/// Decode a packed group index into `(label, place)`.
#[must_use]
pub fn decode_group(g: usize, n_places: usize) -> (usize, usize) {
    (g / n_places, g % n_places)
}

/// Encode `(label, place)` into a packed group index.
#[must_use]
pub fn encode_group(y: usize, p: usize, n_places: usize) -> usize {
    y * n_places + p
}

/// Index of the largest logit per row; ties resolve to the first maximum.
fn argmax_rows(logits: &Array2<f32>) -> Vec<usize> {
    logits
        .rows()
        .into_iter()
        .map(|row| {
            let mut best = 0;
            let mut best_val = f32::NEG_INFINITY;
            for (class, &logit) in row.iter().enumerate() {
                if logit > best_val {
                    best = class;
                    best_val = logit;
                }
            }
            best
        })
        .collect()
}

/// Update one meter per group with the batch's top-1 accuracy restricted to
/// that group's samples.
///
/// Groups absent from the batch are untouched. `meters` is indexed by group,
/// so it must span every group index the batch can contain.
pub fn update_group_meters(
    meters: &mut [AverageMeter],
    labels: &[usize],
    groups: &[usize],
    logits: &Array2<f32>,
) {
    assert_eq!(labels.len(), groups.len(), "labels and groups must align");
    assert_eq!(labels.len(), logits.nrows(), "labels and logits must align");

    let preds = argmax_rows(logits);

    let mut per_group: BTreeMap<usize, (usize, usize)> = BTreeMap::new();
    for ((&label, &group), &pred) in labels.iter().zip(groups).zip(&preds) {
        let (n, correct) = per_group.entry(group).or_insert((0, 0));
        *n += 1;
        if pred == label {
            *correct += 1;
        }
    }

    for (group, (n, correct)) in per_group {
        meters[group].update(correct as f32 / n as f32, n);
    }
}

/// Aggregated results of one evaluation sweep.
#[derive(Debug, Clone, Serialize)]
pub struct GroupResults {
    /// Accuracy per group, keyed `accuracy_{label}_{place}`. Groups that
    /// received no samples report their meter's reset value `0.0`.
    pub accuracy_by_group: BTreeMap<String, f32>,
    /// Total correct over total samples across all groups.
    pub mean_accuracy: f32,
    /// Minimum accuracy over groups with at least one sample.
    pub worst_accuracy: f32,
}

impl GroupResults {
    /// Aggregate per-group meters into final results.
    ///
    /// `get_yp` decodes a group index into the `(label, place)` pair used
    /// for the per-group keys. On an empty data source both `mean_accuracy`
    /// and `worst_accuracy` are NaN.
    pub fn from_meters(meters: &[AverageMeter], get_yp: impl Fn(usize) -> (usize, usize)) -> Self {
        let mut accuracy_by_group = BTreeMap::new();
        let mut correct = 0.0f32;
        let mut total = 0usize;
        let mut worst = f32::INFINITY;

        for (g, meter) in meters.iter().enumerate() {
            let (y, p) = get_yp(g);
            accuracy_by_group.insert(format!("accuracy_{y}_{p}"), meter.avg());
            correct += meter.sum();
            total += meter.count();
            if meter.count() > 0 {
                worst = worst.min(meter.avg());
            }
        }

        Self {
            accuracy_by_group,
            mean_accuracy: correct / total as f32,
            worst_accuracy: if worst.is_finite() { worst } else { f32::NAN },
        }
    }

    /// Flatten into a scalar map for recording through a metrics sink.
    #[must_use]
    pub fn scalar_map(&self) -> BTreeMap<String, f32> {
        let mut map = self.accuracy_by_group.clone();
        map.insert("mean_accuracy".to_string(), self.mean_accuracy);
        map.insert("worst_accuracy".to_string(), self.worst_accuracy);
        map
    }
}

impl fmt::Display for GroupResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "mean_accuracy: {:.4}", self.mean_accuracy)?;
        writeln!(f, "worst_accuracy: {:.4}", self.worst_accuracy)?;
        for (key, value) in &self.accuracy_by_group {
            writeln!(f, "  {key}: {value:.4}")?;
        }
        Ok(())
    }
}
