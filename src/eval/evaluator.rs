//! Evaluation sweep with per-group accuracy aggregation

use crate::head::{Classifier, MultiTaskClassifier, TrainMode};
use crate::metrics::{update_group_meters, AverageMeter, GroupResults};

use super::loader::GroupedDataSource;

/// Evaluate a model over every batch of a grouped data source.
///
/// The model is switched to inference mode for the sweep and back to
/// training mode before returning, mirroring how a training loop interleaves
/// evaluation passes. With `predict_place` the secondary label stands in for
/// the class label.
///
/// # Example
///
/// ```
/// use equilibrar::{decode_group, evaluate, InMemoryLoader, LinearHead, LoaderConfig};
///
/// let config = LoaderConfig::default();
/// let data = InMemoryLoader::synthetic(&config);
/// let mut head = LinearHead::new(config.n_features(), config.n_classes(), 3);
///
/// let n_places = config.n_places();
/// let results = evaluate(&mut head, &data, |g| decode_group(g, n_places), false);
/// println!("{results}");
/// ```
pub fn evaluate<M, D, F>(model: &mut M, data: &D, get_yp: F, predict_place: bool) -> GroupResults
where
    M: Classifier,
    D: GroupedDataSource + ?Sized,
    F: Fn(usize) -> (usize, usize),
{
    model.set_training(false);

    let mut meters = vec![AverageMeter::new(); data.n_groups()];
    for batch in data.batches() {
        let labels = if predict_place {
            &batch.places
        } else {
            &batch.labels
        };
        let logits = model.forward(&batch.inputs);
        update_group_meters(&mut meters, labels, &batch.groups, &logits);
    }

    model.set_training(true);
    GroupResults::from_meters(&meters, get_yp)
}

/// Evaluate both heads of a multi-task model.
///
/// The first head is scored against the class label (or the place label when
/// `predict_place`), the second against the place label. Both result sets
/// use the supplied data source's group count.
pub fn evaluate_multitask<M, D, F>(
    model: &mut M,
    data: &D,
    get_yp: F,
    predict_place: bool,
) -> (GroupResults, GroupResults)
where
    M: MultiTaskClassifier,
    D: GroupedDataSource + ?Sized,
    F: Fn(usize) -> (usize, usize),
{
    model.set_training(false);

    let mut meters = vec![AverageMeter::new(); data.n_groups()];
    let mut place_meters = vec![AverageMeter::new(); data.n_groups()];

    for batch in data.batches() {
        let labels = if predict_place {
            &batch.places
        } else {
            &batch.labels
        };
        let task_logits = model.forward_tasks(&batch.inputs);
        assert!(
            task_logits.len() >= 2,
            "multi-task evaluation needs at least two heads"
        );
        update_group_meters(&mut meters, labels, &batch.groups, &task_logits[0]);
        update_group_meters(&mut place_meters, &batch.places, &batch.groups, &task_logits[1]);
    }

    model.set_training(true);
    (
        GroupResults::from_meters(&meters, &get_yp),
        GroupResults::from_meters(&place_meters, &get_yp),
    )
}
