//! Property tests for weight constraints and group metrics
//!
//! Ensures the numeric invariants hold across the input space:
//! - Projection caps every unit norm at its threshold and never increases one
//! - Full-fraction thresholds make projection the identity
//! - Tau-normalization lands on the predicted norm
//! - Meter algebra matches the closed-form weighted mean
//! - The group codec round-trips

use equilibrar::{
    decode_group, encode_group, AverageMeter, GroupResults, LinearHead, MaxNorm, TauNorm,
};
use ndarray::{Array1, Array2};
use proptest::collection::vec;
use proptest::prelude::*;

// =============================================================================
// Strategy Helpers
// =============================================================================

/// Weight matrices with entries bounded away from zero, so no unit has a
/// vanishing norm.
fn weight_matrix(rows: usize, cols: usize) -> impl Strategy<Value = Array2<f32>> {
    vec(0.1f32..10.0, rows * cols)
        .prop_map(move |data| Array2::from_shape_vec((rows, cols), data).unwrap())
}

fn head_from(weight: Array2<f32>) -> LinearHead {
    let bias = Array1::zeros(weight.nrows());
    LinearHead::from_parts(weight, bias)
}

fn row_norm(head: &LinearHead, row: usize) -> f32 {
    head.weight()
        .row(row)
        .iter()
        .map(|w| w * w)
        .sum::<f32>()
        .sqrt()
}

// =============================================================================
// Max-norm Projection Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn prop_projection_caps_unit_norms(
        weight in weight_matrix(5, 3),
        frac in 0.0f32..=1.0,
    ) {
        let mut head = head_from(weight);
        let mut max_norm = MaxNorm::new(frac, 2.0, 1.0);
        max_norm.set_thresholds(&mut head);
        let thresh = max_norm.thresholds()[0];
        max_norm.project(&mut head);

        for row in 0..head.n_classes() {
            let norm = row_norm(&head, row);
            prop_assert!(
                norm <= thresh * (1.0 + 1e-4),
                "unit {} norm {} exceeds threshold {}",
                row, norm, thresh
            );
        }
    }

    #[test]
    fn prop_projection_never_increases_norms(
        weight in weight_matrix(4, 6),
        frac in 0.0f32..=1.0,
    ) {
        let mut head = head_from(weight);
        let before: Vec<f32> = (0..4).map(|r| row_norm(&head, r)).collect();

        let mut max_norm = MaxNorm::new(frac, 2.0, 1.0);
        max_norm.project(&mut head);

        for row in 0..4 {
            let after = row_norm(&head, row);
            prop_assert!(
                after <= before[row] * (1.0 + 1e-5),
                "unit {} norm grew from {} to {}",
                row, before[row], after
            );
        }
    }

    #[test]
    fn prop_projection_identity_at_full_fraction(
        weight in weight_matrix(4, 4),
    ) {
        let mut head = head_from(weight.clone());
        let mut max_norm = MaxNorm::new(1.0, 2.0, 1.0);
        max_norm.set_thresholds(&mut head);
        max_norm.project(&mut head);

        for (after, before) in head.weight().iter().zip(weight.iter()) {
            prop_assert!(
                (after - before).abs() <= 1e-4 * before.abs().max(1.0),
                "weight changed from {} to {}",
                before, after
            );
        }
    }

    #[test]
    fn prop_units_within_threshold_are_untouched(
        weight in weight_matrix(6, 3),
        frac in 0.0f32..=1.0,
    ) {
        let mut head = head_from(weight.clone());
        let mut max_norm = MaxNorm::new(frac, 2.0, 1.0);
        max_norm.set_thresholds(&mut head);
        let thresh = max_norm.thresholds()[0];
        max_norm.project(&mut head);

        for row in 0..6 {
            let unprojected_norm: f32 = weight.row(row).iter().map(|w| w * w).sum::<f32>().sqrt();
            // Clearly inside the ball: the projection must not have touched it.
            if unprojected_norm <= thresh * (1.0 - 1e-5) {
                for (after, before) in head.weight().row(row).iter().zip(weight.row(row).iter()) {
                    prop_assert_eq!(after, before);
                }
            }
        }
    }
}

// =============================================================================
// Tau-normalization Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn prop_tau_norm_unit_norm_at_tau_one(
        weight in weight_matrix(5, 4),
    ) {
        let mut head = head_from(weight);
        TauNorm::new(2.0, 1.0).apply(&mut head);

        for row in 0..5 {
            let norm = row_norm(&head, row);
            prop_assert!(
                (norm - 1.0).abs() < 1e-3,
                "unit {} norm {} != 1",
                row, norm
            );
        }
    }

    #[test]
    fn prop_tau_norm_partial_law(
        weight in weight_matrix(3, 3),
        tau in 0.1f32..1.0,
    ) {
        let mut head = head_from(weight.clone());
        TauNorm::new(2.0, tau).apply(&mut head);

        for row in 0..3 {
            let before: f32 = weight.row(row).iter().map(|w| w * w).sum::<f32>().sqrt();
            let expected = before.powf(1.0 - tau);
            let after = row_norm(&head, row);
            prop_assert!(
                (after - expected).abs() <= 1e-2 * expected.max(1.0),
                "unit {}: norm {} != {}^(1-{}) = {}",
                row, after, before, tau, expected
            );
        }
    }
}

// =============================================================================
// Meter and Codec Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn prop_meter_matches_closed_form_weighted_mean(
        v1 in -100.0f32..100.0,
        v2 in -100.0f32..100.0,
        n1 in 1usize..1000,
        n2 in 1usize..1000,
    ) {
        let mut meter = AverageMeter::new();
        meter.update(v1, n1);
        meter.update(v2, n2);

        let expected = (v1 * n1 as f32 + v2 * n2 as f32) / (n1 + n2) as f32;
        prop_assert!(
            (meter.avg() - expected).abs() <= 1e-3 * expected.abs().max(1.0),
            "avg {} != {}",
            meter.avg(), expected
        );
    }

    #[test]
    fn prop_meter_reset_zeroes_state(
        values in vec((-10.0f32..10.0, 1usize..50), 1..10),
    ) {
        let mut meter = AverageMeter::new();
        for (value, n) in values {
            meter.update(value, n);
        }
        meter.reset();

        prop_assert_eq!(meter.val(), 0.0);
        prop_assert_eq!(meter.avg(), 0.0);
        prop_assert_eq!(meter.sum(), 0.0);
        prop_assert_eq!(meter.count(), 0);
    }

    #[test]
    fn prop_group_codec_round_trips(
        (n_places, y, p) in (1usize..64).prop_flat_map(|np| (Just(np), 0usize..64, 0..np)),
    ) {
        let g = encode_group(y, p, n_places);
        prop_assert_eq!(decode_group(g, n_places), (y, p));
    }

    #[test]
    fn prop_results_bounded_and_ordered(
        groups in vec((0.0f32..=1.0, 1usize..100), 1..8),
    ) {
        let mut meters = vec![AverageMeter::new(); groups.len()];
        for (meter, (accuracy, n)) in meters.iter_mut().zip(&groups) {
            meter.update(*accuracy, *n);
        }

        let n_places = 1;
        let results = GroupResults::from_meters(&meters, |g| decode_group(g, n_places));

        prop_assert!((-1e-6..=1.0 + 1e-6).contains(&results.mean_accuracy));
        prop_assert!((-1e-6..=1.0 + 1e-6).contains(&results.worst_accuracy));
        prop_assert!(
            results.worst_accuracy <= results.mean_accuracy + 1e-6,
            "worst {} above mean {}",
            results.worst_accuracy, results.mean_accuracy
        );
    }
}
