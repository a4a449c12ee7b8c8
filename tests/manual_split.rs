//! Manual split engine behavior over whole datasets.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use rstest::rstest;

use treelab::data::Dataset;
use treelab::error::EngineError;
use treelab::manual::ManualSplitEngine;
use treelab::stats::Criterion;
use treelab::testing::{four_point_dataset, iris_like};
use treelab::{EngineConfig, assert_approx_eq};

#[test]
fn four_point_sweep() {
    let ds = four_point_dataset();
    let engine = ManualSplitEngine::new(&ds);
    let sweep = engine.feature_stats(None, "x", Criterion::Gini, None).unwrap();

    let thresholds: Vec<f64> = sweep.thresholds.iter().map(|t| t.threshold).collect();
    assert_eq!(thresholds, vec![1.5, 2.5, 3.5]);
    assert_eq!(sweep.best_threshold, 2.5);
    assert_approx_eq!(sweep.thresholds[sweep.best_index].information_gain, 0.5);

    let best = &sweep.thresholds[sweep.best_index];
    assert_eq!(best.left_mask.indices(), &[0, 1]);
    assert_eq!(best.right_mask.indices(), &[2, 3]);
    assert_eq!(best.split_stats.left.class_distribution["neg"], 2);
    assert_eq!(best.split_stats.right.class_distribution["neg"], 0);
}

#[rstest]
#[case(Criterion::Gini, 1.5, 1.0 / 6.0)]
#[case(Criterion::Gini, 2.5, 0.5)]
#[case(Criterion::Entropy, 2.5, 1.0)]
fn gain_per_threshold(#[case] criterion: Criterion, #[case] threshold: f64, #[case] gain: f64) {
    let ds = four_point_dataset();
    let engine = ManualSplitEngine::new(&ds);
    let result = engine.node_stats(None, "x", threshold, criterion).unwrap();
    assert_abs_diff_eq!(result.split_stats.information_gain, gain, epsilon = 1e-12);
}

#[test]
fn child_masks_feed_back_as_parents() {
    let ds = iris_like();
    let engine = ManualSplitEngine::new(&ds);

    let root = engine.feature_stats(None, "petal_length", Criterion::Gini, None).unwrap();
    let best = &root.thresholds[root.best_index];
    let n_left = best.left_mask.len();

    let child = engine
        .feature_stats(Some(best.right_mask.indices()), "petal_width", Criterion::Gini, None)
        .unwrap();
    let child_best = &child.thresholds[child.best_index];
    assert_eq!(child_best.split_stats.parent.samples, ds.n_rows() - n_left);
    assert_eq!(child_best.left_mask.len() + child_best.right_mask.len(), ds.n_rows() - n_left);
    assert!(child_best.left_mask.iter().all(|i| best.right_mask.indices().contains(&i)));
}

#[test]
fn node_stats_is_idempotent() {
    let ds = iris_like();
    let engine = ManualSplitEngine::new(&ds);
    let a = engine.node_stats(Some(&[1, 5, 40, 77]), "sepal_width", 3.0, Criterion::Entropy).unwrap();
    let b = engine.node_stats(Some(&[1, 5, 40, 77]), "sepal_width", 3.0, Criterion::Entropy).unwrap();
    assert_eq!(a.split_stats, b.split_stats);
    assert_eq!(
        a.split_stats.information_gain.to_bits(),
        b.split_stats.information_gain.to_bits()
    );
}

#[test]
fn errors_are_user_errors() {
    let ds = four_point_dataset();
    let engine = ManualSplitEngine::new(&ds);

    let err = engine.feature_stats(None, "petal", Criterion::Gini, None).unwrap_err();
    assert_eq!(err, EngineError::UnknownFeature { name: "petal".into() });
    assert!(err.is_user_error());

    let err = engine.node_stats(Some(&[10]), "x", 1.0, Criterion::Gini).unwrap_err();
    assert!(matches!(err, EngineError::InvalidMask { index: 10, .. }));
    assert!(err.is_user_error());

    let err = engine.feature_stats(None, "flat", Criterion::Gini, None).unwrap_err();
    assert!(matches!(err, EngineError::NotSplittable { .. }));
    assert!(err.is_user_error());
}

#[test]
fn histogram_counts_cover_node() {
    let ds = iris_like();
    let engine = ManualSplitEngine::new(&ds);
    let sweep = engine.feature_stats(None, "sepal_width", Criterion::Gini, None).unwrap();
    let hist = &sweep.histogram;
    assert_eq!(hist.total_samples, ds.n_rows());
    assert_eq!(hist.counted_samples(), ds.n_rows() as u64);
    assert_eq!(hist.threshold, Some(sweep.best_threshold));
    for counts in hist.counts_by_class.values() {
        assert_eq!(counts.len(), hist.n_bins());
    }
}

#[test]
fn results_serialize_with_wire_names() {
    let ds = four_point_dataset();
    let engine = ManualSplitEngine::new(&ds);
    let sweep = engine.feature_stats(None, "x", Criterion::Gini, None).unwrap();
    let json = serde_json::to_value(&sweep).unwrap();
    assert_eq!(json["best_threshold"], 2.5);
    assert_eq!(json["best_threshold_index"], 1);
    assert_eq!(json["returned_threshold_count"], 3);
    assert_eq!(json["thresholds"][1]["left_samples_mask"], serde_json::json!([0, 1]));
    assert!(json["histogram_data"]["bins"].is_array());
}

fn spread_dataset(values: &[f64]) -> Dataset {
    let rows: Vec<Vec<f64>> = values.iter().map(|&v| vec![v]).collect();
    let labels = (0..values.len()).map(|i| i % 2).collect();
    Dataset::from_rows(&rows, labels, vec!["v".into()], vec!["a".into(), "b".into()]).unwrap()
}

proptest! {
    #[test]
    fn capped_sweep_properties(
        values in prop::collection::vec(-1000.0f64..1000.0, 3..120),
        cap in 1usize..20,
    ) {
        let ds = spread_dataset(&values);
        let config = EngineConfig::builder().max_thresholds(cap).build().unwrap();
        let engine = ManualSplitEngine::new(&ds).with_config(&config);

        match engine.feature_stats(None, "v", Criterion::Gini, None) {
            Ok(sweep) => {
                let candidates = sweep.total_unique_values - 1;
                prop_assert!(sweep.returned_count <= cap.min(candidates).max(1));
                prop_assert_eq!(sweep.returned_count, sweep.thresholds.len());
                prop_assert!(sweep.thresholds.windows(2).all(|w| w[0].threshold < w[1].threshold));
                prop_assert!(sweep.thresholds.iter().any(|t| t.threshold == sweep.best_threshold));
                prop_assert!(sweep.histogram.n_bins() <= cap + 1);

                let (lo, hi) = sweep.feature_range;
                let first = sweep.thresholds[0].threshold;
                let last = sweep.thresholds[sweep.returned_count - 1].threshold;
                prop_assert!(lo < first && first <= last && last < hi);

                let best_gain = sweep.thresholds[sweep.best_index].information_gain;
                prop_assert!(sweep.thresholds.iter().all(|t| t.information_gain <= best_gain));
                prop_assert!(sweep.thresholds[..sweep.best_index]
                    .iter()
                    .all(|t| t.information_gain < best_gain));
            }
            Err(EngineError::NotSplittable { unique, .. }) => prop_assert!(unique < 2),
            Err(e) => prop_assert!(false, "unexpected error: {e}"),
        }
    }
}
