//! Trained-tree conversion and prediction agree with each other.

use ndarray::array;

use treelab::compat::{TrainedTree, TreeConverter, TreeTrainer, convert};
use treelab::data::{Dataset, SampleSet};
use treelab::inference::{Instruction, TreePredictor, predict_with_trace};
use treelab::repr::{LeafNode, TreeNode};
use treelab::testing::{GreedyTrainer, blobs, iris_like};
use treelab::{Parallelism, TrainingParams};

/// Rows held by each leaf, partitioned top-down from the root the way the
/// converter threads samples.
fn leaf_populations<'t>(
    node: &'t TreeNode,
    samples: SampleSet,
    ds: &Dataset,
    out: &mut Vec<(&'t LeafNode, SampleSet)>,
) {
    match node {
        TreeNode::Leaf(leaf) => out.push((leaf, samples)),
        TreeNode::Split(split) => {
            let col = split.feature_index.expect("converted splits carry their column");
            let (left, right) = samples.partition(ds.column(col), split.threshold);
            leaf_populations(&split.left, left, ds, out);
            leaf_populations(&split.right, right, ds, out);
        }
    }
}

/// Most frequent label among `samples`; lowest class wins ties.
fn majority(ds: &Dataset, samples: &SampleSet) -> usize {
    let mut counts = vec![0usize; ds.n_classes()];
    for label in ds.gather_labels(samples) {
        counts[label] += 1;
    }
    (0..counts.len()).max_by_key(|&c| (counts[c], std::cmp::Reverse(c))).unwrap()
}

/// Every training row is predicted as the majority class of the leaf holding it.
fn assert_predictions_match_leaf_majority(tree: &TreeNode, ds: &Dataset, predicted: &[usize]) {
    let mut leaves = Vec::new();
    leaf_populations(tree, SampleSet::all(ds.n_rows()), ds, &mut leaves);

    let covered: usize = leaves.iter().map(|(_, samples)| samples.len()).sum();
    assert_eq!(covered, ds.n_rows());
    for (leaf, samples) in leaves {
        assert_eq!(leaf.sample_count, samples.len());
        if samples.is_empty() {
            continue;
        }
        let expected = majority(ds, &samples);
        for i in samples.iter() {
            assert_eq!(predicted[i], expected, "row {i}");
        }
    }
}

#[test]
fn predict_reproduces_leaf_majority_on_training_rows() {
    let ds = iris_like();
    let params = TrainingParams { max_depth: Some(3), ..Default::default() };
    let trained = GreedyTrainer.fit(&ds, &params).unwrap();
    let tree = TreeConverter::new(&trained, &ds).convert().unwrap();

    let predicted = TreePredictor::new(&tree)
        .with_parallelism(Parallelism::Parallel)
        .predict(ds.features(), ds.feature_names())
        .unwrap();
    assert_predictions_match_leaf_majority(&tree, &ds, &predicted);
    assert!(tree.sample_counts_consistent());
    assert_eq!(tree.sample_count(), ds.n_rows());
}

#[test]
fn overlapping_blobs_round_trip() {
    let centers = vec![vec![0.0, 0.0], vec![0.5, 0.5], vec![1.0, 0.0]];
    let ds = blobs(
        &centers,
        25,
        0.6,
        11,
        vec!["a".into(), "b".into()],
        vec!["p".into(), "q".into(), "r".into()],
    );
    let params = TrainingParams { max_depth: Some(4), min_samples_leaf: 3, ..Default::default() };
    let trained = GreedyTrainer.fit(&ds, &params).unwrap();
    let tree = TreeConverter::new(&trained, &ds).histogram_bins(5).convert().unwrap();

    let predicted = TreePredictor::new(&tree).predict(ds.features(), ds.feature_names()).unwrap();
    assert_predictions_match_leaf_majority(&tree, &ds, &predicted);

    // Every split histogram sees exactly the rows that reach its node.
    fn check(node: &TreeNode) {
        if let TreeNode::Split(split) = node {
            let hist = split.histogram.as_ref().unwrap();
            assert_eq!(hist.total_samples, split.sample_count);
            assert_eq!(hist.counted_samples(), split.sample_count as u64);
            assert!(hist.n_bins() <= 5);
            check(&split.left);
            check(&split.right);
        }
    }
    check(&tree);
}

#[test]
fn value_equal_to_threshold_goes_left_everywhere() {
    let trained = TrainedTree {
        children_left: vec![1, -1, -1],
        children_right: vec![2, -1, -1],
        feature: vec![0, -2, -2],
        threshold: vec![5.0, -2.0, -2.0],
        n_node_samples: vec![3, 2, 1],
        impurity: vec![0.444, 0.0, 0.0],
        value: vec![vec![vec![2.0, 1.0]], vec![vec![2.0, 0.0]], vec![vec![0.0, 1.0]]],
    };
    let x = array![[4.0], [5.0], [6.0]];
    let names = vec!["f".to_string()];
    let tree = convert(&trained, &names, x.view(), &[0, 0, 1]).unwrap();

    // Conversion: rows 0 and 1 reach the left leaf.
    let TreeNode::Split(split) = &tree else { panic!("expected split") };
    assert_eq!(split.left.sample_count(), 2);
    let hist = split.histogram.as_ref().unwrap();
    assert_eq!(hist.threshold, Some(5.0));

    // Prediction: the row equal to the threshold also goes left.
    let predicted = TreePredictor::new(&tree).predict(x.view(), &names).unwrap();
    assert_eq!(predicted, vec![0, 0, 1]);

    let point = [("f".to_string(), 5.0)].into_iter().collect();
    let traced = predict_with_trace(&tree, &point, None).unwrap();
    assert_eq!(traced.instructions, vec![Instruction::Left, Instruction::Stop]);
    assert_eq!(traced.confidence, 1.0);
}

#[test]
fn converted_tree_json_round_trip() {
    let ds: Dataset = iris_like();
    let trained = GreedyTrainer.fit(&ds, &TrainingParams::default()).unwrap();
    let tree = TreeConverter::new(&trained, &ds).convert().unwrap();

    let json = serde_json::to_string(&tree).unwrap();
    let back: TreeNode = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tree);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["type"], "split");
    assert!(value["histogram_data"]["counts_by_class"]["setosa"].is_array());
}
