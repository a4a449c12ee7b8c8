//! Fixed and synthetic datasets.

use rand::prelude::*;

use crate::data::Dataset;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// One feature `x = [1, 2, 3, 4]` with labels `[0, 0, 1, 1]`, plus a
/// constant feature `flat`.
///
/// The perfect split is `x <= 2.5` (Gini gain 0.5).
pub fn four_point_dataset() -> Dataset {
    let rows = [[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]].map(|r| r.to_vec());
    Dataset::from_rows(&rows, vec![0, 0, 1, 1], names(&["x", "flat"]), names(&["neg", "pos"]))
        .expect("fixture is well-formed")
}

/// Axis-aligned clusters, one per class, in class order.
///
/// Each feature of each row is drawn uniformly within `center ± spread`.
pub fn blobs(
    centers: &[Vec<f64>],
    n_per_class: usize,
    spread: f64,
    seed: u64,
    feature_names: Vec<String>,
    class_names: Vec<String>,
) -> Dataset {
    assert!(spread >= 0.0);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut rows = Vec::with_capacity(centers.len() * n_per_class);
    let mut labels = Vec::with_capacity(centers.len() * n_per_class);
    for (class, center) in centers.iter().enumerate() {
        for _ in 0..n_per_class {
            let row = center
                .iter()
                .map(|&c| c + (rng.r#gen::<f64>() * 2.0 - 1.0) * spread)
                .collect();
            rows.push(row);
            labels.push(class);
        }
    }

    Dataset::from_rows(&rows, labels, feature_names, class_names).expect("blob shapes are consistent")
}

/// Three well-separated 4-feature classes named like the iris dataset.
///
/// Every feature except `sepal_width` separates the classes perfectly.
pub fn iris_like() -> Dataset {
    let centers = vec![
        vec![5.0, 3.4, 1.5, 0.25],
        vec![5.9, 2.8, 4.3, 1.3],
        vec![6.6, 3.0, 5.5, 2.0],
    ];
    blobs(
        &centers,
        30,
        0.25,
        2025,
        names(&["sepal_length", "sepal_width", "petal_length", "petal_width"]),
        names(&["setosa", "versicolor", "virginica"]),
    )
}

/// Deterministic shuffled train/test split.
///
/// Returns `(train_idx, test_idx)`. With at least two rows both sides are
/// non-empty.
pub fn split_indices(rows: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    assert!((0.0..1.0).contains(&test_fraction));
    let mut idx: Vec<usize> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    idx.shuffle(&mut rng);

    let mut test_len = ((rows as f64) * test_fraction).round() as usize;
    if rows >= 2 {
        test_len = test_len.clamp(1, rows - 1);
    }
    let (test, train) = idx.split_at(test_len.min(rows));
    (train.to_vec(), test.to_vec())
}
