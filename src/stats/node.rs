//! Node and split statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::impurity::{Criterion, class_counts};

/// Class make-up and impurity of one node's sample set.
///
/// Maps are dense: every declared class appears, including absent ones, so
/// callers can render a bar for each class. Probabilities sum to 1, or are all
/// zero for an empty node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStatistics {
    pub samples: usize,
    pub impurity: f64,
    pub class_distribution: BTreeMap<String, usize>,
    pub class_probabilities: BTreeMap<String, f64>,
}

/// Quality of a candidate split of a parent node into two children.
///
/// `weighted_impurity = n_left/n * left.impurity + n_right/n * right.impurity`
/// and `information_gain = parent.impurity - weighted_impurity`. The gain is
/// not assumed positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitStatistics {
    #[serde(rename = "parent_stats")]
    pub parent: NodeStatistics,
    #[serde(rename = "left_stats")]
    pub left: NodeStatistics,
    #[serde(rename = "right_stats")]
    pub right: NodeStatistics,
    pub information_gain: f64,
    pub weighted_impurity: f64,
}

/// Dense count and probability per declared class.
///
/// Labels are class indices into `class_names`; labels without a name are ignored.
pub fn class_distribution(
    labels: &[usize],
    class_names: &[String],
) -> (BTreeMap<String, usize>, BTreeMap<String, f64>) {
    let counts = class_counts(labels, class_names.len());
    let total = labels.len();

    let mut distribution = BTreeMap::new();
    let mut probabilities = BTreeMap::new();
    for (idx, name) in class_names.iter().enumerate() {
        let count = counts[idx];
        let p = if total > 0 { count as f64 / total as f64 } else { 0.0 };
        distribution.insert(name.clone(), count);
        probabilities.insert(name.clone(), p);
    }
    (distribution, probabilities)
}

impl NodeStatistics {
    /// Statistics for a node holding `labels`.
    pub fn from_labels(labels: &[usize], class_names: &[String], criterion: Criterion) -> Self {
        let counts = class_counts(labels, class_names.len());
        let (class_distribution, class_probabilities) = class_distribution(labels, class_names);
        Self {
            samples: labels.len(),
            impurity: criterion.from_counts(&counts),
            class_distribution,
            class_probabilities,
        }
    }
}

impl SplitStatistics {
    /// Compose parent and child statistics.
    ///
    /// With an empty parent, weighted impurity and gain are both `0.0`.
    pub fn new(parent: NodeStatistics, left: NodeStatistics, right: NodeStatistics) -> Self {
        let n = parent.samples;
        let (weighted_impurity, information_gain) = if n == 0 {
            (0.0, 0.0)
        } else {
            let n = n as f64;
            let weighted = (left.samples as f64 / n) * left.impurity
                + (right.samples as f64 / n) * right.impurity;
            (weighted, parent.impurity - weighted)
        };

        Self {
            parent,
            left,
            right,
            information_gain,
            weighted_impurity,
        }
    }
}

/// Statistics for splitting `parent_labels` into `left_labels` and `right_labels`.
pub fn split_statistics(
    parent_labels: &[usize],
    left_labels: &[usize],
    right_labels: &[usize],
    class_names: &[String],
    criterion: Criterion,
) -> SplitStatistics {
    SplitStatistics::new(
        NodeStatistics::from_labels(parent_labels, class_names, criterion),
        NodeStatistics::from_labels(left_labels, class_names, criterion),
        NodeStatistics::from_labels(right_labels, class_names, criterion),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn classes(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("class_{i}")).collect()
    }

    #[test]
    fn distribution_is_dense() {
        let (dist, probs) = class_distribution(&[0, 0, 2], &classes(3));
        assert_eq!(dist["class_0"], 2);
        assert_eq!(dist["class_1"], 0);
        assert_eq!(dist["class_2"], 1);
        assert_abs_diff_eq!(probs["class_1"], 0.0);
        assert_abs_diff_eq!(probs.values().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_node_has_zero_probabilities() {
        let stats = NodeStatistics::from_labels(&[], &classes(2), Criterion::Gini);
        assert_eq!(stats.samples, 0);
        assert_eq!(stats.impurity, 0.0);
        assert_eq!(stats.class_distribution.len(), 2);
        assert!(stats.class_probabilities.values().all(|&p| p == 0.0));
    }

    #[test]
    fn perfect_split_gain() {
        let stats = split_statistics(&[0, 0, 1, 1], &[0, 0], &[1, 1], &classes(2), Criterion::Gini);
        assert_abs_diff_eq!(stats.parent.impurity, 0.5);
        assert_abs_diff_eq!(stats.weighted_impurity, 0.0);
        assert_abs_diff_eq!(stats.information_gain, 0.5);
    }

    #[test]
    fn gain_formula_holds_for_useless_split() {
        // Both children keep the parent's mix: no gain at all.
        let parent = [0, 1, 0, 1];
        let stats = split_statistics(&parent, &[0, 1], &[0, 1], &classes(2), Criterion::Entropy);
        assert_abs_diff_eq!(stats.parent.impurity, 1.0);
        assert_abs_diff_eq!(stats.weighted_impurity, 1.0);
        assert_abs_diff_eq!(stats.information_gain, 0.0);
    }

    #[test]
    fn gain_is_negative_for_inconsistent_partition() {
        // Children that do not partition the parent may score worse than it.
        let stats = split_statistics(&[0, 0, 0, 1], &[0, 1], &[0, 1], &classes(2), Criterion::Gini);
        let expected_weighted = 0.5 * 0.5 + 0.5 * 0.5;
        assert_abs_diff_eq!(stats.weighted_impurity, expected_weighted);
        assert_abs_diff_eq!(stats.information_gain, 0.375 - expected_weighted);
        assert!(stats.information_gain < 0.0);
    }

    #[test]
    fn empty_parent_guards_division() {
        let stats = split_statistics(&[], &[], &[], &classes(2), Criterion::Entropy);
        assert_eq!(stats.weighted_impurity, 0.0);
        assert_eq!(stats.information_gain, 0.0);
    }

    #[test]
    fn serializes_with_stats_suffix() {
        let stats = split_statistics(&[0, 1], &[0], &[1], &classes(2), Criterion::Gini);
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("parent_stats").is_some());
        assert!(json.get("left_stats").is_some());
        assert_eq!(json["left_stats"]["class_distribution"]["class_0"], 1);
    }
}
