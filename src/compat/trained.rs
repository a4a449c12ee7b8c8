//! Flat array-based trained tree, as produced by an external CART trainer.
//!
//! The layout mirrors the parallel arrays exposed by common CART
//! implementations: node `0` is the root and every per-node attribute lives in
//! its own array indexed by node id.

use serde::{Deserialize, Serialize};

use crate::data::Dataset;
use crate::error::{EngineError, Result};
use crate::training::TrainingParams;

/// Child id used by trainers to mark "no child".
pub const LEAF_SENTINEL: i64 = -1;

/// A fitted tree in flat (arena + index) form.
///
/// A node is a leaf when `children_left[id] == children_right[id]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    /// Split feature per node (ignored for leaves).
    pub feature: Vec<i64>,
    /// Split threshold per node (ignored for leaves).
    pub threshold: Vec<f64>,
    pub n_node_samples: Vec<usize>,
    pub impurity: Vec<f64>,
    /// Per node: one per-class count/weight list per output.
    pub value: Vec<Vec<Vec<f64>>>,
}

impl TrainedTree {
    /// A single-leaf tree.
    pub fn leaf(n_samples: usize, impurity: f64, value: Vec<f64>) -> Self {
        Self {
            children_left: vec![LEAF_SENTINEL],
            children_right: vec![LEAF_SENTINEL],
            feature: vec![-2],
            threshold: vec![-2.0],
            n_node_samples: vec![n_samples],
            impurity: vec![impurity],
            value: vec![vec![value]],
        }
    }

    /// Number of nodes (internal + leaves).
    pub fn n_nodes(&self) -> usize {
        self.children_left.len()
    }

    #[inline]
    pub fn is_leaf(&self, node: usize) -> bool {
        self.children_left[node] == self.children_right[node]
    }

    /// Check array lengths, child ids and feature ids.
    ///
    /// Walks the tree from the root and rejects dangling children, feature
    /// ids outside `[0, n_features)` and nodes reachable twice (shared
    /// subtrees or cycles).
    pub fn validate(&self, n_features: usize) -> Result<()> {
        let n = self.n_nodes();
        if n == 0 {
            return Err(EngineError::InvalidTree { node: 0, reason: "tree has no nodes".into() });
        }

        let lengths = [
            ("children_right", self.children_right.len()),
            ("feature", self.feature.len()),
            ("threshold", self.threshold.len()),
            ("n_node_samples", self.n_node_samples.len()),
            ("impurity", self.impurity.len()),
            ("value", self.value.len()),
        ];
        for (name, len) in lengths {
            if len != n {
                return Err(EngineError::InvalidTree {
                    node: 0,
                    reason: format!("{name} has {len} entries for {n} nodes"),
                });
            }
        }

        let mut visited = vec![false; n];
        let mut stack = vec![0usize];
        while let Some(node) = stack.pop() {
            if visited[node] {
                return Err(EngineError::InvalidTree {
                    node,
                    reason: "node reached by more than one path".into(),
                });
            }
            visited[node] = true;

            if self.is_leaf(node) {
                continue;
            }

            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(EngineError::InvalidTree {
                    node,
                    reason: format!("feature {feature} out of range for {n_features} features"),
                });
            }

            for (side, child) in [("left", self.children_left[node]), ("right", self.children_right[node])] {
                if child < 0 || child as usize >= n {
                    return Err(EngineError::InvalidTree {
                        node,
                        reason: format!("{side} child {child} out of range for {n} nodes"),
                    });
                }
                stack.push(child as usize);
            }
        }

        Ok(())
    }
}

/// Fits a flat tree from training data.
///
/// The CART algorithm itself lives outside this crate; implementations wrap
/// whatever training routine the host application uses.
pub trait TreeTrainer {
    fn fit(&self, train: &Dataset, params: &TrainingParams) -> Result<TrainedTree>;
}

impl<F> TreeTrainer for F
where
    F: Fn(&Dataset, &TrainingParams) -> Result<TrainedTree>,
{
    fn fit(&self, train: &Dataset, params: &TrainingParams) -> Result<TrainedTree> {
        self(train, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> TrainedTree {
        TrainedTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![2.5, -2.0, -2.0],
            n_node_samples: vec![4, 2, 2],
            impurity: vec![0.5, 0.0, 0.0],
            value: vec![vec![vec![2.0, 2.0]], vec![vec![2.0, 0.0]], vec![vec![0.0, 2.0]]],
        }
    }

    #[test]
    fn valid_tree_passes() {
        let tree = stump();
        assert_eq!(tree.n_nodes(), 3);
        assert!(!tree.is_leaf(0));
        assert!(tree.is_leaf(2));
        tree.validate(1).unwrap();
        TrainedTree::leaf(3, 0.0, vec![3.0]).validate(0).unwrap();
    }

    #[test]
    fn dangling_child_is_rejected() {
        let mut tree = stump();
        tree.children_right[0] = 7;
        let err = tree.validate(1).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTree { node: 0, .. }));
        assert!(err.to_string().contains("right child 7"));
    }

    #[test]
    fn feature_out_of_range_is_rejected() {
        let err = stump().validate(0).unwrap_err();
        assert!(err.to_string().contains("feature 0 out of range"));
    }

    #[test]
    fn cycle_is_rejected() {
        let mut tree = stump();
        tree.children_right[0] = 0;
        let err = tree.validate(1).unwrap_err();
        assert!(err.to_string().contains("more than one path"));
    }

    #[test]
    fn ragged_arrays_are_rejected() {
        let mut tree = stump();
        tree.impurity.pop();
        let err = tree.validate(1).unwrap_err();
        assert!(err.to_string().contains("impurity has 2 entries for 3 nodes"));
    }

    #[test]
    fn deserializes_from_json() {
        let json = serde_json::to_string(&stump()).unwrap();
        let back: TrainedTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stump());
    }
}
