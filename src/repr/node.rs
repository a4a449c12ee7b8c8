//! Tree node types.

use serde::{Deserialize, Serialize};

use crate::stats::HistogramData;
use crate::utils::argmax_first;

/// A node of a decision tree: either a terminal leaf or a binary split.
///
/// Serialized as a tagged object (`"type": "leaf" | "split"`) so trees built
/// client-side can be sent back for evaluation and prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf(LeafNode),
    Split(SplitNode),
}

/// Terminal node holding the class distribution of its training samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafNode {
    /// Number of training samples reaching this node.
    #[serde(rename = "samples")]
    pub sample_count: usize,
    pub impurity: f64,
    /// Per-output list of per-class counts or proportions.
    #[serde(rename = "value")]
    pub class_value_distribution: Vec<Vec<f64>>,
}

/// Internal node testing `feature <= threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitNode {
    #[serde(rename = "samples")]
    pub sample_count: usize,
    pub impurity: f64,
    #[serde(rename = "value", default)]
    pub class_value_distribution: Vec<Vec<f64>>,
    #[serde(rename = "feature")]
    pub feature_name: String,
    /// Column index; absent for splits authored by feature name only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_index: Option<usize>,
    pub threshold: f64,
    #[serde(rename = "histogram_data", default, skip_serializing_if = "Option::is_none")]
    pub histogram: Option<HistogramData>,
    pub left: Box<TreeNode>,
    pub right: Box<TreeNode>,
}

impl LeafNode {
    pub fn new(sample_count: usize, impurity: f64, class_value_distribution: Vec<Vec<f64>>) -> Self {
        Self {
            sample_count,
            impurity,
            class_value_distribution,
        }
    }

    /// Class distribution of the first output.
    pub fn distribution(&self) -> &[f64] {
        self.class_value_distribution
            .first()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Majority class of the first output; ties go to the lowest index.
    pub fn predicted_class(&self) -> Option<usize> {
        argmax_first(self.distribution())
    }

    /// Share of the leaf's mass held by the majority class.
    ///
    /// Works for both raw counts and proportions. Zero if the leaf is empty.
    pub fn confidence(&self) -> f64 {
        let dist = self.distribution();
        let total: f64 = dist.iter().sum();
        match self.predicted_class() {
            Some(class) if total > 0.0 => dist[class] / total,
            _ => 0.0,
        }
    }
}

impl SplitNode {
    /// Split on a named feature, without histogram data.
    ///
    /// The sample count is the sum of both children, as required by the
    /// split invariant.
    pub fn new(
        feature_name: impl Into<String>,
        threshold: f64,
        impurity: f64,
        class_value_distribution: Vec<Vec<f64>>,
        left: TreeNode,
        right: TreeNode,
    ) -> Self {
        Self {
            sample_count: left.sample_count() + right.sample_count(),
            impurity,
            class_value_distribution,
            feature_name: feature_name.into(),
            feature_index: None,
            threshold,
            histogram: None,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn with_feature_index(mut self, feature_index: usize) -> Self {
        self.feature_index = Some(feature_index);
        self
    }
}

impl TreeNode {
    pub fn sample_count(&self) -> usize {
        match self {
            TreeNode::Leaf(leaf) => leaf.sample_count,
            TreeNode::Split(split) => split.sample_count,
        }
    }

    pub fn impurity(&self) -> f64 {
        match self {
            TreeNode::Leaf(leaf) => leaf.impurity,
            TreeNode::Split(split) => split.impurity,
        }
    }

    pub fn class_value_distribution(&self) -> &[Vec<f64>] {
        match self {
            TreeNode::Leaf(leaf) => &leaf.class_value_distribution,
            TreeNode::Split(split) => &split.class_value_distribution,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf(_))
    }

    /// Total number of nodes (internal + leaves).
    pub fn n_nodes(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 1,
            TreeNode::Split(split) => 1 + split.left.n_nodes() + split.right.n_nodes(),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 1,
            TreeNode::Split(split) => split.left.n_leaves() + split.right.n_leaves(),
        }
    }

    /// Depth of the deepest leaf; a single leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Split(split) => 1 + split.left.depth().max(split.right.depth()),
        }
    }

    /// Check `left.sample_count + right.sample_count == sample_count` at every split.
    pub fn sample_counts_consistent(&self) -> bool {
        match self {
            TreeNode::Leaf(_) => true,
            TreeNode::Split(split) => {
                split.left.sample_count() + split.right.sample_count() == split.sample_count
                    && split.left.sample_counts_consistent()
                    && split.right.sample_counts_consistent()
            }
        }
    }
}

impl From<LeafNode> for TreeNode {
    fn from(leaf: LeafNode) -> Self {
        TreeNode::Leaf(leaf)
    }
}

impl From<SplitNode> for TreeNode {
    fn from(split: SplitNode) -> Self {
        TreeNode::Split(split)
    }
}
