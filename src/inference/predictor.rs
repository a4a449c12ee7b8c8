//! Traversal of [`TreeNode`] trees for prediction.
//!
//! Splits are resolved by feature *name*, never by the optional stored
//! column index, so converted trees and hand-built trees predict the same way.

use std::collections::HashMap;

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::repr::{LeafNode, TreeNode, goes_left};
use crate::utils::Parallelism;

/// One step of a traced prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instruction {
    Left,
    Right,
    /// Reached a leaf.
    Stop,
}

/// A single prediction with the path that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracedPrediction {
    pub predicted_class: String,
    #[serde(rename = "predicted_class_index")]
    pub predicted_index: usize,
    pub confidence: f64,
    pub instructions: Vec<Instruction>,
}

/// Batch and traced prediction over one tree.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use treelab::inference::TreePredictor;
/// use treelab::repr::{LeafNode, SplitNode, TreeNode};
///
/// let tree: TreeNode = SplitNode::new(
///     "x",
///     5.0,
///     0.5,
///     vec![],
///     LeafNode::new(2, 0.0, vec![vec![2.0, 0.0]]).into(),
///     LeafNode::new(1, 0.0, vec![vec![0.0, 1.0]]).into(),
/// )
/// .into();
///
/// let names = vec!["x".to_string()];
/// let predictor = TreePredictor::new(&tree);
/// let classes = predictor.predict(array![[4.0], [5.0], [6.0]].view(), &names).unwrap();
/// assert_eq!(classes, vec![0, 0, 1]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TreePredictor<'t> {
    tree: &'t TreeNode,
    parallelism: Parallelism,
}

impl<'t> TreePredictor<'t> {
    pub fn new(tree: &'t TreeNode) -> Self {
        Self { tree, parallelism: Parallelism::Sequential }
    }

    /// Allow rows to be predicted in parallel.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn tree(&self) -> &'t TreeNode {
        self.tree
    }

    /// Predict the class index of every row.
    ///
    /// Columns of `rows` are named by `feature_names`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidRow`] if the row width differs from the number
    ///   of feature names (reported against the first row)
    /// - [`EngineError::UnknownFeature`] if a split names a feature not in
    ///   `feature_names`
    pub fn predict(&self, rows: ArrayView2<'_, f64>, feature_names: &[String]) -> Result<Vec<usize>> {
        if rows.nrows() > 0 && rows.ncols() != feature_names.len() {
            return Err(EngineError::InvalidRow {
                row: 0,
                found: rows.ncols(),
                expected: feature_names.len(),
            });
        }

        let columns: HashMap<&str, usize> = feature_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let row_ids: Vec<usize> = (0..rows.nrows()).collect();
        self.parallelism
            .map_collect(&row_ids, |&i| {
                let row = rows.row(i);
                let leaf = self.find_leaf(|name| lookup_column(&columns, row, name), |_| {})?;
                Ok(leaf_class(leaf))
            })
            .into_iter()
            .collect()
    }

    /// Predict one row of named values, recording every branch taken.
    ///
    /// Without `class_names`, the class label is the index rendered as text.
    ///
    /// # Errors
    ///
    /// [`EngineError::MissingFeature`] if `point` lacks a feature the path
    /// splits on.
    pub fn predict_with_trace(
        &self,
        point: &HashMap<String, f64>,
        class_names: Option<&[String]>,
    ) -> Result<TracedPrediction> {
        let mut instructions = Vec::new();
        let leaf = self.find_leaf(
            |name| {
                point
                    .get(name)
                    .copied()
                    .ok_or_else(|| EngineError::MissingFeature { name: name.to_string() })
            },
            |step| instructions.push(step),
        )?;
        instructions.push(Instruction::Stop);

        let predicted_index = leaf_class(leaf);
        let predicted_class = class_names
            .and_then(|names| names.get(predicted_index))
            .cloned()
            .unwrap_or_else(|| predicted_index.to_string());

        Ok(TracedPrediction {
            predicted_class,
            predicted_index,
            confidence: leaf.confidence(),
            instructions,
        })
    }

    /// Walk from the root to a leaf, reading split values through `value_of`.
    fn find_leaf<V, S>(&self, mut value_of: V, mut on_step: S) -> Result<&'t LeafNode>
    where
        V: FnMut(&str) -> Result<f64>,
        S: FnMut(Instruction),
    {
        let mut node = self.tree;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return Ok(leaf),
                TreeNode::Split(split) => {
                    let value = value_of(&split.feature_name)?;
                    if goes_left(value, split.threshold) {
                        on_step(Instruction::Left);
                        node = split.left.as_ref();
                    } else {
                        on_step(Instruction::Right);
                        node = split.right.as_ref();
                    }
                }
            }
        }
    }
}

fn lookup_column(columns: &HashMap<&str, usize>, row: ArrayView1<'_, f64>, name: &str) -> Result<f64> {
    columns
        .get(name)
        .map(|&i| row[i])
        .ok_or_else(|| EngineError::UnknownFeature { name: name.to_string() })
}

/// Majority class; an empty distribution falls back to class 0.
fn leaf_class(leaf: &LeafNode) -> usize {
    leaf.predicted_class().unwrap_or(0)
}

/// Predict every row of `rows` with `tree`.
///
/// See [`TreePredictor::predict`].
pub fn predict(
    tree: &TreeNode,
    rows: ArrayView2<'_, f64>,
    feature_names: &[String],
    parallelism: Parallelism,
) -> Result<Vec<usize>> {
    TreePredictor::new(tree)
        .with_parallelism(parallelism)
        .predict(rows, feature_names)
}

/// Trace a single named-value prediction through `tree`.
///
/// See [`TreePredictor::predict_with_trace`].
pub fn predict_with_trace(
    tree: &TreeNode,
    point: &HashMap<String, f64>,
    class_names: Option<&[String]>,
) -> Result<TracedPrediction> {
    TreePredictor::new(tree).predict_with_trace(point, class_names)
}
