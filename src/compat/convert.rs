//! Conversion from a flat trained tree to the [`TreeNode`] domain model.
//!
//! The flat representation is an arena indexed by node id; conversion
//! materializes it into an owned tree, root first. Sample sets are threaded
//! top-down from the full index range at the root, so each split's histogram
//! shows the population that actually reaches it.

use std::borrow::Cow;

use ndarray::ArrayView2;

use super::TrainedTree;
use crate::data::{Dataset, SampleSet};
use crate::error::{EngineError, Result};
use crate::repr::{LeafNode, SplitNode, TreeNode};
use crate::stats::HistogramBuilder;

/// Default target bin count for split histograms.
pub const DEFAULT_HISTOGRAM_BINS: usize = 10;

/// Converts a [`TrainedTree`] into a [`TreeNode`], attaching histograms.
#[derive(Debug, Clone)]
pub struct TreeConverter<'a> {
    trained: &'a TrainedTree,
    features: ArrayView2<'a, f64>,
    labels: &'a [usize],
    feature_names: &'a [String],
    class_names: Cow<'a, [String]>,
    histogram_bins: usize,
}

impl<'a> TreeConverter<'a> {
    /// Converter over the dataset the tree was trained on.
    pub fn new(trained: &'a TrainedTree, dataset: &'a Dataset) -> Self {
        Self {
            trained,
            features: dataset.features(),
            labels: dataset.labels(),
            feature_names: dataset.feature_names(),
            class_names: Cow::Borrowed(dataset.class_names()),
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }

    /// Converter over raw training arrays.
    ///
    /// Histogram classes are named by their label index.
    ///
    /// # Errors
    ///
    /// [`EngineError::ConfigurationMismatch`] if `feature_names` does not match
    /// the column count, or `labels` the row count.
    pub fn from_parts(
        trained: &'a TrainedTree,
        feature_names: &'a [String],
        features: ArrayView2<'a, f64>,
        labels: &'a [usize],
    ) -> Result<Self> {
        if feature_names.len() != features.ncols() {
            log::error!(
                "tree conversion given {} feature names for {} columns",
                feature_names.len(),
                features.ncols()
            );
            return Err(EngineError::ConfigurationMismatch {
                what: "feature_names",
                found: feature_names.len(),
                expected: features.ncols(),
            });
        }
        if labels.len() != features.nrows() {
            return Err(EngineError::ConfigurationMismatch {
                what: "labels",
                found: labels.len(),
                expected: features.nrows(),
            });
        }

        let n_classes = labels.iter().max().map_or(0, |&m| m + 1);
        let class_names = (0..n_classes).map(|c| c.to_string()).collect();

        Ok(Self {
            trained,
            features,
            labels,
            feature_names,
            class_names: Cow::Owned(class_names),
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        })
    }

    /// Target bin count for split histograms.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins.max(1);
        self
    }

    /// Run the conversion.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidTree`] if the flat tree is structurally broken.
    pub fn convert(&self) -> Result<TreeNode> {
        self.trained.validate(self.features.ncols())?;
        let root_samples = SampleSet::all(self.features.nrows());
        Ok(self.convert_node(0, root_samples))
    }

    fn convert_node(&self, node: usize, samples: SampleSet) -> TreeNode {
        let tree = self.trained;
        let sample_count = tree.n_node_samples[node];
        let impurity = tree.impurity[node];
        let value = tree.value[node].clone();

        if tree.is_leaf(node) {
            return LeafNode::new(sample_count, impurity, value).into();
        }

        // validate() guarantees ids are in range.
        let feature = tree.feature[node] as usize;
        let threshold = tree.threshold[node];
        let left_id = tree.children_left[node] as usize;
        let right_id = tree.children_right[node] as usize;

        let histogram = (!samples.is_empty()).then(|| {
            let values: Vec<f64> = samples.iter().map(|i| self.features[[i, feature]]).collect();
            let labels: Vec<usize> = samples.iter().map(|i| self.labels[i]).collect();
            HistogramBuilder::new(&self.class_names)
                .target_bins(self.histogram_bins)
                .threshold(Some(threshold))
                .build(&values, &labels)
        });

        let (left_samples, right_samples) = samples.partition(self.features.column(feature), threshold);
        let left = self.convert_node(left_id, left_samples);
        let right = self.convert_node(right_id, right_samples);

        TreeNode::Split(SplitNode {
            sample_count,
            impurity,
            class_value_distribution: value,
            feature_name: self.feature_names[feature].clone(),
            feature_index: Some(feature),
            threshold,
            histogram,
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}

/// Convert `trained` using raw training arrays.
///
/// Shorthand for [`TreeConverter::from_parts`] followed by
/// [`TreeConverter::convert`].
pub fn convert<'a>(
    trained: &'a TrainedTree,
    feature_names: &'a [String],
    features: ArrayView2<'a, f64>,
    labels: &'a [usize],
) -> Result<TreeNode> {
    TreeConverter::from_parts(trained, feature_names, features, labels)?.convert()
}
