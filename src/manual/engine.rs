//! Split statistics for interactive, node-by-node tree building.

use std::borrow::Cow;

use serde::Serialize;

use super::thresholds::{candidate_thresholds, downsample_thresholds};
use crate::config::EngineConfig;
use crate::data::{Dataset, SampleSet};
use crate::error::{EngineError, Result};
use crate::stats::{Criterion, HistogramBuilder, HistogramData, SplitStatistics, split_statistics};
use crate::utils::{Parallelism, argmax_first, sorted_unique};

/// Statistics for one proposed split of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStatsResult {
    pub feature: String,
    pub feature_index: usize,
    pub threshold: f64,
    pub split_stats: SplitStatistics,
    #[serde(rename = "histogram_data")]
    pub histogram: HistogramData,
    /// Rows routed left (`value <= threshold`).
    #[serde(rename = "left_samples_mask")]
    pub left_mask: SampleSet,
    /// Rows routed right (`value > threshold`).
    #[serde(rename = "right_samples_mask")]
    pub right_mask: SampleSet,
}

/// One entry of a threshold sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdStatistics {
    pub threshold: f64,
    pub information_gain: f64,
    pub split_stats: SplitStatistics,
    #[serde(rename = "left_samples_mask")]
    pub left_mask: SampleSet,
    #[serde(rename = "right_samples_mask")]
    pub right_mask: SampleSet,
}

/// Result of sweeping all (or a sample of) thresholds of a feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureStatsResult {
    pub feature: String,
    pub feature_index: usize,
    /// Sorted by threshold.
    pub thresholds: Vec<ThresholdStatistics>,
    pub best_threshold: f64,
    #[serde(rename = "best_threshold_index")]
    pub best_index: usize,
    /// `(min, max)` of the feature at this node.
    pub feature_range: (f64, f64),
    #[serde(rename = "histogram_data")]
    pub histogram: HistogramData,
    pub total_unique_values: usize,
    #[serde(rename = "returned_threshold_count")]
    pub returned_count: usize,
}

/// Computes split statistics over a fixed dataset.
///
/// Every operation is a pure function of its arguments and the dataset, so
/// one engine can serve concurrent requests for different nodes.
///
/// # Example
///
/// ```
/// use treelab::data::Dataset;
/// use treelab::manual::ManualSplitEngine;
/// use treelab::stats::Criterion;
///
/// let ds = Dataset::from_rows(
///     &[vec![1.0], vec![2.0], vec![3.0], vec![4.0]],
///     vec![0, 0, 1, 1],
///     vec!["x".into()],
///     vec!["a".into(), "b".into()],
/// )
/// .unwrap();
/// let engine = ManualSplitEngine::new(&ds);
///
/// let sweep = engine.feature_stats(None, "x", Criterion::Gini, None).unwrap();
/// assert_eq!(sweep.best_threshold, 2.5);
///
/// let split = engine.node_stats(None, "x", 2.5, Criterion::Gini).unwrap();
/// assert_eq!(split.left_mask.indices(), &[0, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct ManualSplitEngine<'a> {
    dataset: Cow<'a, Dataset>,
    histogram_bins: usize,
    max_thresholds: usize,
    parallelism: Parallelism,
}

impl<'a> ManualSplitEngine<'a> {
    /// Engine borrowing `dataset`, with default configuration.
    pub fn new(dataset: &'a Dataset) -> Self {
        Self::from_cow(Cow::Borrowed(dataset))
    }

    fn from_cow(dataset: Cow<'a, Dataset>) -> Self {
        let defaults = EngineConfig::default();
        Self {
            dataset,
            histogram_bins: defaults.histogram_bins,
            max_thresholds: defaults.max_thresholds,
            parallelism: defaults.parallelism,
        }
    }

    /// Take histogram resolution, threshold cap and parallelism from `config`.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.histogram_bins = config.histogram_bins;
        self.max_thresholds = config.max_thresholds;
        self.parallelism = config.parallelism;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn feature_names(&self) -> &[String] {
        self.dataset.feature_names()
    }

    pub fn class_names(&self) -> &[String] {
        self.dataset.class_names()
    }

    /// Statistics for splitting a node on `feature <= threshold`.
    ///
    /// `parent_mask == None` means the root (every row).
    ///
    /// # Errors
    ///
    /// - [`EngineError::UnknownFeature`] if `feature` is not in the dataset
    /// - [`EngineError::InvalidMask`] if the mask references a missing row
    pub fn node_stats(
        &self,
        parent_mask: Option<&[usize]>,
        feature: &str,
        threshold: f64,
        criterion: Criterion,
    ) -> Result<NodeStatsResult> {
        let ds = self.dataset();
        let feature_index = ds.feature_index(feature)?;
        let samples = SampleSet::from_mask(parent_mask, ds.n_rows())?;

        let values = ds.gather_values(&samples, feature_index);
        let labels = ds.gather_labels(&samples);

        let (split_stats, left_mask, right_mask) =
            self.evaluate_threshold(&samples, &labels, feature_index, threshold, criterion);

        let histogram = HistogramBuilder::new(ds.class_names())
            .target_bins(self.histogram_bins)
            .threshold(Some(threshold))
            .build(&values, &labels);

        Ok(NodeStatsResult {
            feature: feature.to_string(),
            feature_index,
            threshold,
            split_stats,
            histogram,
            left_mask,
            right_mask,
        })
    }

    /// Statistics for every candidate threshold of `feature` at a node.
    ///
    /// Candidates are midpoints between consecutive unique values. When there
    /// are more than `max_thresholds` (engine default if `None`), they are
    /// down-sampled by percentile. The best threshold maximizes information
    /// gain, first occurrence winning ties.
    ///
    /// # Errors
    ///
    /// - [`EngineError::UnknownFeature`] if `feature` is not in the dataset
    /// - [`EngineError::InvalidMask`] if the mask references a missing row
    /// - [`EngineError::NotSplittable`] if the feature has fewer than two
    ///   unique values at this node
    pub fn feature_stats(
        &self,
        parent_mask: Option<&[usize]>,
        feature: &str,
        criterion: Criterion,
        max_thresholds: Option<usize>,
    ) -> Result<FeatureStatsResult> {
        let ds = self.dataset();
        let feature_index = ds.feature_index(feature)?;
        let samples = SampleSet::from_mask(parent_mask, ds.n_rows())?;

        let values = ds.gather_values(&samples, feature_index);
        let labels = ds.gather_labels(&samples);

        let unique = sorted_unique(&values);
        if unique.len() < 2 {
            return Err(EngineError::NotSplittable {
                feature: feature.to_string(),
                unique: unique.len(),
            });
        }

        let all_candidates = candidate_thresholds(&unique);
        let cap = max_thresholds.unwrap_or(self.max_thresholds).max(1);
        let candidates = downsample_thresholds(&all_candidates, cap);
        if candidates.len() < all_candidates.len() {
            log::debug!(
                "feature '{}': sampled {} of {} candidate thresholds",
                feature,
                candidates.len(),
                all_candidates.len()
            );
        }

        let thresholds: Vec<ThresholdStatistics> = self.parallelism.map_collect(&candidates, |&t| {
            let (split_stats, left_mask, right_mask) =
                self.evaluate_threshold(&samples, &labels, feature_index, t, criterion);
            ThresholdStatistics {
                threshold: t,
                information_gain: split_stats.information_gain,
                split_stats,
                left_mask,
                right_mask,
            }
        });

        let gains: Vec<f64> = thresholds.iter().map(|t| t.information_gain).collect();
        // At least one candidate exists since there are two unique values.
        let best_index = argmax_first(&gains).unwrap_or(0);
        let best_threshold = thresholds[best_index].threshold;

        // Bars follow the split points only while every candidate is kept;
        // a down-sampled sweep gets one equal-width bin per returned threshold.
        let mut builder = HistogramBuilder::new(ds.class_names())
            .target_bins(thresholds.len())
            .threshold(Some(best_threshold));
        if candidates.len() == all_candidates.len() {
            builder = builder.align_to(&all_candidates);
        }
        let histogram = builder.build(&values, &labels);

        let feature_range = (unique[0], unique[unique.len() - 1]);

        Ok(FeatureStatsResult {
            feature: feature.to_string(),
            feature_index,
            returned_count: thresholds.len(),
            thresholds,
            best_threshold,
            best_index,
            feature_range,
            histogram,
            total_unique_values: unique.len(),
        })
    }

    /// Partition `samples` at `threshold` and score the split.
    ///
    /// `labels` are the labels of `samples`, in order.
    fn evaluate_threshold(
        &self,
        samples: &SampleSet,
        labels: &[usize],
        feature_index: usize,
        threshold: f64,
        criterion: Criterion,
    ) -> (SplitStatistics, SampleSet, SampleSet) {
        let ds = self.dataset();
        let (left, right) = samples.partition(ds.column(feature_index), threshold);
        let left_labels = ds.gather_labels(&left);
        let right_labels = ds.gather_labels(&right);
        let stats = split_statistics(labels, &left_labels, &right_labels, ds.class_names(), criterion);
        (stats, left, right)
    }
}

impl ManualSplitEngine<'static> {
    /// Engine owning `dataset`.
    pub fn owned(dataset: Dataset) -> Self {
        Self::from_cow(Cow::Owned(dataset))
    }
}
