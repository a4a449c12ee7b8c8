//! Per-class feature histograms for split visualization.
//!
//! [`HistogramBuilder`] bins one feature's values at a node, once per class of
//! the dataset's global class list, so a class absent from the node still
//! reports an all-zero count vector.
//!
//! # Bin edges
//!
//! - All values identical: two edges, `value ± 0.1`.
//! - Aligned to thresholds: `[min] + sorted(unique t with min < t < max) + [max]`.
//!   Used by the feature sweep so each bar spans two consecutive cut points.
//! - Otherwise: `target_bins` (capped by the sample count) equal-width bins
//!   over `[min, max]`.
//!
//! Counting follows numpy's `histogram`: bins are half-open `[e_i, e_{i+1})`
//! except the last, which also includes its upper edge. Every value lies
//! within `[min, max]`, so the counts always sum to the sample count.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::utils::{linspace, sorted_unique};

/// Half-width of the degenerate bin built around a constant feature.
const CONSTANT_HALF_WIDTH: f64 = 0.1;

/// Histogram of one feature at one node, split by class.
///
/// `bin_edges` has `k + 1` entries for `k` bins and every count vector has
/// length `k`. An empty node yields no edges and empty count vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramData {
    pub feature_values: Vec<f64>,
    pub class_labels: Vec<usize>,
    #[serde(rename = "bins")]
    pub bin_edges: Vec<f64>,
    pub counts_by_class: BTreeMap<String, Vec<u64>>,
    pub threshold: Option<f64>,
    pub total_samples: usize,
}

impl HistogramData {
    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.bin_edges.len().saturating_sub(1)
    }

    /// Sum of all per-class counts.
    pub fn counted_samples(&self) -> u64 {
        self.counts_by_class.values().flatten().sum()
    }
}

/// Builds [`HistogramData`] for a node.
///
/// # Example
///
/// ```
/// use treelab::stats::HistogramBuilder;
///
/// let classes = vec!["a".to_string(), "b".to_string()];
/// let hist = HistogramBuilder::new(&classes)
///     .target_bins(2)
///     .threshold(Some(2.5))
///     .build(&[1.0, 2.0, 3.0, 4.0], &[0, 0, 1, 1]);
///
/// assert_eq!(hist.bin_edges, vec![1.0, 2.5, 4.0]);
/// assert_eq!(hist.counts_by_class["a"], vec![2, 0]);
/// assert_eq!(hist.counts_by_class["b"], vec![0, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct HistogramBuilder<'a> {
    class_names: &'a [String],
    target_bins: usize,
    threshold: Option<f64>,
    aligned_to: Option<&'a [f64]>,
}

impl<'a> HistogramBuilder<'a> {
    /// Builder over the dataset's global class list (label `i` ↦ `class_names[i]`).
    pub fn new(class_names: &'a [String]) -> Self {
        Self {
            class_names,
            target_bins: 10,
            threshold: None,
            aligned_to: None,
        }
    }

    /// Target number of equal-width bins (capped by the sample count).
    pub fn target_bins(mut self, bins: usize) -> Self {
        self.target_bins = bins.max(1);
        self
    }

    /// Threshold recorded on the histogram for display.
    pub fn threshold(mut self, threshold: Option<f64>) -> Self {
        self.threshold = threshold;
        self
    }

    /// Align bin edges to candidate thresholds instead of equal widths.
    ///
    /// Falls back to equal-width bins when no threshold lies strictly inside
    /// the value range.
    pub fn align_to(mut self, thresholds: &'a [f64]) -> Self {
        self.aligned_to = Some(thresholds);
        self
    }

    /// Bin `values` (with matching class `labels`).
    ///
    /// Values must be finite, as [`crate::data::Dataset`] guarantees; every
    /// value then lands in exactly one bin.
    pub fn build(&self, values: &[f64], labels: &[usize]) -> HistogramData {
        debug_assert_eq!(values.len(), labels.len());
        debug_assert!(values.iter().all(|v| v.is_finite()));

        let edges = self.bin_edges(values);
        let n_bins = edges.len().saturating_sub(1);

        let counts_by_class = self
            .class_names
            .iter()
            .enumerate()
            .map(|(class, name)| {
                let class_values = values
                    .iter()
                    .zip(labels)
                    .filter(|&(_, &label)| label == class)
                    .map(|(&v, _)| v);
                (name.clone(), count_into_bins(class_values, &edges, n_bins))
            })
            .collect();

        HistogramData {
            feature_values: values.to_vec(),
            class_labels: labels.to_vec(),
            bin_edges: edges,
            counts_by_class,
            threshold: self.threshold,
            total_samples: values.len(),
        }
    }

    fn bin_edges(&self, values: &[f64]) -> Vec<f64> {
        let Some((min, max)) = min_max(values) else {
            return Vec::new();
        };

        if min == max {
            return vec![min - CONSTANT_HALF_WIDTH, min + CONSTANT_HALF_WIDTH];
        }

        if let Some(thresholds) = self.aligned_to {
            let inner: Vec<f64> = sorted_unique(thresholds)
                .into_iter()
                .filter(|&t| min < t && t < max)
                .collect();
            if !inner.is_empty() {
                let mut edges = Vec::with_capacity(inner.len() + 2);
                edges.push(min);
                edges.extend(inner);
                edges.push(max);
                return edges;
            }
        }

        let n_bins = self.target_bins.min(values.len()).max(1);
        linspace(min, max, n_bins + 1)
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Count values into `n_bins` bins delimited by `edges` (numpy semantics).
fn count_into_bins(values: impl Iterator<Item = f64>, edges: &[f64], n_bins: usize) -> Vec<u64> {
    let mut counts = vec![0u64; n_bins];
    if n_bins == 0 {
        return counts;
    }
    let first = edges[0];
    let last = edges[n_bins];

    for v in values {
        if !(first..=last).contains(&v) {
            continue;
        }
        // Number of edges <= v, minus one, is the bin whose lower edge is <= v.
        let bin = (edges.partition_point(|&e| e <= v) - 1).min(n_bins - 1);
        counts[bin] += 1;
    }
    counts
}
