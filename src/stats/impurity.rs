//! Impurity criteria.

use serde::{Deserialize, Serialize};

/// Split quality criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    /// `1 - Σ p_c²`
    #[default]
    Gini,
    /// `-Σ p_c log2(p_c)`, skipping empty classes
    Entropy,
}

impl Criterion {
    /// Impurity from per-class counts. Zero for an empty node.
    pub fn from_counts(self, counts: &[usize]) -> f64 {
        let total: usize = counts.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let total = total as f64;
        let proportions = counts.iter().filter(|&&c| c > 0).map(|&c| c as f64 / total);

        match self {
            Criterion::Gini => 1.0 - proportions.map(|p| p * p).sum::<f64>(),
            // p * log2(1/p) keeps every term non-negative (no -0.0 for pure nodes)
            Criterion::Entropy => proportions.map(|p| p * (1.0 / p).log2()).sum(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Criterion::Gini => "gini",
            Criterion::Entropy => "entropy",
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Count occurrences of each class index.
///
/// The result has `max(labels) + 1` entries (or `n_classes` if larger).
pub fn class_counts(labels: &[usize], n_classes: usize) -> Vec<usize> {
    let len = labels.iter().max().map_or(0, |&m| m + 1).max(n_classes);
    let mut counts = vec![0usize; len];
    for &label in labels {
        counts[label] += 1;
    }
    counts
}

/// Impurity of a label sequence under `criterion`. Zero for an empty sequence.
pub fn impurity(labels: &[usize], criterion: Criterion) -> f64 {
    criterion.from_counts(&class_counts(labels, 0))
}

/// Gini impurity of a label sequence.
pub fn gini(labels: &[usize]) -> f64 {
    impurity(labels, Criterion::Gini)
}

/// Shannon entropy (base 2) of a label sequence.
pub fn entropy(labels: &[usize]) -> f64 {
    impurity(labels, Criterion::Entropy)
}
