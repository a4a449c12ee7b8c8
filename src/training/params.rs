//! Training parameters for the external tree trainer.

use serde::{Deserialize, Serialize};

use crate::stats::Criterion;

/// Rule for the number of features considered per split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    /// `sqrt(n_features)`
    Sqrt,
    /// `log2(n_features)`
    Log2,
}

impl MaxFeatures {
    /// Number of features to consider out of `n_features` (at least one).
    pub fn resolve(self, n_features: usize) -> usize {
        let n = n_features as f64;
        let k = match self {
            MaxFeatures::Sqrt => n.sqrt(),
            MaxFeatures::Log2 => n.log2(),
        };
        (k.floor() as usize).clamp(1, n_features.max(1))
    }
}

/// Decision tree hyperparameters.
///
/// Serialized form is part of the model cache key.
///
/// # Example
///
/// ```
/// use treelab::training::TrainingParams;
/// use treelab::stats::Criterion;
///
/// let params = TrainingParams {
///     max_depth: Some(3),
///     criterion: Criterion::Entropy,
///     ..Default::default()
/// };
/// params.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    /// Maximum tree depth; `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    pub criterion: Criterion,
    /// Minimum samples required to split an internal node.
    pub min_samples_split: usize,
    /// Minimum samples required at a leaf.
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` means all.
    pub max_features: Option<MaxFeatures>,
    pub random_state: Option<u64>,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            max_depth: Some(5),
            criterion: Criterion::Gini,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_state: Some(2025),
        }
    }
}

impl TrainingParams {
    /// Validate parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range parameter.
    pub fn validate(&self) -> Result<(), ParamValidationError> {
        if self.max_depth == Some(0) {
            return Err(ParamValidationError::InvalidMaxDepth(0));
        }
        if self.min_samples_split < 2 {
            return Err(ParamValidationError::InvalidMinSamplesSplit(self.min_samples_split));
        }
        if self.min_samples_leaf < 1 {
            return Err(ParamValidationError::InvalidMinSamplesLeaf(self.min_samples_leaf));
        }
        Ok(())
    }
}

/// Parameter validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamValidationError {
    /// max_depth must be >= 1.
    #[error("max_depth must be >= 1, got {0}")]
    InvalidMaxDepth(usize),

    /// min_samples_split must be >= 2.
    #[error("min_samples_split must be >= 2, got {0}")]
    InvalidMinSamplesSplit(usize),

    /// min_samples_leaf must be >= 1.
    #[error("min_samples_leaf must be >= 1, got {0}")]
    InvalidMinSamplesLeaf(usize),

    /// test_size must be in [0.1, 0.5].
    #[error("test_size must be in [0.1, 0.5], got {0}")]
    InvalidTestSize(f64),
}
