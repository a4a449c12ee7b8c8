//! Dataset references and the provider boundary.

use serde::{Deserialize, Serialize};

use super::Dataset;
use crate::error::Result;
use crate::training::ParamValidationError;

fn default_test_size() -> f64 {
    0.25
}

fn default_random_state() -> u64 {
    2025
}

/// Identifies a dataset and how it is split into train and test rows.
///
/// Serialized form is part of the model cache key, so two descriptors that
/// compare equal always produce the same key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatasetDescriptor {
    /// A dataset the provider knows by name (e.g. `"iris"`).
    Predefined {
        name: String,
        #[serde(default = "default_test_size")]
        test_size: f64,
        #[serde(default = "default_random_state")]
        random_state: u64,
    },
    /// A dataset supplied inline by the caller.
    Inline {
        #[serde(rename = "X")]
        x: Vec<Vec<f64>>,
        y: Vec<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feature_names: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_names: Option<Vec<String>>,
        #[serde(default = "default_test_size")]
        test_size: f64,
        #[serde(default = "default_random_state")]
        random_state: u64,
    },
}

impl DatasetDescriptor {
    /// Reference a predefined dataset with the default split.
    pub fn predefined(name: impl Into<String>) -> Self {
        DatasetDescriptor::Predefined {
            name: name.into(),
            test_size: default_test_size(),
            random_state: default_random_state(),
        }
    }

    /// Fraction of rows held out for evaluation.
    pub fn test_size(&self) -> f64 {
        match self {
            DatasetDescriptor::Predefined { test_size, .. }
            | DatasetDescriptor::Inline { test_size, .. } => *test_size,
        }
    }

    /// Seed for the train/test shuffle.
    pub fn random_state(&self) -> u64 {
        match self {
            DatasetDescriptor::Predefined { random_state, .. }
            | DatasetDescriptor::Inline { random_state, .. } => *random_state,
        }
    }

    /// Check the held-out fraction lies in `[0.1, 0.5]`.
    pub fn validate(&self) -> std::result::Result<(), ParamValidationError> {
        let test_size = self.test_size();
        if !(0.1..=0.5).contains(&test_size) {
            return Err(ParamValidationError::InvalidTestSize(test_size));
        }
        Ok(())
    }
}


impl Default for DatasetDescriptor {
    fn default() -> Self {
        DatasetDescriptor::predefined("iris")
    }
}

/// Summary of a resolved dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub n_samples: usize,
    pub n_features: usize,
    pub n_classes: usize,
}

/// A dataset split into training and held-out rows.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub train: Dataset,
    pub test: Dataset,
    pub info: DatasetInfo,
}

impl PreparedDataset {
    /// Train and test rows recombined, train first.
    ///
    /// Manual building works on the whole dataset.
    pub fn full(&self) -> Result<Dataset> {
        Dataset::concat(&self.train, &self.test)
    }
}

/// Resolves a [`DatasetDescriptor`] into split arrays plus metadata.
///
/// Loading, validation and the train/test split live behind this trait.
pub trait DatasetProvider {
    fn prepare(&self, descriptor: &DatasetDescriptor) -> Result<PreparedDataset>;
}
