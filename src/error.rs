//! Error taxonomy for the modeling engine.
//!
//! Every fallible operation in the crate returns [`Result`]. Variants fall in
//! two groups, see [`EngineError::is_user_error`]:
//!
//! - **Bad input** from the caller: unknown features, unsplittable features,
//!   malformed sample masks, missing prediction values, request rows of the
//!   wrong width. These are expected at
//!   a service boundary and should be reported back to the user.
//! - **Wiring bugs**: a dataset whose names disagree with its matrix, or a
//!   trained tree with dangling child ids. These are never silently handled.
//!
//! A cache miss is not an error; [`crate::cache::ModelCache::get`] returns `Option`.

use crate::config::ConfigError;
use crate::training::ParamValidationError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised by the modeling engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Feature name is not part of the dataset.
    #[error("feature '{name}' not found in dataset")]
    UnknownFeature { name: String },

    /// Feature has fewer than two unique values at a node.
    #[error("feature '{feature}' has {unique} unique value(s) at this node, cannot split")]
    NotSplittable { feature: String, unique: usize },

    /// Prediction row lacks a value for a feature the tree splits on.
    #[error("missing value for feature '{name}'")]
    MissingFeature { name: String },

    /// Sample mask references a row outside the dataset.
    #[error("sample index {index} out of range for dataset with {n_rows} rows")]
    InvalidMask { index: usize, n_rows: usize },

    /// A request row has the wrong number of values.
    #[error("row {row} has {found} values, expected {expected}")]
    InvalidRow { row: usize, found: usize, expected: usize },

    /// Names and matrix disagree (internal wiring bug).
    #[error("configuration mismatch: {what} has {found} entries, expected {expected}")]
    ConfigurationMismatch {
        what: &'static str,
        found: usize,
        expected: usize,
    },

    /// A flat trained tree is structurally broken (internal wiring bug).
    #[error("invalid trained tree at node {node}: {reason}")]
    InvalidTree { node: usize, reason: String },

    /// Training parameters failed validation.
    #[error(transparent)]
    InvalidParams(#[from] ParamValidationError),

    /// Engine configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Prediction requested for a configuration that was never trained.
    #[error("model not found for key {key}; train the model first")]
    ModelNotFound { key: String },

    /// The dataset provider could not resolve a dataset.
    #[error("dataset error: {0}")]
    Dataset(String),

    /// A value could not be rendered as JSON (cache keys).
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

impl EngineError {
    /// Whether this error was caused by caller input (4xx-equivalent).
    ///
    /// Returns `false` for internal wiring bugs, which should be surfaced loudly.
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            EngineError::ConfigurationMismatch { .. }
                | EngineError::InvalidTree { .. }
                | EngineError::Serialization(_)
        )
    }
}
