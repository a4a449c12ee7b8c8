//! treelab: an interactive decision-tree modeling engine.
//!
//! Builds, inspects and evaluates decision-tree classifiers over small tabular
//! datasets, for teaching and visualization.
//!
//! # Key Types
//!
//! - [`TreeNode`] - Leaf/split tree model shared by trained and hand-built trees
//! - [`TreeConverter`] - Flat trained tree to [`TreeNode`], with split histograms
//! - [`ManualSplitEngine`] - Split statistics and threshold sweeps for manual building
//! - [`TreePredictor`] - Batch and traced prediction
//! - [`ModelCache`] - Bounded FIFO cache of trained models
//! - [`TrainingService`] - Ties provider, trainer, converter, metrics and cache together
//!
//! # Manual Building
//!
//! ```
//! use treelab::{Criterion, ManualSplitEngine};
//! use treelab::testing::four_point_dataset;
//!
//! let ds = four_point_dataset();
//! let engine = ManualSplitEngine::new(&ds);
//! let sweep = engine.feature_stats(None, "x", Criterion::Gini, None).unwrap();
//! assert_eq!(sweep.best_threshold, 2.5);
//! ```
//!
//! # Logging
//!
//! Diagnostics go through the [`log`] facade; the crate never installs a
//! logger.

// Re-export approx traits for users who want to compare statistics
pub use approx;

pub mod cache;
pub mod compat;
pub mod config;
pub mod data;
pub mod error;
pub mod inference;
pub mod manual;
pub mod repr;
pub mod stats;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use cache::{ModelCache, canonical_key};
pub use compat::{TrainedTree, TreeConverter, TreeTrainer};
pub use config::EngineConfig;
pub use data::{Dataset, DatasetDescriptor, DatasetProvider, SampleSet};
pub use error::{EngineError, Result};
pub use inference::{Instruction, TracedPrediction, TreePredictor};
pub use manual::ManualSplitEngine;
pub use repr::TreeNode;
pub use stats::Criterion;
pub use training::{ClassificationMetrics, TrainingParams, TrainingService};
pub use utils::Parallelism;
