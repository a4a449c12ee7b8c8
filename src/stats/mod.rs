//! Split statistics and histograms.
//!
//! - [`impurity`]: gini/entropy over label sequences
//! - [`node`]: [`NodeStatistics`] and [`SplitStatistics`] for candidate splits
//! - [`histogram`]: per-class feature histograms for visualization
//!
//! All functions here are pure. Empty sample sets are legal and yield zero
//! impurity, zero gain and empty histograms.

pub mod histogram;
pub mod impurity;
pub mod node;

pub use histogram::{HistogramBuilder, HistogramData};
pub use impurity::{Criterion, class_counts, entropy, gini, impurity};
pub use node::{NodeStatistics, SplitStatistics, class_distribution, split_statistics};
