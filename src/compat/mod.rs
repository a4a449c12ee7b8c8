//! Boundary to external tree trainers.
//!
//! This module provides:
//! - [`TrainedTree`]: the flat array form a CART trainer hands back
//! - [`TreeTrainer`]: the trait wrapping that trainer
//! - [`TreeConverter`] / [`convert`]: materialization into [`crate::repr::TreeNode`]
//!   with per-split histograms

mod convert;
mod trained;

pub use convert::{DEFAULT_HISTOGRAM_BINS, TreeConverter, convert};
pub use trained::{LEAF_SENTINEL, TrainedTree, TreeTrainer};
