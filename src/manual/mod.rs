//! Manual (interactive) split exploration.
//!
//! A user builds a tree top-down by picking a feature and threshold at each
//! node. [`ManualSplitEngine`] answers the two questions asked along the way:
//!
//! - [`ManualSplitEngine::node_stats`]: what happens if this node is split on
//!   `feature <= threshold`?
//! - [`ManualSplitEngine::feature_stats`]: how good is every candidate
//!   threshold of this feature, and which one is best?
//!
//! Node identity is carried by the caller as a sample mask; the engine itself
//! holds no per-session state.

mod engine;
mod thresholds;

pub use engine::{FeatureStatsResult, ManualSplitEngine, NodeStatsResult, ThresholdStatistics};
pub use thresholds::{candidate_thresholds, downsample_thresholds};
