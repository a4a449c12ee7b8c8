//! Prediction over [`crate::repr::TreeNode`] trees.
//!
//! [`TreePredictor`] handles both batch prediction over a feature matrix and
//! single-row traced prediction over named values. It works the same for
//! trees converted from a trainer and trees assembled by hand.

mod predictor;

pub use predictor::{Instruction, TracedPrediction, TreePredictor, predict, predict_with_trace};
