//! Decision tree domain representation.
//!
//! This module provides:
//! - [`TreeNode`]: the split/leaf sum type shared by trained and hand-built trees
//! - [`LeafNode`] / [`SplitNode`]: the variant payloads
//! - [`goes_left`]: the single split rule used by conversion, partitioning and
//!   prediction
//!
//! Trees are strictly binary and own their children; there is no sharing and
//! no cycles.

mod node;

pub use node::{LeafNode, SplitNode, TreeNode};

/// Split rule: a value goes to the left child iff `value <= threshold`.
///
/// Every component that routes samples (conversion, manual partitioning,
/// prediction) calls this function, so a value equal to the threshold always
/// lands on the same side.
#[inline]
pub fn goes_left(value: f64, threshold: f64) -> bool {
    value <= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_value_goes_left() {
        assert!(goes_left(5.0, 5.0));
        assert!(goes_left(4.0, 5.0));
        assert!(!goes_left(6.0, 5.0));
        assert!(!goes_left(f64::NAN, 5.0));
    }
}
