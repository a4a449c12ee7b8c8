//! Testing utilities for treelab.
//!
//! Assertion helpers, fixed and synthetic datasets, and in-memory stand-ins
//! for the dataset provider and tree trainer, shared by unit and
//! integration tests.
//!
//! ```ignore
//! use treelab::testing::{InMemoryProvider, GreedyTrainer, iris_like};
//! ```

mod data;
mod doubles;

pub use data::{blobs, four_point_dataset, iris_like, split_indices};
pub use doubles::{GreedyTrainer, InMemoryProvider};

/// Default tolerance for floating point comparisons of statistics.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Assert that two f64 values are approximately equal.
///
/// Uses absolute difference comparison; the tolerance defaults to
/// [`DEFAULT_TOLERANCE`].
///
/// # Examples
///
/// ```
/// # use treelab::assert_approx_eq;
/// assert_approx_eq!(0.1 + 0.2, 0.3);
/// assert_approx_eq!(1.0, 1.0001, 0.001);
/// ```
///
/// # Panics
///
/// Panics if the absolute difference exceeds tolerance.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr) => {
        $crate::assert_approx_eq!($left, $right, $crate::testing::DEFAULT_TOLERANCE)
    };
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left_val: f64 = $left;
        let right_val: f64 = $right;
        let tol: f64 = $tolerance;
        let diff = (left_val - right_val).abs();
        if diff.is_nan() || diff > tol {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                left_val, right_val, diff, tol
            );
        }
    }};
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {{
        let left_val: f64 = $left;
        let right_val: f64 = $right;
        let tol: f64 = $tolerance;
        let diff = (left_val - right_val).abs();
        if diff.is_nan() || diff > tol {
            panic!(
                "assertion failed: `(left ≈ right)` - {}\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                format_args!($($arg)+), left_val, right_val, diff, tol
            );
        }
    }};
}
