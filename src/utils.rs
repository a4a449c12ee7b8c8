//! Common utilities used across the crate.
//!
//! Slice statistics shared by the histogram builder and the threshold sweep,
//! plus the parallelism flag passed to batch operations.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

// =============================================================================
// Statistical Utilities
// =============================================================================

/// Sorted, deduplicated copy of `values`.
///
/// NaN values are dropped. Equality is exact (`==`), so `0.1 + 0.2` and `0.3`
/// stay distinct.
pub fn sorted_unique(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}

/// Percentile of an already sorted slice using linear interpolation.
///
/// Matches the default ("linear") method of numpy's `percentile`: the rank
/// `q / 100 * (n - 1)` is split into an integer part and a fraction, and the
/// result interpolates between the two neighbouring values.
///
/// # Returns
/// `f64::NAN` if `sorted` is empty.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// `count` evenly spaced values over `[start, end]`, both endpoints included.
///
/// Equivalent to numpy's `linspace(start, end, count)`.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Index of the maximum value; ties resolve to the first occurrence.
///
/// Returns `None` for an empty slice. NaN never wins.
pub fn argmax_first(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b || v.is_nan() => {}
            _ if v.is_nan() => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

// =============================================================================
// Parallelism Configuration
// =============================================================================

/// Whether parallel execution is allowed.
///
/// This is a simple flag passed to batch prediction and threshold sweeps.
/// When `Parallel`, components may use `rayon` parallel iterators on the
/// global pool; they never manage thread pools themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parallelism {
    #[default]
    Sequential,
    Parallel,
}

impl Parallelism {
    /// Returns `true` if parallel execution is allowed.
    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }

    /// Map `f` over `items`, in parallel if allowed. Output order matches input order.
    pub fn map_collect<T, R, F>(self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        if self.is_parallel() {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }
}
