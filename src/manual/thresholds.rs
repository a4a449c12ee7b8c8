//! Candidate thresholds for a feature sweep.

use crate::utils::{linspace, percentile_sorted};

/// Midpoints between consecutive sorted unique values.
///
/// `unique` must be sorted ascending and deduplicated; the result has
/// `unique.len() - 1` entries (none for fewer than two values).
pub fn candidate_thresholds(unique: &[f64]) -> Vec<f64> {
    unique.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
}

/// Cap `candidates` at `max` entries by percentile sampling.
///
/// Takes `max` evenly spaced percentiles (0 to 100 inclusive) of the sorted
/// candidates, then deduplicates. The extremes of the range are always kept.
/// Percentiles can collide on sparse inputs, so fewer than `max` thresholds
/// may come back; that is accepted.
///
/// Candidates already within the cap are returned unchanged.
pub fn downsample_thresholds(candidates: &[f64], max: usize) -> Vec<f64> {
    if candidates.len() <= max {
        return candidates.to_vec();
    }

    let mut sampled: Vec<f64> = linspace(0.0, 100.0, max)
        .into_iter()
        .map(|q| percentile_sorted(candidates, q))
        .collect();
    sampled.sort_by(f64::total_cmp);
    sampled.dedup();
    sampled
}
