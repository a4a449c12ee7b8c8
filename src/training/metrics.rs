//! Classification metrics for evaluating a tree on held-out rows.

use serde::{Deserialize, Serialize};

/// Multiclass classification quality.
///
/// Precision, recall and F1 are support-weighted averages over classes; a
/// class whose score has a zero denominator scores 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// `confusion_matrix[true][predicted]`, one row and column per class.
    pub confusion_matrix: Vec<Vec<usize>>,
}

impl ClassificationMetrics {
    /// Compute metrics from true and predicted class indices.
    ///
    /// The matrix covers `n_classes` classes, widened if a label exceeds it.
    /// Empty input yields all-zero scores.
    ///
    /// # Example
    ///
    /// ```
    /// use treelab::training::ClassificationMetrics;
    ///
    /// let m = ClassificationMetrics::compute(&[0, 0, 1, 1], &[0, 1, 1, 1], 2);
    /// assert_eq!(m.accuracy, 0.75);
    /// assert_eq!(m.confusion_matrix, vec![vec![1, 1], vec![0, 2]]);
    /// ```
    pub fn compute(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> Self {
        debug_assert_eq!(y_true.len(), y_pred.len());

        let k = y_true
            .iter()
            .chain(y_pred)
            .map(|&c| c + 1)
            .max()
            .unwrap_or(0)
            .max(n_classes);

        let mut confusion_matrix = vec![vec![0usize; k]; k];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            confusion_matrix[t][p] += 1;
        }

        let n = y_true.len();
        if n == 0 {
            return Self {
                accuracy: 0.0,
                precision: 0.0,
                recall: 0.0,
                f1: 0.0,
                confusion_matrix,
            };
        }

        let correct: usize = (0..k).map(|c| confusion_matrix[c][c]).sum();

        let (mut precision, mut recall, mut f1) = (0.0, 0.0, 0.0);
        for class in 0..k {
            let tp = confusion_matrix[class][class] as f64;
            let support: usize = confusion_matrix[class].iter().sum();
            let predicted: usize = confusion_matrix.iter().map(|row| row[class]).sum();
            if support == 0 {
                continue;
            }

            let p = safe_div(tp, predicted as f64);
            let r = safe_div(tp, support as f64);
            let f = safe_div(2.0 * p * r, p + r);

            let weight = support as f64 / n as f64;
            precision += weight * p;
            recall += weight * r;
            f1 += weight * f;
        }

        Self {
            accuracy: correct as f64 / n as f64,
            precision,
            recall,
            f1,
            confusion_matrix,
        }
    }
}

#[inline]
fn safe_div(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn perfect_predictions() {
        let m = ClassificationMetrics::compute(&[0, 1, 2, 1], &[0, 1, 2, 1], 3);
        assert_eq!(m.accuracy, 1.0);
        assert_abs_diff_eq!(m.precision, 1.0);
        assert_abs_diff_eq!(m.recall, 1.0);
        assert_abs_diff_eq!(m.f1, 1.0);
        assert_eq!(m.confusion_matrix[1][1], 2);
    }

    #[test]
    fn weighted_scores() {
        // class 0: tp=1, fp=0, fn=1 -> p=1, r=0.5, f1=2/3
        // class 1: tp=2, fp=1, fn=0 -> p=2/3, r=1, f1=0.8
        let m = ClassificationMetrics::compute(&[0, 0, 1, 1], &[0, 1, 1, 1], 2);
        assert_abs_diff_eq!(m.accuracy, 0.75);
        assert_abs_diff_eq!(m.precision, 0.5 * 1.0 + 0.5 * (2.0 / 3.0), epsilon = 1e-12);
        assert_abs_diff_eq!(m.recall, 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(m.f1, 0.5 * (2.0 / 3.0) + 0.5 * 0.8, epsilon = 1e-12);
    }

    #[test]
    fn never_predicted_class_scores_zero() {
        let m = ClassificationMetrics::compute(&[0, 1], &[0, 0], 2);
        // class 0: p=0.5, r=1; class 1: p=0 (no predictions), r=0
        assert_abs_diff_eq!(m.precision, 0.25);
        assert_abs_diff_eq!(m.recall, 0.5);
        assert!(m.precision.is_finite() && m.f1.is_finite());
    }

    #[test]
    fn matrix_sized_by_declared_classes() {
        let m = ClassificationMetrics::compute(&[0], &[0], 3);
        assert_eq!(m.confusion_matrix, vec![vec![1, 0, 0], vec![0; 3], vec![0; 3]]);
    }

    #[test]
    fn empty_input() {
        let m = ClassificationMetrics::compute(&[], &[], 2);
        assert_eq!(m.accuracy, 0.0);
        assert_eq!(m.confusion_matrix, vec![vec![0; 2]; 2]);
    }
}
