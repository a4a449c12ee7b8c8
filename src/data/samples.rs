//! Sample masks: the rows reaching a tree node.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::repr::goes_left;

/// Ordered row indices into a fixed dataset.
///
/// Every index is in `[0, n_rows)` of the dataset it was validated against.
/// The root node's sample set is the full index range.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleSet(Vec<usize>);

impl SampleSet {
    /// Every row of a dataset with `n_rows` rows.
    pub fn all(n_rows: usize) -> Self {
        Self((0..n_rows).collect())
    }

    /// Validate explicit indices against the dataset size.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidMask`] for the first out-of-range index.
    pub fn from_indices(indices: Vec<usize>, n_rows: usize) -> Result<Self> {
        if let Some(&index) = indices.iter().find(|&&i| i >= n_rows) {
            return Err(EngineError::InvalidMask { index, n_rows });
        }
        Ok(Self(indices))
    }

    /// Resolve an optional caller mask; `None` means the root (all rows).
    pub fn from_mask(mask: Option<&[usize]>, n_rows: usize) -> Result<Self> {
        match mask {
            None => Ok(Self::all(n_rows)),
            Some(indices) => Self::from_indices(indices.to_vec(), n_rows),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Split by `column[i] <= threshold` into `(left, right)`, preserving order.
    ///
    /// `column` is the full feature column of the dataset, indexed by row.
    pub fn partition(&self, column: ArrayView1<'_, f64>, threshold: f64) -> (SampleSet, SampleSet) {
        let (left, right): (Vec<usize>, Vec<usize>) = self
            .0
            .iter()
            .partition(|&&i| goes_left(column[i], threshold));
        (SampleSet(left), SampleSet(right))
    }
}
