//! In-memory tabular dataset.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis, concatenate};

use super::SampleSet;
use crate::error::{EngineError, Result};

/// A feature matrix with integer class labels and names for both.
///
/// Invariants (checked by [`Dataset::new`]):
/// - `feature_names.len() == features.ncols()`
/// - `labels.len() == features.nrows()`
/// - every label indexes into `class_names`
/// - every feature value is finite
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Vec<usize>,
    feature_names: Vec<String>,
    class_names: Vec<String>,
}

impl Dataset {
    /// Build a dataset, validating the shape invariants.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ConfigurationMismatch`] if names, labels and matrix disagree
    /// - [`EngineError::Dataset`] if a feature value is NaN or infinite
    pub fn new(
        features: Array2<f64>,
        labels: Vec<usize>,
        feature_names: Vec<String>,
        class_names: Vec<String>,
    ) -> Result<Self> {
        if feature_names.len() != features.ncols() {
            log::error!(
                "dataset has {} feature names for {} columns",
                feature_names.len(),
                features.ncols()
            );
            return Err(EngineError::ConfigurationMismatch {
                what: "feature_names",
                found: feature_names.len(),
                expected: features.ncols(),
            });
        }
        if labels.len() != features.nrows() {
            return Err(EngineError::ConfigurationMismatch {
                what: "labels",
                found: labels.len(),
                expected: features.nrows(),
            });
        }
        if let Some(&max_label) = labels.iter().max() {
            if max_label >= class_names.len() {
                return Err(EngineError::ConfigurationMismatch {
                    what: "class_names",
                    found: class_names.len(),
                    expected: max_label + 1,
                });
            }
        }
        if let Some(((row, col), value)) = features.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(EngineError::Dataset(format!(
                "non-finite value {value} at row {row}, feature '{}'",
                feature_names[col]
            )));
        }

        Ok(Self {
            features,
            labels,
            feature_names,
            class_names,
        })
    }

    /// Build a dataset from row vectors.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidRow`] on ragged rows, otherwise as
    /// [`Dataset::new`].
    pub fn from_rows(
        rows: &[Vec<f64>],
        labels: Vec<usize>,
        feature_names: Vec<String>,
        class_names: Vec<String>,
    ) -> Result<Self> {
        let features = rows_to_array(rows, feature_names.len())?;
        Self::new(features, labels, feature_names, class_names)
    }

    /// Stack two datasets with identical schemas row-wise (`a` rows first).
    pub fn concat(a: &Dataset, b: &Dataset) -> Result<Dataset> {
        if a.feature_names != b.feature_names {
            return Err(EngineError::ConfigurationMismatch {
                what: "feature_names",
                found: b.feature_names.len(),
                expected: a.feature_names.len(),
            });
        }
        if a.class_names != b.class_names {
            return Err(EngineError::ConfigurationMismatch {
                what: "class_names",
                found: b.class_names.len(),
                expected: a.class_names.len(),
            });
        }
        let features = concatenate(Axis(0), &[a.features.view(), b.features.view()])
            .map_err(|e| EngineError::Dataset(e.to_string()))?;
        let mut labels = a.labels.clone();
        labels.extend_from_slice(&b.labels);
        Self::new(features, labels, a.feature_names.clone(), a.class_names.clone())
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    /// Number of feature columns.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Number of declared classes.
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.class_names.len()
    }

    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Column view for one feature.
    pub fn column(&self, feature: usize) -> ArrayView1<'_, f64> {
        self.features.column(feature)
    }

    /// Resolve a feature name to its column index.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownFeature`] if no column has this name.
    pub fn feature_index(&self, name: &str) -> Result<usize> {
        self.feature_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| EngineError::UnknownFeature { name: name.to_string() })
    }

    /// Values of `feature` for the rows in `samples`, in sample order.
    pub fn gather_values(&self, samples: &SampleSet, feature: usize) -> Vec<f64> {
        let column = self.column(feature);
        samples.iter().map(|i| column[i]).collect()
    }

    /// Labels of the rows in `samples`, in sample order.
    pub fn gather_labels(&self, samples: &SampleSet) -> Vec<usize> {
        samples.iter().map(|i| self.labels[i]).collect()
    }

    /// The rows of `samples` as a new dataset with the same schema.
    pub fn select(&self, samples: &SampleSet) -> Dataset {
        Dataset {
            features: self.features.select(Axis(0), samples.indices()),
            labels: self.gather_labels(samples),
            feature_names: self.feature_names.clone(),
            class_names: self.class_names.clone(),
        }
    }
}

/// Stack row vectors into a matrix of `n_cols` columns.
///
/// # Errors
///
/// [`EngineError::InvalidRow`] for the first row of the wrong width.
pub fn rows_to_array(rows: &[Vec<f64>], n_cols: usize) -> Result<Array2<f64>> {
    let mut flat = Vec::with_capacity(rows.len() * n_cols);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_cols {
            return Err(EngineError::InvalidRow {
                row: i,
                found: row.len(),
                expected: n_cols,
            });
        }
        flat.extend_from_slice(row);
    }
    Array2::from_shape_vec((rows.len(), n_cols), flat)
        .map_err(|e| EngineError::Dataset(format!("cannot shape {} rows: {}", rows.len(), e)))
}
