//! Dataset handling.
//!
//! This module provides:
//! - [`Dataset`]: feature matrix, class labels and their names
//! - [`SampleSet`]: the ordered row indices reaching a tree node (sample mask)
//! - [`DatasetDescriptor`] / [`DatasetProvider`]: the boundary to whatever
//!   loads and splits datasets
//!
//! Datasets are read-only once built. Everything downstream references rows
//! by index through a [`SampleSet`]; rows are never copied per node.

mod dataset;
mod descriptor;
mod samples;

pub use dataset::{Dataset, rows_to_array};
pub use descriptor::{DatasetDescriptor, DatasetInfo, DatasetProvider, PreparedDataset};
pub use samples::SampleSet;
