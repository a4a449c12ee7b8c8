//! Training orchestration.
//!
//! The tree fitting itself is delegated to a [`crate::compat::TreeTrainer`];
//! this module owns what surrounds it:
//!
//! - [`TrainingParams`]: validated hyperparameters (part of the cache key)
//! - [`ClassificationMetrics`]: held-out evaluation
//! - [`TrainingService`]: cache lookup, fit, conversion, scoring and storage

mod metrics;
mod params;
mod service;

pub use metrics::ClassificationMetrics;
pub use params::{MaxFeatures, ParamValidationError, TrainingParams};
pub use service::{BatchPrediction, ModelMetadata, ModelPayload, TrainingOutcome, TrainingService};
