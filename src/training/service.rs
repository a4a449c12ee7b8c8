//! Orchestration of training, evaluation and prediction requests.
//!
//! [`TrainingService`] composes the collaborators behind one request:
//!
//! 1. Validate parameters and derive the cache key
//! 2. On a miss, prepare the dataset and fit with the external trainer
//! 3. Convert the fitted tree over the training rows (with histograms)
//! 4. Score it on the held-out rows and cache the resulting payload

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ClassificationMetrics, TrainingParams};
use crate::cache::{ModelCache, canonical_key};
use crate::compat::{TreeConverter, TreeTrainer};
use crate::config::EngineConfig;
use crate::data::{Dataset, DatasetDescriptor, DatasetInfo, DatasetProvider, rows_to_array};
use crate::error::{EngineError, Result};
use crate::inference::{TracedPrediction, TreePredictor};
use crate::manual::ManualSplitEngine;
use crate::repr::TreeNode;

/// Provenance of a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub created_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    pub class_names: Vec<String>,
    pub n_train: usize,
    pub n_test: usize,
    pub dataset: DatasetInfo,
    pub params: TrainingParams,
}

/// Everything returned for a trained model, and what the cache stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPayload {
    pub tree: TreeNode,
    /// Held-out metrics; absent when the test split is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ClassificationMetrics>,
    pub metadata: ModelMetadata,
}

/// Result of [`TrainingService::train`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingOutcome {
    pub model_key: String,
    /// Whether the payload came from the cache.
    pub cached: bool,
    #[serde(flatten)]
    pub payload: ModelPayload,
}

/// Class predictions for a batch of rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchPrediction {
    pub predictions: Vec<String>,
    pub prediction_indices: Vec<usize>,
}

/// Training, prediction and evaluation over a dataset provider and trainer.
///
/// Holds the only shared mutable state of the engine, the [`ModelCache`];
/// every method takes `&self` and is safe to call concurrently.
#[derive(Debug)]
pub struct TrainingService<P, T> {
    provider: P,
    trainer: T,
    config: EngineConfig,
    cache: ModelCache<ModelPayload>,
}

impl<P: DatasetProvider, T: TreeTrainer> TrainingService<P, T> {
    /// Service with the default configuration.
    pub fn new(provider: P, trainer: T) -> Self {
        let config = EngineConfig::default();
        Self {
            cache: ModelCache::from_config(&config),
            provider,
            trainer,
            config,
        }
    }

    /// Service with an explicit configuration.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] if `config` fails validation.
    pub fn with_config(provider: P, trainer: T, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cache: ModelCache::from_config(&config),
            provider,
            trainer,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &ModelCache<ModelPayload> {
        &self.cache
    }

    /// Cache key for a parameter set and dataset.
    pub fn model_key(params: &TrainingParams, descriptor: &DatasetDescriptor) -> Result<String> {
        Ok(canonical_key(params, descriptor)?)
    }

    /// Train (or fetch from cache) a tree for `params` on `descriptor`.
    ///
    /// # Errors
    ///
    /// Parameter validation, provider, trainer and conversion errors.
    pub fn train(&self, params: &TrainingParams, descriptor: &DatasetDescriptor) -> Result<TrainingOutcome> {
        params.validate()?;
        descriptor.validate()?;

        let model_key = Self::model_key(params, descriptor)?;
        if let Some(payload) = self.cache.get(&model_key) {
            return Ok(TrainingOutcome { model_key, cached: true, payload });
        }

        let prepared = self.provider.prepare(descriptor)?;
        let trained = self.trainer.fit(&prepared.train, params)?;
        let tree = TreeConverter::new(&trained, &prepared.train)
            .histogram_bins(self.config.histogram_bins)
            .convert()?;

        let metrics = if prepared.test.n_rows() > 0 {
            Some(self.score(&tree, &prepared.test)?)
        } else {
            None
        };

        log::info!(
            "trained tree on '{}': {} nodes, depth {}, accuracy {}",
            prepared.info.name,
            tree.n_nodes(),
            tree.depth(),
            metrics.as_ref().map_or("n/a".to_string(), |m| format!("{:.4}", m.accuracy))
        );

        let payload = ModelPayload {
            tree,
            metrics,
            metadata: ModelMetadata {
                created_at: Utc::now(),
                feature_names: prepared.train.feature_names().to_vec(),
                class_names: prepared.train.class_names().to_vec(),
                n_train: prepared.train.n_rows(),
                n_test: prepared.test.n_rows(),
                dataset: prepared.info,
                params: params.clone(),
            },
        };
        self.cache.set(model_key.clone(), payload.clone());

        Ok(TrainingOutcome { model_key, cached: false, payload })
    }

    /// Predict rows with a previously trained model.
    ///
    /// # Errors
    ///
    /// [`EngineError::ModelNotFound`] if no model for this configuration is
    /// cached; prediction errors otherwise.
    pub fn predict(
        &self,
        params: &TrainingParams,
        descriptor: &DatasetDescriptor,
        rows: &[Vec<f64>],
    ) -> Result<BatchPrediction> {
        let model_key = Self::model_key(params, descriptor)?;
        let payload = self
            .cache
            .get(&model_key)
            .ok_or(EngineError::ModelNotFound { key: model_key })?;

        let meta = &payload.metadata;
        let rows = rows_to_array(rows, meta.feature_names.len())?;
        let prediction_indices = TreePredictor::new(&payload.tree)
            .with_parallelism(self.config.parallelism)
            .predict(rows.view(), &meta.feature_names)?;
        let predictions = prediction_indices
            .iter()
            .map(|&i| meta.class_names.get(i).cloned().unwrap_or_else(|| i.to_string()))
            .collect();

        Ok(BatchPrediction { predictions, prediction_indices })
    }

    /// Score a (typically hand-built) tree on the held-out split.
    pub fn evaluate_tree(&self, tree: &TreeNode, descriptor: &DatasetDescriptor) -> Result<ClassificationMetrics> {
        let prepared = self.provider.prepare(descriptor)?;
        self.score(tree, &prepared.test)
    }

    /// Trace a single named-value prediction.
    pub fn predict_with_trace(
        &self,
        tree: &TreeNode,
        point: &HashMap<String, f64>,
        class_names: Option<&[String]>,
    ) -> Result<TracedPrediction> {
        TreePredictor::new(tree).predict_with_trace(point, class_names)
    }

    /// Manual split engine over the whole dataset (train and test rows).
    pub fn manual_engine(&self, descriptor: &DatasetDescriptor) -> Result<ManualSplitEngine<'static>> {
        let prepared = self.provider.prepare(descriptor)?;
        Ok(ManualSplitEngine::owned(prepared.full()?).with_config(&self.config))
    }

    fn score(&self, tree: &TreeNode, data: &Dataset) -> Result<ClassificationMetrics> {
        let predicted = TreePredictor::new(tree)
            .with_parallelism(self.config.parallelism)
            .predict(data.features(), data.feature_names())?;
        Ok(ClassificationMetrics::compute(data.labels(), &predicted, data.n_classes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::TrainedTree;
    use crate::testing::{InMemoryProvider, GreedyTrainer, four_point_dataset};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn service() -> TrainingService<InMemoryProvider, GreedyTrainer> {
        TrainingService::new(InMemoryProvider::with_iris_like(), GreedyTrainer)
    }

    #[test]
    fn train_then_hit_cache() {
        let svc = service();
        let params = TrainingParams::default();
        let descriptor = DatasetDescriptor::predefined("iris");

        let first = svc.train(&params, &descriptor).unwrap();
        assert!(!first.cached);
        assert!(first.payload.metrics.is_some());
        assert_eq!(first.payload.metadata.class_names.len(), 3);

        let second = svc.train(&params, &descriptor).unwrap();
        assert!(second.cached);
        assert_eq!(second.model_key, first.model_key);
        assert_eq!(second.payload, first.payload);
    }

    #[test]
    fn trainer_runs_once_per_key() {
        let calls = AtomicUsize::new(0);
        let trainer = |train: &Dataset, params: &TrainingParams| {
            calls.fetch_add(1, Ordering::SeqCst);
            GreedyTrainer.fit(train, params)
        };
        let svc = TrainingService::new(InMemoryProvider::with_iris_like(), trainer);
        let descriptor = DatasetDescriptor::predefined("iris");

        svc.train(&TrainingParams::default(), &descriptor).unwrap();
        svc.train(&TrainingParams::default(), &descriptor).unwrap();
        let deeper = TrainingParams { max_depth: Some(2), ..Default::default() };
        svc.train(&deeper, &descriptor).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalid_params_are_rejected_before_training() {
        let svc = service();
        let params = TrainingParams { min_samples_split: 0, ..Default::default() };
        let err = svc.train(&params, &DatasetDescriptor::predefined("iris")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParams(_)));
        assert!(svc.cache().is_empty());
    }

    #[test]
    fn predict_requires_trained_model() {
        let svc = service();
        let params = TrainingParams::default();
        let descriptor = DatasetDescriptor::predefined("iris");
        let err = svc.predict(&params, &descriptor, &[vec![1.0, 0.2, 3.0, 1.0]]).unwrap_err();
        assert!(matches!(err, EngineError::ModelNotFound { .. }));

        svc.train(&params, &descriptor).unwrap();
        let out = svc.predict(&params, &descriptor, &[vec![5.0, 3.5, 1.4, 0.2]]).unwrap();
        assert_eq!(out.predictions, vec!["setosa".to_string()]);
        assert_eq!(out.prediction_indices, vec![0]);
    }

    #[test]
    fn evaluate_hand_built_tree() {
        let provider = InMemoryProvider::new().with_dataset("tiny", four_point_dataset());
        let svc = TrainingService::new(provider, GreedyTrainer);
        let descriptor = DatasetDescriptor::Predefined {
            name: "tiny".into(),
            test_size: 0.5,
            random_state: 7,
        };

        let engine = svc.manual_engine(&descriptor).unwrap();
        assert_eq!(engine.dataset().n_rows(), 4);
        let split = engine.feature_stats(None, "x", Default::default(), None).unwrap();

        let tree: TreeNode = crate::repr::SplitNode::new(
            "x",
            split.best_threshold,
            0.5,
            vec![vec![2.0, 2.0]],
            crate::repr::LeafNode::new(2, 0.0, vec![vec![2.0, 0.0]]).into(),
            crate::repr::LeafNode::new(2, 0.0, vec![vec![0.0, 2.0]]).into(),
        )
        .into();
        let metrics = svc.evaluate_tree(&tree, &descriptor).unwrap();
        assert_eq!(metrics.accuracy, 1.0);
    }

    #[test]
    fn broken_trainer_output_is_reported() {
        let trainer = |_: &Dataset, _: &TrainingParams| -> Result<TrainedTree> {
            let mut tree = TrainedTree::leaf(1, 0.0, vec![1.0]);
            tree.impurity.clear();
            Ok(tree)
        };
        let svc = TrainingService::new(InMemoryProvider::with_iris_like(), trainer);
        let err = svc
            .train(&TrainingParams::default(), &DatasetDescriptor::predefined("iris"))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTree { .. }));
        assert!(!err.is_user_error());
    }

    #[test]
    fn outcome_serializes_flat() {
        let svc = service();
        let outcome = svc
            .train(&TrainingParams::default(), &DatasetDescriptor::predefined("iris"))
            .unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["cached"], false);
        assert_eq!(json["tree"]["type"], "split");
        assert!(json["metadata"]["created_at"].is_string());
        assert!(json["metrics"]["confusion_matrix"].is_array());
    }
}
