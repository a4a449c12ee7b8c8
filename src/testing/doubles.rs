//! In-memory stand-ins for the dataset provider and tree trainer.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

use super::data::{iris_like, split_indices};
use crate::compat::{LEAF_SENTINEL, TrainedTree, TreeTrainer};
use crate::data::{Dataset, DatasetDescriptor, DatasetInfo, DatasetProvider, PreparedDataset, SampleSet};
use crate::error::{EngineError, Result};
use crate::manual::ManualSplitEngine;
use crate::stats::class_counts;
use crate::training::TrainingParams;

/// Provider over named in-memory datasets.
///
/// Inline descriptors are materialized directly; unnamed features and classes
/// get positional names. Splits are shuffled with the descriptor's seed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    datasets: HashMap<String, Dataset>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider serving [`iris_like`] as `"iris"`.
    pub fn with_iris_like() -> Self {
        Self::new().with_dataset("iris", iris_like())
    }

    pub fn with_dataset(mut self, name: impl Into<String>, dataset: Dataset) -> Self {
        self.datasets.insert(name.into(), dataset);
        self
    }
}

impl DatasetProvider for InMemoryProvider {
    fn prepare(&self, descriptor: &DatasetDescriptor) -> Result<PreparedDataset> {
        let (name, dataset) = match descriptor {
            DatasetDescriptor::Predefined { name, .. } => {
                let dataset = self
                    .datasets
                    .get(name)
                    .cloned()
                    .ok_or_else(|| EngineError::Dataset(format!("unknown dataset '{name}'")))?;
                (name.clone(), dataset)
            }
            DatasetDescriptor::Inline { x, y, feature_names, target_names, .. } => {
                let n_cols = x.first().map_or(0, Vec::len);
                let n_classes = y.iter().max().map_or(0, |&m| m + 1);
                let feature_names = feature_names
                    .clone()
                    .unwrap_or_else(|| (0..n_cols).map(|i| format!("feature_{i}")).collect());
                let class_names = target_names
                    .clone()
                    .unwrap_or_else(|| (0..n_classes).map(|i| format!("class_{i}")).collect());
                ("custom".to_string(), Dataset::from_rows(x, y.clone(), feature_names, class_names)?)
            }
        };

        let n_rows = dataset.n_rows();
        let (train_idx, test_idx) = split_indices(n_rows, descriptor.test_size(), descriptor.random_state());
        let train = dataset.select(&SampleSet::from_indices(train_idx, n_rows)?);
        let test = dataset.select(&SampleSet::from_indices(test_idx, n_rows)?);
        log::debug!("prepared '{}': {} train rows, {} test rows", name, train.n_rows(), test.n_rows());

        Ok(PreparedDataset {
            info: DatasetInfo {
                name,
                description: None,
                n_samples: n_rows,
                n_features: dataset.n_features(),
                n_classes: dataset.n_classes(),
            },
            train,
            test,
        })
    }
}

/// Exhaustive greedy trainer for tests.
///
/// Grows a tree top-down, taking at each node the split with the highest
/// information gain over the considered features and every candidate
/// threshold (first one wins ties). Honors `max_depth`, `min_samples_split`,
/// `min_samples_leaf` and `criterion`. With `max_features`, each node draws
/// its features from an RNG seeded by `random_state` (0 when unset); a node
/// whose drawn features cannot split becomes a leaf.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyTrainer;

impl TreeTrainer for GreedyTrainer {
    fn fit(&self, train: &Dataset, params: &TrainingParams) -> Result<TrainedTree> {
        let engine = ManualSplitEngine::new(train);
        let mut tree = TrainedTree {
            children_left: Vec::new(),
            children_right: Vec::new(),
            feature: Vec::new(),
            threshold: Vec::new(),
            n_node_samples: Vec::new(),
            impurity: Vec::new(),
            value: Vec::new(),
        };
        let mut rng = StdRng::seed_from_u64(params.random_state.unwrap_or(0));
        let mut grower = Grower { engine: &engine, params, rng: &mut rng, tree: &mut tree };
        grower.grow(SampleSet::all(train.n_rows()), 0)?;
        Ok(tree)
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
    left: SampleSet,
    right: SampleSet,
}

struct Grower<'e, 'r> {
    engine: &'e ManualSplitEngine<'e>,
    params: &'e TrainingParams,
    rng: &'r mut StdRng,
    tree: &'r mut TrainedTree,
}

impl Grower<'_, '_> {
    /// Append the node for `samples` and its subtree; returns its id.
    fn grow(&mut self, samples: SampleSet, depth: usize) -> Result<usize> {
        let engine = self.engine;
        let ds = engine.dataset();
        let counts = class_counts(&ds.gather_labels(&samples), ds.n_classes());
        let impurity = self.params.criterion.from_counts(&counts);

        let tree = &mut *self.tree;
        let id = tree.children_left.len();
        tree.children_left.push(LEAF_SENTINEL);
        tree.children_right.push(LEAF_SENTINEL);
        tree.feature.push(-2);
        tree.threshold.push(-2.0);
        tree.n_node_samples.push(samples.len());
        tree.impurity.push(impurity);
        tree.value.push(vec![counts.iter().map(|&c| c as f64).collect()]);

        let can_split = self.params.max_depth.is_none_or(|max| depth < max)
            && samples.len() >= self.params.min_samples_split
            && impurity > 0.0;
        if !can_split {
            return Ok(id);
        }
        let Some(best) = self.best_split(&samples)? else {
            return Ok(id);
        };

        self.tree.feature[id] = best.feature as i64;
        self.tree.threshold[id] = best.threshold;
        let left = self.grow(best.left, depth + 1)?;
        let right = self.grow(best.right, depth + 1)?;
        self.tree.children_left[id] = left as i64;
        self.tree.children_right[id] = right as i64;
        Ok(id)
    }

    /// Feature indices considered at one node, ascending.
    fn considered_features(&mut self) -> Vec<usize> {
        let n_features = self.engine.feature_names().len();
        match self.params.max_features {
            None => (0..n_features).collect(),
            Some(_) if n_features == 0 => Vec::new(),
            Some(rule) => {
                let mut drawn = index::sample(&mut *self.rng, n_features, rule.resolve(n_features)).into_vec();
                drawn.sort_unstable();
                drawn
            }
        }
    }

    fn best_split(&mut self, samples: &SampleSet) -> Result<Option<BestSplit>> {
        let engine = self.engine;
        let params = self.params;
        let mut best: Option<BestSplit> = None;
        for feature in self.considered_features() {
            let name = &engine.feature_names()[feature];
            let sweep = match engine.feature_stats(Some(samples.indices()), name, params.criterion, Some(usize::MAX)) {
                Ok(sweep) => sweep,
                Err(EngineError::NotSplittable { .. }) => continue,
                Err(e) => return Err(e),
            };
            for t in sweep.thresholds {
                let allowed = t.left_mask.len() >= params.min_samples_leaf
                    && t.right_mask.len() >= params.min_samples_leaf
                    && t.information_gain > 0.0;
                if allowed && best.as_ref().is_none_or(|b| t.information_gain > b.gain) {
                    best = Some(BestSplit {
                        feature: sweep.feature_index,
                        threshold: t.threshold,
                        gain: t.information_gain,
                        left: t.left_mask,
                        right: t.right_mask,
                    });
                }
            }
        }
        Ok(best)
    }
}
