//! Bounded in-process cache of trained models.
//!
//! Entries are keyed by a canonical JSON rendering of the training parameters
//! and dataset descriptor (see [`canonical_key`]). Eviction is FIFO by
//! insertion order; reads do not refresh an entry.
//!
//! A single mutex guards the map. Two requests that miss on the same key may
//! both train and both store; the last write wins.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::config::EngineConfig;

/// `info()` lists keys only below this many entries.
const KEY_LIST_LIMIT: usize = 20;

/// A cached payload with its insertion time.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub payload: V,
    pub cached_at: DateTime<Utc>,
}

/// Cached keys as reported by [`ModelCache::info`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheKeys {
    List(Vec<String>),
    /// Too many keys to list.
    Count(usize),
}

impl Serialize for CacheKeys {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CacheKeys::List(keys) => keys.serialize(serializer),
            CacheKeys::Count(n) => serializer.serialize_str(&format!("{n} keys")),
        }
    }
}

/// Diagnostic snapshot of the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheInfo {
    pub enabled: bool,
    pub current_size: usize,
    pub max_size: usize,
    pub keys: CacheKeys,
}

#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Keys in insertion order; front is the oldest.
    order: VecDeque<String>,
}

/// Thread-safe FIFO model cache.
///
/// # Example
///
/// ```
/// use treelab::cache::ModelCache;
///
/// let cache = ModelCache::new(true, 2);
/// cache.set("a", 1);
/// cache.set("b", 2);
/// cache.set("c", 3);
/// assert_eq!(cache.get("a"), None);
/// assert_eq!(cache.get("c"), Some(3));
/// ```
#[derive(Debug)]
pub struct ModelCache<V> {
    enabled: bool,
    max_size: usize,
    state: Mutex<CacheState<V>>,
}

impl<V: Clone> ModelCache<V> {
    pub fn new(enabled: bool, max_size: usize) -> Self {
        Self {
            enabled,
            max_size,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.cache_enabled, config.cache_max_size)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Cached payload for `key`; always `None` when disabled.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_entry(key).map(|entry| entry.payload)
    }

    /// Cached entry for `key`, including its insertion time.
    pub fn get_entry(&self, key: &str) -> Option<CacheEntry<V>> {
        if !self.enabled {
            return None;
        }
        let state = self.state.lock();
        let entry = state.entries.get(key).cloned();
        if entry.is_some() {
            log::debug!("model cache hit for {key}");
        } else {
            log::debug!("model cache miss for {key}");
        }
        entry
    }

    /// Store `payload` under `key`, evicting the oldest entry when full.
    ///
    /// Replacing an existing key keeps its position in the eviction order.
    /// No-op when disabled.
    pub fn set(&self, key: impl Into<String>, payload: V) {
        if !self.enabled || self.max_size == 0 {
            return;
        }
        let key = key.into();
        let entry = CacheEntry { payload, cached_at: Utc::now() };

        let mut state = self.state.lock();
        if state.entries.contains_key(&key) {
            state.entries.insert(key, entry);
            return;
        }

        while state.entries.len() >= self.max_size {
            let Some(oldest) = state.order.pop_front() else { break };
            state.entries.remove(&oldest);
            log::debug!("model cache evicted {oldest}");
        }

        state.order.push_back(key.clone());
        state.entries.insert(key, entry);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let n = state.entries.len();
        state.entries.clear();
        state.order.clear();
        log::info!("model cache cleared ({n} entries)");
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size and keys, listing keys only when there are few of them.
    pub fn info(&self) -> CacheInfo {
        let state = self.state.lock();
        let current_size = state.entries.len();
        let keys = if current_size < KEY_LIST_LIMIT {
            CacheKeys::List(state.order.iter().cloned().collect())
        } else {
            CacheKeys::Count(current_size)
        };
        CacheInfo {
            enabled: self.enabled,
            current_size,
            max_size: self.max_size,
            keys,
        }
    }
}

/// Deterministic cache key for a parameter set and dataset descriptor.
///
/// Both values are rendered as JSON with object keys sorted recursively, so
/// logically equal inputs give equal keys whatever their field order.
///
/// # Errors
///
/// Fails only if either value cannot be represented as JSON.
pub fn canonical_key<P, D>(params: &P, dataset: &D) -> serde_json::Result<String>
where
    P: Serialize + ?Sized,
    D: Serialize + ?Sized,
{
    let mut root = Map::new();
    root.insert("dataset".to_string(), serde_json::to_value(dataset)?);
    root.insert("params".to_string(), serde_json::to_value(params)?);
    serde_json::to_string(&sort_keys(Value::Object(root)))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_keys(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
