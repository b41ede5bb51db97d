//! Cache shared between unrelated requests.
//!
//! Captures are spread over independently locked shards so concurrent
//! requests touching different pages rarely contend. Shards are picked by
//! hashing the [`CaptureKey`].

use super::{AttributeValue, Cache, SyncMemoMap};
use crate::config::CacheConfig;
use crate::level::CaptureKey;
use crate::types::Page;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

type Shard = RwLock<HashMap<CaptureKey, Arc<Page>>>;

/// Fully concurrent cache, safe to share across threads and requests.
pub struct ConcurrentCache {
    shards: Box<[Shard]>,
    attributes: RwLock<HashMap<String, AttributeValue>>,
    verify_parent_child: bool,
}

impl ConcurrentCache {
    /// Cache with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&CacheConfig::default())
    }

    /// Cache built from configuration. The `scope` field is not consulted.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        let shards = (0..config.shards.max(1))
            .map(|_| RwLock::new(HashMap::new()))
            .collect();
        Self {
            shards,
            attributes: RwLock::new(HashMap::new()),
            verify_parent_child: config.verify_parent_child,
        }
    }

    fn shard(&self, key: &CaptureKey) -> &Shard {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = hasher.finish() % self.shards.len() as u64;
        &self.shards[usize::try_from(index).unwrap_or_default()]
    }
}

impl Default for ConcurrentCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConcurrentCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentCache")
            .field("shards", &self.shards.len())
            .field("captures", &self.len())
            .field("attributes", &self.attributes.read().len())
            .field("verify_parent_child", &self.verify_parent_child)
            .finish()
    }
}

impl Cache for ConcurrentCache {
    type Map<K: Eq + Hash, V: Clone> = SyncMemoMap<K, V>;

    fn lookup(&self, key: &CaptureKey) -> Option<Arc<Page>> {
        self.shard(key).read().get(key).cloned()
    }

    fn insert_capture(&self, key: CaptureKey, page: Arc<Page>) -> Arc<Page> {
        let mut shard = self.shard(&key).write();
        Arc::clone(shard.entry(key).or_insert(page))
    }

    fn verifies_parent_child(&self) -> bool {
        self.verify_parent_child
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    fn new_map_with_capacity<K: Eq + Hash, V: Clone>(&self, capacity: usize) -> Self::Map<K, V> {
        SyncMemoMap::with_capacity(capacity)
    }

    fn get_attribute(&self, key: &str) -> Option<AttributeValue> {
        self.attributes.read().get(key).cloned()
    }

    fn set_attribute(&self, key: &str, value: Option<AttributeValue>) {
        let mut attributes = self.attributes.write();
        match value {
            Some(value) => {
                attributes.insert(key.to_owned(), value);
            },
            None => {
                attributes.remove(key);
            },
        }
    }

    fn remove_attribute(&self, key: &str) -> Option<AttributeValue> {
        self.attributes.write().remove(key)
    }

    fn attribute_or_insert(&self, key: &str, value: AttributeValue) -> AttributeValue {
        Arc::clone(self.attributes.write().entry(key.to_owned()).or_insert(value))
    }
}
