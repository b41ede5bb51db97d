//! Cache for one request that may run subrequests on several threads.

use super::{AttributeValue, Cache, CacheState, SyncMemoMap};
use crate::config::CacheConfig;
use crate::level::CaptureKey;
use crate::types::Page;
use parking_lot::Mutex;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Single-mutex cache. Contention is low because it is private to a request.
pub struct SynchronizedCache {
    state: Mutex<CacheState>,
    verify_parent_child: bool,
}

impl SynchronizedCache {
    /// Cache with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&CacheConfig::default())
    }

    /// Cache built from configuration. Only `verify_parent_child` is used.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            verify_parent_child: config.verify_parent_child,
        }
    }
}

impl Default for SynchronizedCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SynchronizedCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SynchronizedCache")
            .field("captures", &state.captures.len())
            .field("attributes", &state.attributes.len())
            .field("verify_parent_child", &self.verify_parent_child)
            .finish()
    }
}

impl Cache for SynchronizedCache {
    type Map<K: Eq + Hash, V: Clone> = SyncMemoMap<K, V>;

    fn lookup(&self, key: &CaptureKey) -> Option<Arc<Page>> {
        self.state.lock().captures.get(key).cloned()
    }

    fn insert_capture(&self, key: CaptureKey, page: Arc<Page>) -> Arc<Page> {
        self.state.lock().insert_capture(key, page)
    }

    fn verifies_parent_child(&self) -> bool {
        self.verify_parent_child
    }

    fn len(&self) -> usize {
        self.state.lock().captures.len()
    }

    fn new_map_with_capacity<K: Eq + Hash, V: Clone>(&self, capacity: usize) -> Self::Map<K, V> {
        SyncMemoMap::with_capacity(capacity)
    }

    fn get_attribute(&self, key: &str) -> Option<AttributeValue> {
        self.state.lock().attributes.get(key).cloned()
    }

    fn set_attribute(&self, key: &str, value: Option<AttributeValue>) {
        self.state.lock().set_attribute(key, value);
    }

    fn remove_attribute(&self, key: &str) -> Option<AttributeValue> {
        self.state.lock().attributes.remove(key)
    }

    fn attribute_or_insert(&self, key: &str, value: AttributeValue) -> AttributeValue {
        self.state.lock().attribute_or_insert(key, value)
    }
}
