//! Cache for one sequential request without concurrent subrequests.
//!
//! No locking at all: this behaves like request-local storage. The `RefCell`
//! makes the type `!Sync`, so the compiler rejects sharing it across threads.

use super::{AttributeValue, Cache, CacheState, LocalMemoMap};
use crate::config::CacheConfig;
use crate::level::CaptureKey;
use crate::types::Page;
use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Unsynchronized single-request cache.
pub struct RequestCache {
    state: RefCell<CacheState>,
    verify_parent_child: bool,
}

impl RequestCache {
    /// Cache with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&CacheConfig::default())
    }

    /// Cache built from configuration. Only `verify_parent_child` is used.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            state: RefCell::new(CacheState::default()),
            verify_parent_child: config.verify_parent_child,
        }
    }
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RequestCache")
            .field("captures", &state.captures.len())
            .field("attributes", &state.attributes.len())
            .field("verify_parent_child", &self.verify_parent_child)
            .finish()
    }
}

impl Cache for RequestCache {
    type Map<K: Eq + Hash, V: Clone> = LocalMemoMap<K, V>;

    fn lookup(&self, key: &CaptureKey) -> Option<Arc<Page>> {
        self.state.borrow().captures.get(key).cloned()
    }

    fn insert_capture(&self, key: CaptureKey, page: Arc<Page>) -> Arc<Page> {
        self.state.borrow_mut().insert_capture(key, page)
    }

    fn verifies_parent_child(&self) -> bool {
        self.verify_parent_child
    }

    fn len(&self) -> usize {
        self.state.borrow().captures.len()
    }

    fn new_map_with_capacity<K: Eq + Hash, V: Clone>(&self, capacity: usize) -> Self::Map<K, V> {
        LocalMemoMap::with_capacity(capacity)
    }

    fn get_attribute(&self, key: &str) -> Option<AttributeValue> {
        self.state.borrow().attributes.get(key).cloned()
    }

    fn set_attribute(&self, key: &str, value: Option<AttributeValue>) {
        self.state.borrow_mut().set_attribute(key, value);
    }

    fn remove_attribute(&self, key: &str) -> Option<AttributeValue> {
        self.state.borrow_mut().attributes.remove(key)
    }

    fn attribute_or_insert(&self, key: &str, value: AttributeValue) -> AttributeValue {
        self.state.borrow_mut().attribute_or_insert(key, value)
    }
}
