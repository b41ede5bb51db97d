//! Auxiliary maps handed out by [`Cache::new_map`](super::Cache::new_map).
//!
//! Resolvers keep their per-call `finished` and `seen` tables in these maps.
//! All operations take `&self` so a table can be shared down a recursion
//! without threading `&mut` through every frame.

use parking_lot::Mutex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;

/// Minimal map interface shared by the synchronized and local variants.
pub trait MemoMap<K, V> {
    /// Clone of the value for `key`.
    fn get(&self, key: &K) -> Option<V>;

    /// Whether `key` is present.
    fn contains_key(&self, key: &K) -> bool;

    /// Insert, returning the previous value.
    fn insert(&self, key: K, value: V) -> Option<V>;

    /// Remove, returning the previous value.
    fn remove(&self, key: &K) -> Option<V>;

    /// Number of entries.
    fn len(&self) -> usize;

    /// Whether the map is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mutex-guarded map for the thread-safe cache tiers.
#[derive(Debug)]
pub struct SyncMemoMap<K, V> {
    inner: Mutex<HashMap<K, V>>,
}

impl<K: Eq + Hash, V> SyncMemoMap<K, V> {
    /// Map with room for `capacity` entries before resizing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(HashMap::with_capacity(capacity)),
        }
    }
}

impl<K: Eq + Hash, V: Clone> MemoMap<K, V> for SyncMemoMap<K, V> {
    fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    fn contains_key(&self, key: &K) -> bool {
        self.inner.lock().contains_key(key)
    }

    fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().insert(key, value)
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

/// Unsynchronized map for the request-only tier. Not `Sync`.
#[derive(Debug)]
pub struct LocalMemoMap<K, V> {
    inner: RefCell<HashMap<K, V>>,
}

impl<K: Eq + Hash, V> LocalMemoMap<K, V> {
    /// Map with room for `capacity` entries before resizing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RefCell::new(HashMap::with_capacity(capacity)),
        }
    }
}

impl<K: Eq + Hash, V: Clone> MemoMap<K, V> for LocalMemoMap<K, V> {
    fn get(&self, key: &K) -> Option<V> {
        self.inner.borrow().get(key).cloned()
    }

    fn contains_key(&self, key: &K) -> bool {
        self.inner.borrow().contains_key(key)
    }

    fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.borrow_mut().insert(key, value)
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.inner.borrow_mut().remove(key)
    }

    fn len(&self) -> usize {
        self.inner.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(map: &impl MemoMap<&'static str, u32>) {
        assert!(map.is_empty());
        assert_eq!(map.insert("a", 1), None);
        assert_eq!(map.insert("a", 2), Some(1));
        assert!(map.contains_key(&"a"));
        assert_eq!(map.get(&"a"), Some(2));
        assert_eq!(map.len(), 1);
        assert_eq!(map.remove(&"a"), Some(2));
        assert!(!map.contains_key(&"a"));
    }

    #[test]
    fn test_sync_map() {
        exercise(&SyncMemoMap::with_capacity(4));
    }

    #[test]
    fn test_local_map() {
        exercise(&LocalMemoMap::with_capacity(0));
    }
}
