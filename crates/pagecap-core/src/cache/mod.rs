//! Capture cache with three thread-safety tiers.
//!
//! A [`Cache`] stores captured pages by [`CaptureKey`] and keeps a generic
//! attribute store (string key to typed value) with compute-if-absent
//! semantics. The concurrency strength is picked when the cache is built and
//! is the minimum the scope needs:
//!
//! | Tier | Scope | Synchronization |
//! |------|-------|-----------------|
//! | [`ConcurrentCache`] | shared between requests | sharded `RwLock`s |
//! | [`SynchronizedCache`] | one request with concurrent subrequests | one `Mutex` |
//! | [`RequestCache`] | one sequential request | none (`!Sync`) |
//!
//! Entries are add-only. The first page stored under a key wins and later
//! puts for the same key return it, so racing builders of the same key are
//! harmless. Nothing is evicted; a cache lives exactly as long as its scope.
//!
//! ## Level fallback
//!
//! A [`CaptureLevel::Page`] lookup that misses probes [`CaptureLevel::Meta`].
//! The returned [`CacheHit`] reports the level the page was actually stored
//! at, so callers always know when they got a shallower page than they asked
//! for. [`PageCapturer`](crate::capture::PageCapturer) only accepts a hit
//! that [`satisfies`](CacheHit::satisfies) the requested level.
//!
//! ```rust
//! use pagecap_core::{Book, Cache, CaptureKey, CaptureLevel, Page, PageRef, RequestCache};
//! use std::sync::Arc;
//!
//! let book = Arc::new(Book::new("docs"));
//! let page_ref = PageRef::new(book, "/intro");
//! let cache = RequestCache::new();
//!
//! let meta = CaptureKey::new(page_ref.clone(), CaptureLevel::Meta)?;
//! cache.put(meta, Arc::new(Page::builder(page_ref.clone()).build()))?;
//!
//! let hit = cache.get(&CaptureKey::new(page_ref, CaptureLevel::Page)?).unwrap();
//! assert_eq!(hit.level(), CaptureLevel::Meta);
//! assert!(!hit.satisfies(CaptureLevel::Page));
//! # Ok::<(), pagecap_core::Error>(())
//! ```

mod concurrent;
mod memo;
mod request;
mod synchronized;

pub use concurrent::ConcurrentCache;
pub use memo::{LocalMemoMap, MemoMap, SyncMemoMap};
pub use request::RequestCache;
pub use synchronized::SynchronizedCache;

use crate::level::{CaptureKey, CaptureLevel};
use crate::types::{Page, PageRef};
use crate::{Error, Result};
use std::any::{Any, type_name};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, warn};

/// Value stored in the attribute store.
pub type AttributeValue = Arc<dyn Any + Send + Sync>;

/// A page found in the cache and the level it was stored at.
#[derive(Debug, Clone)]
pub struct CacheHit {
    page: Arc<Page>,
    level: CaptureLevel,
}

impl CacheHit {
    /// The cached page.
    #[must_use]
    pub const fn page(&self) -> &Arc<Page> {
        &self.page
    }

    /// Take the cached page.
    #[must_use]
    pub fn into_page(self) -> Arc<Page> {
        self.page
    }

    /// Level the page was stored at; may be shallower than requested.
    #[must_use]
    pub const fn level(&self) -> CaptureLevel {
        self.level
    }

    /// Whether this hit is at least as deep as `requested`.
    #[must_use]
    pub fn satisfies(&self, requested: CaptureLevel) -> bool {
        self.level >= requested
    }
}

/// Capture store plus attribute store, shared by all thread-safety tiers.
///
/// Implementors provide the primitive lookups and inserts; the fallback,
/// verification and typed attribute logic are provided methods so every tier
/// behaves the same apart from its concurrency guarantee.
pub trait Cache {
    /// Map type returned by [`Cache::new_map`], synchronized like the cache.
    type Map<K: Eq + Hash, V: Clone>: MemoMap<K, V>;

    /// Exact lookup, no level fallback.
    fn lookup(&self, key: &CaptureKey) -> Option<Arc<Page>>;

    /// Store `page` unless the key is taken; returns whichever page is stored.
    fn insert_capture(&self, key: CaptureKey, page: Arc<Page>) -> Arc<Page>;

    /// Whether [`Cache::put`] checks parent/child links.
    fn verifies_parent_child(&self) -> bool;

    /// Number of cached captures.
    fn len(&self) -> usize;

    /// Whether no captures are cached.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// New auxiliary map with room for `capacity` entries.
    fn new_map_with_capacity<K: Eq + Hash, V: Clone>(&self, capacity: usize) -> Self::Map<K, V>;

    /// New auxiliary map.
    fn new_map<K: Eq + Hash, V: Clone>(&self) -> Self::Map<K, V> {
        self.new_map_with_capacity(0)
    }

    /// Attribute value, or `None` if unset.
    fn get_attribute(&self, key: &str) -> Option<AttributeValue>;

    /// Set an attribute; `None` removes it.
    fn set_attribute(&self, key: &str, value: Option<AttributeValue>);

    /// Remove an attribute, returning the old value.
    fn remove_attribute(&self, key: &str) -> Option<AttributeValue>;

    /// Store `value` unless the key is taken; returns whichever value is stored.
    fn attribute_or_insert(&self, key: &str, value: AttributeValue) -> AttributeValue;

    /// Look up a capture. A `Page` miss falls back to a cached `Meta` capture.
    fn get(&self, key: &CaptureKey) -> Option<CacheHit> {
        if let Some(page) = self.lookup(key) {
            return Some(CacheHit {
                page,
                level: key.level(),
            });
        }
        if key.level() == CaptureLevel::Page {
            let meta = key.at(CaptureLevel::Meta);
            if let Some(page) = self.lookup(&meta) {
                debug!(%key, "Page capture not cached, found meta capture");
                return Some(CacheHit {
                    page,
                    level: CaptureLevel::Meta,
                });
            }
        }
        None
    }

    /// Add a capture, verifying parent/child links when enabled.
    ///
    /// Returns the stored page, which is the earlier one if the key was
    /// already taken.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Structure`] if the page's links contradict a cached
    /// parent or child.
    fn put(&self, key: CaptureKey, page: Arc<Page>) -> Result<Arc<Page>> {
        debug_assert_eq!(key.page_ref(), page.page_ref());
        if self.verifies_parent_child() {
            verify_relationships(self, &page)?;
        }
        debug!(%key, "Caching capture");
        Ok(self.insert_capture(key, page))
    }

    /// Attribute downcast to `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttributeType`] if the stored value is not a `T`.
    fn get_attribute_as<T: Any + Send + Sync>(&self, key: &str) -> Result<Option<Arc<T>>> {
        self.get_attribute(key)
            .map(|value| downcast(key, value))
            .transpose()
    }

    /// Attribute downcast to `T`, computed and stored if absent.
    ///
    /// The supplier is never called when a value is present. It runs outside
    /// any lock, so under concurrency it may run more than once, but only the
    /// first stored result is kept and every caller gets that one.
    ///
    /// # Errors
    ///
    /// Propagates the supplier's error unchanged, or an
    /// [`Error::AttributeType`] converted into `E`.
    fn get_attribute_or_insert_with<T, E, F>(
        &self,
        key: &str,
        supplier: F,
    ) -> std::result::Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        E: From<Error>,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        if let Some(existing) = self.get_attribute_as::<T>(key)? {
            return Ok(existing);
        }
        let computed: AttributeValue = Arc::new(supplier()?);
        let stored = self.attribute_or_insert(key, computed);
        Ok(downcast(key, stored)?)
    }
}

fn downcast<T: Any + Send + Sync>(key: &str, value: AttributeValue) -> Result<Arc<T>> {
    value.downcast::<T>().map_err(|_| Error::AttributeType {
        key: key.to_owned(),
        expected: type_name::<T>(),
    })
}

/// Storage behind the mutex and `RefCell` tiers.
#[derive(Default)]
struct CacheState {
    captures: HashMap<CaptureKey, Arc<Page>>,
    attributes: HashMap<String, AttributeValue>,
}

impl CacheState {
    fn insert_capture(&mut self, key: CaptureKey, page: Arc<Page>) -> Arc<Page> {
        Arc::clone(self.captures.entry(key).or_insert(page))
    }

    fn set_attribute(&mut self, key: &str, value: Option<AttributeValue>) {
        match value {
            Some(value) => {
                self.attributes.insert(key.to_owned(), value);
            },
            None => {
                self.attributes.remove(key);
            },
        }
    }

    fn attribute_or_insert(&mut self, key: &str, value: AttributeValue) -> AttributeValue {
        Arc::clone(self.attributes.entry(key.to_owned()).or_insert(value))
    }
}

/// Any cached capture of `page_ref`, deepest first.
fn cached_any_level<C: Cache + ?Sized>(cache: &C, page_ref: &PageRef) -> Option<Arc<Page>> {
    [CaptureLevel::Page, CaptureLevel::Meta]
        .into_iter()
        .filter_map(|level| CaptureKey::new(page_ref.clone(), level).ok())
        .find_map(|key| cache.lookup(&key))
}

/// Check `page`'s links against its cached parents and children.
///
/// Only direct neighbours are inspected. Links into missing books and
/// neighbours not yet cached are skipped.
fn verify_relationships<C: Cache + ?Sized>(cache: &C, page: &Page) -> Result<()> {
    let page_ref = page.page_ref();
    for parent_ref in page.parent_pages().iter().filter(|r| !r.is_missing_book()) {
        if let Some(parent) = cached_any_level(cache, parent_ref) {
            if !parent.child_pages().contains(page_ref) {
                return Err(violation(
                    page_ref,
                    parent_ref,
                    "parent does not list this page as a child",
                ));
            }
        }
    }
    for child_ref in page.child_pages().iter().filter(|r| !r.is_missing_book()) {
        if let Some(child) = cached_any_level(cache, child_ref) {
            if !child.parent_pages().contains(page_ref) {
                return Err(violation(
                    page_ref,
                    child_ref,
                    "child does not list this page as a parent",
                ));
            }
        }
    }
    Ok(())
}

fn violation(page: &PageRef, related: &PageRef, reason: &str) -> Error {
    warn!(%page, %related, reason, "Parent/child relationship mismatch");
    Error::Structure {
        page: page.clone(),
        related: related.clone(),
        reason: reason.to_owned(),
    }
}
