//! Capture engine: resolve a page reference to a page, through the cache.
//!
//! [`PageSource`] is the external builder that knows how to produce a page.
//! [`PageCapturer`] puts a [`Cache`] in front of it and implements
//! [`CapturePage`], the contract the resolvers in [`crate::inherit`] and
//! [`crate::search`] call back into while walking the graph.
//!
//! ## Level semantics
//!
//! - `Body` captures always go to the source and are never stored.
//! - A cached hit at the requested level (or deeper) is returned as is.
//! - A `Page` request that only finds a cached `Meta` capture still builds a
//!   real `Page` capture and stores it next to the `Meta` one.

use crate::cache::Cache;
use crate::level::{CaptureKey, CaptureLevel};
use crate::types::{Page, PageRef};
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Builds pages. Implemented outside the core (parsers, renderers, catalogs).
pub trait PageSource {
    /// Produce the page for `page_ref` with at least `level` worth of content.
    ///
    /// The capturer trims the result down to `level`, so a source may always
    /// return a full page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such page exists, or any error the
    /// source hits while building.
    fn load(&self, page_ref: &PageRef, level: CaptureLevel) -> Result<Page>;
}

impl<S: PageSource + ?Sized> PageSource for Arc<S> {
    fn load(&self, page_ref: &PageRef, level: CaptureLevel) -> Result<Page> {
        (**self).load(page_ref, level)
    }
}

impl<S: PageSource + ?Sized> PageSource for &S {
    fn load(&self, page_ref: &PageRef, level: CaptureLevel) -> Result<Page> {
        (**self).load(page_ref, level)
    }
}

/// Capture contract consumed by the resolvers.
pub trait CapturePage {
    /// Cache backing this engine; resolvers take their memo maps from it.
    type Cache: Cache;

    /// The backing cache.
    fn cache(&self) -> &Self::Cache;

    /// Capture `page_ref` at `level`, memoized per cacheable key.
    ///
    /// A `Page` request may be answered from a cached `Meta` entry only to
    /// learn that it is too shallow; a `Meta` request never reads a cached
    /// `Page` entry and builds its own capture.
    ///
    /// # Errors
    ///
    /// Fails for references into missing books, when the source fails, or
    /// when the cache rejects the page's links.
    fn capture_page(&self, page_ref: &PageRef, level: CaptureLevel) -> Result<Arc<Page>>;
}

/// Counters kept by [`PageCapturer`].
#[derive(Debug, Default)]
pub struct CaptureStats {
    hits: AtomicU64,
    fallbacks: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
}

/// Point-in-time copy of [`CaptureStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CaptureStatsSummary {
    /// Requests answered from the cache.
    pub hits: u64,
    /// `Page` requests that only found a `Meta` capture.
    pub fallbacks: u64,
    /// Cacheable requests with nothing cached.
    pub misses: u64,
    /// Pages built by the source, including uncached `Body` captures.
    pub builds: u64,
}

impl CaptureStats {
    /// Snapshot the counters.
    #[must_use]
    pub fn summary(&self) -> CaptureStatsSummary {
        CaptureStatsSummary {
            hits: self.hits.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
        }
    }
}

/// A [`PageSource`] behind a [`Cache`].
pub struct PageCapturer<S, C> {
    source: S,
    cache: C,
    stats: CaptureStats,
}

impl<S: PageSource, C: Cache> PageCapturer<S, C> {
    /// Engine over `source`, memoizing into `cache`.
    pub fn new(source: S, cache: C) -> Self {
        Self {
            source,
            cache,
            stats: CaptureStats::default(),
        }
    }

    /// The page source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Capture counters.
    pub const fn stats(&self) -> &CaptureStats {
        &self.stats
    }

    fn build(&self, page_ref: &PageRef, level: CaptureLevel) -> Result<Page> {
        self.stats.builds.fetch_add(1, Ordering::Relaxed);
        let page = self.source.load(page_ref, level)?;
        if page.page_ref() != page_ref {
            return Err(Error::Structure {
                page: page_ref.clone(),
                related: page.page_ref().clone(),
                reason: "source returned a different page".to_string(),
            });
        }
        Ok(page.into_level(level))
    }
}

impl<S: PageSource, C: Cache> CapturePage for PageCapturer<S, C> {
    type Cache = C;

    fn cache(&self) -> &C {
        &self.cache
    }

    fn capture_page(&self, page_ref: &PageRef, level: CaptureLevel) -> Result<Arc<Page>> {
        if page_ref.is_missing_book() {
            return Err(Error::NotFound(format!("{page_ref} (book not present)")));
        }
        if !level.is_cacheable() {
            return self.build(page_ref, level).map(Arc::new);
        }

        let key = CaptureKey::new(page_ref.clone(), level)?;
        match self.cache.get(&key) {
            Some(hit) if hit.satisfies(level) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(hit.into_page());
            },
            Some(hit) => {
                self.stats.fallbacks.fetch_add(1, Ordering::Relaxed);
                debug!(%key, cached = %hit.level(), "Cached capture too shallow, rebuilding");
            },
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                debug!(%key, "Capture cache miss");
            },
        }

        let page = Arc::new(self.build(page_ref, level)?);
        self.cache.put(key, page)
    }
}

impl<S, C: fmt::Debug> fmt::Debug for PageCapturer<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageCapturer")
            .field("cache", &self.cache)
            .field("stats", &self.stats.summary())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cache::{ConcurrentCache, RequestCache};
    use crate::types::{Book, Element};
    use std::collections::HashMap;

    struct MapSource {
        pages: HashMap<PageRef, Page>,
    }

    impl PageSource for MapSource {
        fn load(&self, page_ref: &PageRef, _level: CaptureLevel) -> Result<Page> {
            self.pages
                .get(page_ref)
                .cloned()
                .ok_or_else(|| Error::NotFound(page_ref.to_string()))
        }
    }

    fn source() -> (MapSource, PageRef) {
        let book = Arc::new(Book::new("docs"));
        let page_ref = PageRef::new(book, "/a");
        let page = Page::builder(page_ref.clone())
            .element(Element::new("heading").with_content("A"))
            .body("<p>A</p>")
            .build();
        let pages = [(page_ref.clone(), page)].into_iter().collect();
        (MapSource { pages }, page_ref)
    }

    #[test]
    fn test_warm_capture_is_identical() {
        let (source, page_ref) = source();
        let capturer = PageCapturer::new(source, RequestCache::new());

        let first = capturer.capture_page(&page_ref, CaptureLevel::Page).unwrap();
        let second = capturer.capture_page(&page_ref, CaptureLevel::Page).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        let stats = capturer.stats().summary();
        assert_eq!(stats.builds, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_levels_trim_and_body_is_not_cached() {
        let (source, page_ref) = source();
        let capturer = PageCapturer::new(source, ConcurrentCache::new());

        let meta = capturer.capture_page(&page_ref, CaptureLevel::Meta).unwrap();
        assert!(meta.elements()[0].content().is_none());
        assert!(meta.body().is_none());

        let body = capturer.capture_page(&page_ref, CaptureLevel::Body).unwrap();
        assert_eq!(body.body(), Some("<p>A</p>"));
        let again = capturer.capture_page(&page_ref, CaptureLevel::Body).unwrap();
        assert!(!Arc::ptr_eq(&body, &again));
        assert_eq!(capturer.cache().len(), 1);
    }

    #[test]
    fn test_meta_fallback_still_builds_page_level() {
        // Given: Only a meta capture is cached
        let (source, page_ref) = source();
        let capturer = PageCapturer::new(source, RequestCache::new());
        let meta = capturer.capture_page(&page_ref, CaptureLevel::Meta).unwrap();

        // When: Capturing at page level
        let page = capturer.capture_page(&page_ref, CaptureLevel::Page).unwrap();

        // Then: A distinct page-level capture is built and stored
        assert!(!Arc::ptr_eq(&meta, &page));
        assert_eq!(page.elements()[0].content(), Some("A"));
        assert_eq!(capturer.cache().len(), 2);
        assert_eq!(capturer.stats().summary().fallbacks, 1);

        // And: The meta capture is untouched
        let meta_again = capturer.capture_page(&page_ref, CaptureLevel::Meta).unwrap();
        assert!(Arc::ptr_eq(&meta, &meta_again));
    }

    #[test]
    fn test_meta_request_builds_even_with_page_cached() {
        let (source, page_ref) = source();
        let capturer = PageCapturer::new(source, RequestCache::new());
        let page = capturer.capture_page(&page_ref, CaptureLevel::Page).unwrap();

        let meta = capturer.capture_page(&page_ref, CaptureLevel::Meta).unwrap();

        assert!(!Arc::ptr_eq(&page, &meta));
        assert!(meta.elements()[0].content().is_none());
        let stats = capturer.stats().summary();
        assert_eq!(stats.builds, 2);
        assert_eq!(stats.fallbacks, 0);
        assert_eq!(capturer.cache().len(), 2);
    }

    #[test]
    fn test_missing_book_is_never_loaded() {
        let (source, _) = source();
        let capturer = PageCapturer::new(source, RequestCache::new());

        let err = capturer
            .capture_page(&PageRef::missing("gone", "/a"), CaptureLevel::Meta)
            .unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(capturer.stats().summary().builds, 0);
    }
}
