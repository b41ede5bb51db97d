//! Attribute inheritance over the parent graph.
//!
//! An [`Inheritable`] attribute is a fixed list of fields, each of which may be
//! unset on a page. The effective value of an unset field comes from the
//! page's parents in the *same* book, and from the book's default when there
//! are none. Parents in other books (or in missing books) never contribute.
//!
//! Rules, applied per field:
//!
//! 1. A field set on the page wins. A page with every field set needs no
//!    parents at all.
//! 2. Every same-book parent is resolved (recursively, at most once per call)
//!    and all of them must agree exactly. The first parent establishes the
//!    value; any later parent that differs is an
//!    [`Error::InheritanceConflict`] and the whole call fails.
//! 3. Without a value from parents, the book default applies.
//!
//! Resolution is memoized in a `finished` map taken from the engine's cache,
//! so shared ancestors are resolved once. A same-book parent chain that loops
//! back on itself is reported as [`Error::ParentCycle`], and chains deeper
//! than the configured limit as [`Error::DepthExceeded`].
//!
//! ```rust,no_run
//! use pagecap_core::{Catalog, PageCapturer, RequestCache, Resolver, CapturePage, CaptureLevel};
//!
//! let catalog = Catalog::load(std::path::Path::new("site.toml"))?;
//! let page_ref = catalog.page_ref("docs", "/guide/install");
//! let engine = PageCapturer::new(&catalog, RequestCache::new());
//!
//! let page = engine.capture_page(&page_ref, CaptureLevel::Page)?;
//! let resolver = Resolver::new(&engine);
//! println!("robots: {}", resolver.allow_robots(&page)?);
//! # Ok::<(), pagecap_core::Error>(())
//! ```

mod copyright;
mod robots;

pub use copyright::CopyrightInheritance;
pub use robots::AllowRobots;

use crate::cache::{Cache, MemoMap};
use crate::capture::CapturePage;
use crate::config::{DEFAULT_MAX_DEPTH, ResolveConfig};
use crate::level::CaptureLevel;
use crate::types::{Book, Copyright, Page, PageRef};
use crate::{Error, Result};
use std::fmt;
use tracing::{instrument, warn};

/// An attribute resolved field by field through same-book parents.
pub trait Inheritable {
    /// Resolved value of a single field.
    type Value: Clone + PartialEq + fmt::Debug;

    /// Resolved value of the whole attribute.
    type Resolved: Clone;

    /// Field names, in the order every other method uses.
    const FIELDS: &'static [&'static str];

    /// Fields as set on the page; `None` means inherit.
    fn page_fields(page: &Page) -> Vec<Option<Self::Value>>;

    /// Fields of an already resolved attribute.
    fn resolved_fields(resolved: &Self::Resolved) -> Vec<Self::Value>;

    /// Book defaults for every field.
    fn book_fields(book: &Book) -> Vec<Self::Value>;

    /// Combine fully resolved fields into the attribute.
    fn assemble(fields: Vec<Self::Value>) -> Self::Resolved;

    /// Human-readable rendering of a field value for error messages.
    fn describe(value: &Self::Value) -> String;
}

/// Runs inheritance resolution against a capture engine.
#[derive(Debug)]
pub struct Resolver<'e, E> {
    engine: &'e E,
    max_depth: usize,
}

impl<'e, E: CapturePage> Resolver<'e, E> {
    /// Resolver with the default depth limit.
    pub const fn new(engine: &'e E) -> Self {
        Self {
            engine,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Resolver configured from [`ResolveConfig`].
    pub const fn from_config(engine: &'e E, config: &ResolveConfig) -> Self {
        Self {
            engine,
            max_depth: config.max_depth,
        }
    }

    /// Override the depth limit.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Effective value of attribute `A` for `page`.
    ///
    /// # Errors
    ///
    /// Returns the first inheritance conflict, parent cycle, depth overflow or
    /// capture failure met on the way. No partial result is produced.
    pub fn resolve<A: Inheritable>(&self, page: &Page) -> Result<A::Resolved> {
        let cache = self.engine.cache();
        let walk = Walk::<A, E> {
            engine: self.engine,
            finished: cache.new_map(),
            visiting: cache.new_map(),
            max_depth: self.max_depth,
        };
        walk.resolve(page, 0)
    }

    /// Effective robots policy.
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve`].
    #[instrument(skip_all, fields(page = %page.page_ref()))]
    pub fn allow_robots(&self, page: &Page) -> Result<bool> {
        self.resolve::<AllowRobots>(page)
    }

    /// Effective copyright, `None` when every field resolves empty.
    ///
    /// Every field of a returned copyright is set.
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve`].
    #[instrument(skip_all, fields(page = %page.page_ref()))]
    pub fn copyright(&self, page: &Page) -> Result<Option<Copyright>> {
        let copyright = self.resolve::<CopyrightInheritance>(page)?;
        debug_assert!(copyright.as_ref().is_none_or(|c| c.has_all_fields() && !c.is_empty()));
        Ok(copyright)
    }
}

/// Effective robots policy of `page` with default settings.
///
/// # Errors
///
/// See [`Resolver::resolve`].
pub fn find_allow_robots<E: CapturePage>(engine: &E, page: &Page) -> Result<bool> {
    Resolver::new(engine).allow_robots(page)
}

/// Effective copyright of `page` with default settings.
///
/// # Errors
///
/// See [`Resolver::resolve`].
pub fn find_copyright<E: CapturePage>(engine: &E, page: &Page) -> Result<Option<Copyright>> {
    Resolver::new(engine).copyright(page)
}

type MapOf<E, K, V> = <<E as CapturePage>::Cache as Cache>::Map<K, V>;

/// State of one top-level resolution.
struct Walk<'e, A: Inheritable, E: CapturePage> {
    engine: &'e E,
    finished: MapOf<E, PageRef, A::Resolved>,
    visiting: MapOf<E, PageRef, ()>,
    max_depth: usize,
}

impl<A: Inheritable, E: CapturePage> Walk<'_, A, E> {
    fn resolve(&self, page: &Page, depth: usize) -> Result<A::Resolved> {
        let page_ref = page.page_ref();
        debug_assert!(!self.finished.contains_key(page_ref));
        if depth > self.max_depth {
            return Err(Error::DepthExceeded {
                page: page_ref.clone(),
                max_depth: self.max_depth,
            });
        }

        let own = A::page_fields(page);
        let resolved = if own.iter().all(Option::is_some) {
            A::assemble(own.into_iter().flatten().collect())
        } else {
            self.visiting.insert(page_ref.clone(), ());
            let fields = self.inherit(page, own, depth)?;
            self.visiting.remove(page_ref);
            A::assemble(fields)
        };

        self.finished.insert(page_ref.clone(), resolved.clone());
        Ok(resolved)
    }

    fn inherit(
        &self,
        page: &Page,
        own: Vec<Option<A::Value>>,
        depth: usize,
    ) -> Result<Vec<A::Value>> {
        let page_ref = page.page_ref();
        let book = page_ref
            .book()
            .ok_or_else(|| Error::NotFound(format!("{page_ref} (book not present)")))?;

        let mut from_parents: Vec<Option<A::Value>> = vec![None; own.len()];
        for parent_ref in page
            .parent_pages()
            .iter()
            .filter(|parent_ref| parent_ref.same_book(page_ref) && !parent_ref.is_missing_book())
        {
            let parent = self.parent(parent_ref, depth)?;
            let slots = from_parents.iter_mut().zip(&own);
            let candidates = A::resolved_fields(&parent).into_iter().zip(A::FIELDS.iter().copied());
            for ((slot, own_value), (candidate, field)) in slots.zip(candidates) {
                if own_value.is_some() {
                    continue;
                }
                match slot.as_ref() {
                    None => *slot = Some(candidate),
                    Some(established) if *established == candidate => {},
                    Some(established) => {
                        let (first, second) = (A::describe(established), A::describe(&candidate));
                        warn!(page = %page_ref, field, %first, %second, "Inheritance conflict");
                        return Err(Error::InheritanceConflict {
                            field,
                            page: page_ref.clone(),
                            first,
                            second,
                        });
                    },
                }
            }
        }

        Ok(own
            .into_iter()
            .zip(from_parents)
            .zip(A::book_fields(book))
            .map(|((own, inherited), default)| own.or(inherited).unwrap_or(default))
            .collect())
    }

    fn parent(&self, parent_ref: &PageRef, depth: usize) -> Result<A::Resolved> {
        if let Some(resolved) = self.finished.get(parent_ref) {
            return Ok(resolved);
        }
        if self.visiting.contains_key(parent_ref) {
            return Err(Error::ParentCycle {
                page: parent_ref.clone(),
            });
        }
        let parent = self.engine.capture_page(parent_ref, CaptureLevel::Page)?;
        self.resolve(&parent, depth + 1)
    }
}
