//! # pagecap-core
//!
//! Page capture and caching for a content graph of books and pages.
//!
//! Pages link to parents and children, possibly across books, possibly in
//! cycles, and possibly into books that are not deployed. This crate captures
//! pages at a chosen depth, memoizes the captures in a cache whose
//! thread-safety matches its scope, and answers two kinds of graph questions
//! on top of the captures: inherited attribute values and recursive
//! existence checks.
//!
//! ## Architecture
//!
//! - **Types**: books, page references, pages, elements and tri-state fields
//! - **Levels**: `Meta < Page < Body` capture depths and the cache key
//! - **Cache**: one [`Cache`] trait with shared, subrequest and request tiers
//! - **Capture**: [`PageCapturer`] puts a cache in front of a [`PageSource`]
//! - **Inheritance**: robots and copyright resolved through same-book parents
//! - **Search**: cycle-safe existence search over child links
//! - **Catalog**: a TOML/JSON page source for tools and tests
//!
//! ## Quick Start
//!
//! ```rust
//! use pagecap_core::{
//!     find_allow_robots, has_element_of_kind, CaptureLevel, CapturePage, Catalog,
//!     PageCapturer, RequestCache,
//! };
//!
//! let catalog = Catalog::from_toml_str(r#"
//!     [[books]]
//!     name = "docs"
//!     allow_robots = false
//!
//!     [[pages]]
//!     book = "docs"
//!     path = "/"
//!     children = ["/download"]
//!
//!     [[pages]]
//!     book = "docs"
//!     path = "/download"
//!     parents = ["/"]
//!     elements = [{ kind = "file", id = "setup.zip" }]
//! "#)?;
//!
//! let engine = PageCapturer::new(&catalog, RequestCache::new());
//! let root = engine.capture_page(&catalog.page_ref("docs", "/"), CaptureLevel::Page)?;
//!
//! assert!(!find_allow_robots(&engine, &root)?);
//! assert!(has_element_of_kind(&engine, &root, "file", true)?);
//! # Ok::<(), pagecap_core::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`]:
//!
//! ```rust
//! use pagecap_core::{find_copyright, CaptureLevel, CapturePage, Catalog, Error, PageCapturer, RequestCache};
//!
//! let catalog = Catalog::from_toml_str(r#"
//!     [[books]]
//!     name = "docs"
//!
//!     [[pages]]
//!     book = "docs"
//!     path = "/"
//! "#)?;
//! let engine = PageCapturer::new(&catalog, RequestCache::new());
//! let root = engine.capture_page(&catalog.page_ref("docs", "/"), CaptureLevel::Page)?;
//!
//! match find_copyright(&engine, &root) {
//!     Ok(copyright) => println!("copyright: {copyright:?}"),
//!     Err(Error::InheritanceConflict { field, .. }) => eprintln!("conflict on {field}"),
//!     Err(e) => eprintln!("{} error: {e}", e.category()),
//! }
//! # Ok::<(), pagecap_core::Error>(())
//! ```

/// Capture cache tiers and the attribute store
pub mod cache;
/// Capture engine over a page source
pub mod capture;
/// In-memory catalog page source
pub mod catalog;
/// Configuration loading and environment overrides
pub mod config;
/// Error types and result aliases
pub mod error;
/// Attribute inheritance through same-book parents
pub mod inherit;
/// Capture levels and cache keys
pub mod level;
/// Existence search over child links
pub mod search;
/// Request decorator for subrequests
pub mod subrequest;
/// Page graph model
pub mod types;

// Re-export commonly used types
pub use cache::{
    AttributeValue, Cache, CacheHit, ConcurrentCache, LocalMemoMap, MemoMap, RequestCache,
    SyncMemoMap, SynchronizedCache,
};
pub use capture::{CapturePage, CaptureStats, CaptureStatsSummary, PageCapturer, PageSource};
pub use catalog::Catalog;
pub use config::{CacheConfig, CacheScope, Config, ResolveConfig};
pub use error::{Error, Result};
pub use inherit::{
    AllowRobots, CopyrightInheritance, Inheritable, Resolver, find_allow_robots, find_copyright,
};
pub use level::{CaptureKey, CaptureLevel};
pub use search::{has_child, has_element, has_element_of_kind};
pub use subrequest::{AuthState, Request, SubRequest};
pub use types::*;
