//! In-memory page source loaded from a TOML or JSON catalog file.
//!
//! ```toml
//! [[books]]
//! name = "docs"
//! allow_robots = false
//! copyright = { rights_holder = "ACME" }
//!
//! [[pages]]
//! book = "docs"
//! path = "/guide"
//! title = "Guide"
//! children = ["/guide/install", { book = "archive", path = "/old-guide" }]
//! elements = [{ kind = "file", id = "guide.pdf" }]
//! ```
//!
//! Links are a bare path (same book) or a `{ book, path }` table. A link to
//! a book the catalog does not declare becomes a missing-book reference.
//! Copyright fields follow the field rules: absent inherits, `""` is empty.

use crate::capture::PageSource;
use crate::level::CaptureLevel;
use crate::types::{Book, Copyright, Element, Field, Page, PageRef};
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    books: Vec<BookEntry>,
    #[serde(default)]
    pages: Vec<PageEntry>,
}

const fn default_allow_robots() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BookEntry {
    name: String,
    #[serde(default = "default_allow_robots")]
    allow_robots: bool,
    copyright: Option<CopyrightEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CopyrightEntry {
    rights_holder: Option<String>,
    rights: Option<String>,
    date_copyrighted: Option<String>,
}

impl From<CopyrightEntry> for Copyright {
    fn from(entry: CopyrightEntry) -> Self {
        Self::new(
            Field::from_raw(entry.rights_holder),
            Field::from_raw(entry.rights),
            Field::from_raw(entry.date_copyrighted),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LinkEntry {
    SameBook(String),
    Qualified { book: String, path: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ElementEntry {
    kind: String,
    id: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PageEntry {
    book: String,
    path: String,
    title: Option<String>,
    #[serde(default)]
    parents: Vec<LinkEntry>,
    #[serde(default)]
    children: Vec<LinkEntry>,
    #[serde(default)]
    elements: Vec<ElementEntry>,
    allow_robots: Option<bool>,
    copyright: Option<CopyrightEntry>,
    body: Option<String>,
}

/// Books and pages held in memory.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    books: HashMap<String, Arc<Book>>,
    pages: HashMap<PageRef, Page>,
    order: Vec<PageRef>,
}

impl Catalog {
    /// Parse a TOML catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] for malformed input and
    /// [`Error::Catalog`] for duplicate books or pages, or pages declared in
    /// books the catalog does not define.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::from_file(toml::from_str(content)?)
    }

    /// Parse a JSON catalog.
    ///
    /// # Errors
    ///
    /// See [`Catalog::from_toml_str`].
    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::from_file(serde_json::from_str(content)?)
    }

    /// Load a catalog file; `.json` files are JSON, everything else TOML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise see
    /// [`Catalog::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let catalog = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        debug!(path = %path.display(), books = catalog.books.len(), pages = catalog.len(), "Loaded catalog");
        Ok(catalog)
    }

    fn from_file(file: CatalogFile) -> Result<Self> {
        let mut catalog = Self::default();
        for entry in file.books {
            if catalog.books.contains_key(&entry.name) {
                return Err(Error::Catalog(format!("duplicate book '{}'", entry.name)));
            }
            let book = Book::new(entry.name.clone())
                .with_allow_robots(entry.allow_robots)
                .with_copyright(entry.copyright.map(Copyright::from));
            catalog.books.insert(entry.name, Arc::new(book));
        }

        for entry in file.pages {
            let Some(book) = catalog.books.get(&entry.book).cloned() else {
                return Err(Error::Catalog(format!(
                    "page '{}' belongs to undeclared book '{}'",
                    entry.path, entry.book
                )));
            };
            let page = catalog.build_page(&book, entry);
            let page_ref = page.page_ref().clone();
            if catalog.pages.contains_key(&page_ref) {
                return Err(Error::Catalog(format!("duplicate page '{page_ref}'")));
            }
            catalog.order.push(page_ref.clone());
            catalog.pages.insert(page_ref, page);
        }
        Ok(catalog)
    }

    fn build_page(&self, book: &Arc<Book>, entry: PageEntry) -> Page {
        let resolve = |link: LinkEntry| match link {
            LinkEntry::SameBook(path) => PageRef::new(Arc::clone(book), path),
            LinkEntry::Qualified { book, path } => self.page_ref(&book, &path),
        };

        let mut builder = Page::builder(PageRef::new(Arc::clone(book), &entry.path))
            .allow_robots(entry.allow_robots)
            .copyright(entry.copyright.map(Copyright::from));
        if let Some(title) = entry.title {
            builder = builder.title(title);
        }
        if let Some(body) = entry.body {
            builder = builder.body(body);
        }
        for parent in entry.parents {
            builder = builder.parent(resolve(parent));
        }
        for child in entry.children {
            builder = builder.child(resolve(child));
        }
        for element in entry.elements {
            let mut built = Element::new(element.kind);
            if let Some(id) = element.id {
                built = built.with_id(id);
            }
            if let Some(content) = element.content {
                built = built.with_content(content);
            }
            builder = builder.element(built);
        }
        builder.build()
    }

    /// Declared book by name.
    #[must_use]
    pub fn book(&self, name: &str) -> Option<&Arc<Book>> {
        self.books.get(name)
    }

    /// Reference to `path` in `book`; a missing-book reference if the book
    /// is not declared.
    #[must_use]
    pub fn page_ref(&self, book: &str, path: &str) -> PageRef {
        self.books.get(book).map_or_else(
            || PageRef::missing(book, path),
            |book| PageRef::new(Arc::clone(book), path),
        )
    }

    /// The full page, untrimmed.
    #[must_use]
    pub fn page(&self, page_ref: &PageRef) -> Option<&Page> {
        self.pages.get(page_ref)
    }

    /// Page references in declaration order.
    pub fn page_refs(&self) -> impl Iterator<Item = &PageRef> {
        self.order.iter()
    }

    /// Number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the catalog has no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl PageSource for Catalog {
    fn load(&self, page_ref: &PageRef, _level: CaptureLevel) -> Result<Page> {
        self.page(page_ref)
            .cloned()
            .ok_or_else(|| Error::NotFound(page_ref.to_string()))
    }
}
