//! Page graph model: books, page references, pages and their attributes.
//!
//! These types are the read-only input the capture subsystem works on. How
//! they are produced is up to the [`PageSource`](crate::capture::PageSource);
//! the [`Catalog`](crate::catalog::Catalog) is one such producer.

use crate::level::CaptureLevel;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A named collection of pages sharing default attribute values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    name: String,
    allow_robots: bool,
    copyright: Option<Copyright>,
}

impl Book {
    /// Create a book that allows robots and has no default copyright.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allow_robots: true,
            copyright: None,
        }
    }

    /// Set the default robots policy.
    #[must_use]
    pub const fn with_allow_robots(mut self, allow_robots: bool) -> Self {
        self.allow_robots = allow_robots;
        self
    }

    /// Set the default copyright.
    #[must_use]
    pub fn with_copyright(mut self, copyright: Option<Copyright>) -> Self {
        self.copyright = copyright;
        self
    }

    /// Book name, unique within a deployment.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Robots policy used when no page in the chain sets one.
    #[must_use]
    pub const fn allow_robots(&self) -> bool {
        self.allow_robots
    }

    /// Copyright used when no page in the chain sets a field.
    #[must_use]
    pub const fn copyright(&self) -> Option<&Copyright> {
        self.copyright.as_ref()
    }
}

/// The book side of a [`PageRef`].
///
/// A reference can point into a book that is not part of the current
/// deployment. Such references stay in the graph but are never dereferenced.
#[derive(Debug, Clone)]
pub enum BookRef {
    /// The book is deployed.
    Present(Arc<Book>),
    /// Only the name is known; the book is not deployed.
    Missing(Arc<str>),
}

impl BookRef {
    /// Book name, whether or not the book is present.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Present(book) => book.name(),
            Self::Missing(name) => name,
        }
    }
}

/// Immutable page identity: book plus path.
///
/// Equality and hashing use the book name and the path only, so a reference
/// to a missing book still compares equal to the same reference once the
/// book is known.
#[derive(Debug, Clone)]
pub struct PageRef {
    book: BookRef,
    path: Arc<str>,
}

impl PageRef {
    /// Reference a page in a deployed book.
    #[must_use]
    pub fn new(book: Arc<Book>, path: impl AsRef<str>) -> Self {
        Self {
            book: BookRef::Present(book),
            path: Arc::from(path.as_ref()),
        }
    }

    /// Reference a page whose book is not deployed.
    #[must_use]
    pub fn missing(book_name: impl AsRef<str>, path: impl AsRef<str>) -> Self {
        Self {
            book: BookRef::Missing(Arc::from(book_name.as_ref())),
            path: Arc::from(path.as_ref()),
        }
    }

    /// The book, or `None` when it is not deployed.
    #[must_use]
    pub const fn book(&self) -> Option<&Arc<Book>> {
        match &self.book {
            BookRef::Present(book) => Some(book),
            BookRef::Missing(_) => None,
        }
    }

    /// Name of the book, available even when the book is missing.
    #[must_use]
    pub fn book_name(&self) -> &str {
        self.book.name()
    }

    /// Path within the book.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// True when the target book is not deployed.
    #[must_use]
    pub const fn is_missing_book(&self) -> bool {
        matches!(self.book, BookRef::Missing(_))
    }

    /// True when both references name the same book.
    #[must_use]
    pub fn same_book(&self, other: &Self) -> bool {
        self.book_name() == other.book_name()
    }
}

impl PartialEq for PageRef {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.book_name() == other.book_name()
    }
}

impl Eq for PageRef {}

impl Hash for PageRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.book_name().hash(state);
        self.path.hash(state);
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.book_name(), self.path)
    }
}

/// One optionally-set string field.
///
/// `Inherit` takes the value from same-book parents or the book. `Empty`
/// stops inheritance with no value. A `Value` is never the empty string;
/// use [`Field::text`] to build one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Field {
    /// Not set on this page.
    #[default]
    Inherit,
    /// Explicitly set to nothing.
    Empty,
    /// Explicitly set.
    Value(String),
}

impl Field {
    /// Build a set field, mapping `""` to [`Field::Empty`].
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Value(value)
        }
    }

    /// Map a raw optional string: `None` inherits, `""` is empty.
    #[must_use]
    pub fn from_raw(value: Option<String>) -> Self {
        value.map_or(Self::Inherit, Self::text)
    }

    /// True unless the field inherits.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        !matches!(self, Self::Inherit)
    }

    /// The value, if the field carries one.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Value(value) => Some(value),
            Self::Inherit | Self::Empty => None,
        }
    }
}

impl From<Option<String>> for Field {
    /// Resolved form: `None` is empty, never inherit.
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Empty, Self::text)
    }
}

/// Copyright metadata with three independently inherited fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Copyright {
    /// Who holds the rights.
    pub rights_holder: Field,
    /// Rights statement.
    pub rights: Field,
    /// Date or date range of the copyright.
    pub date_copyrighted: Field,
}

impl Copyright {
    /// Create a copyright from its three fields.
    #[must_use]
    pub const fn new(rights_holder: Field, rights: Field, date_copyrighted: Field) -> Self {
        Self {
            rights_holder,
            rights,
            date_copyrighted,
        }
    }

    /// True when no field inherits.
    #[must_use]
    pub const fn has_all_fields(&self) -> bool {
        self.rights_holder.is_set() && self.rights.is_set() && self.date_copyrighted.is_set()
    }

    /// True when no field carries a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rights_holder.value().is_none()
            && self.rights.value().is_none()
            && self.date_copyrighted.value().is_none()
    }
}

/// A typed content node of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    kind: String,
    id: Option<String>,
    content: Option<String>,
}

impl Element {
    /// Create an element of the given kind.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            content: None,
        }
    }

    /// Set the element id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the element content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Element kind, e.g. `"heading"` or `"file"`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// True when the element is of `kind`.
    #[must_use]
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Element id, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Element content; absent in [`CaptureLevel::Meta`] captures.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

/// A node of the content graph.
///
/// Pages are immutable once built. The [`PageRef`] is the identity used by
/// the cache and the resolvers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    page_ref: PageRef,
    title: Option<String>,
    parent_pages: Vec<PageRef>,
    child_pages: Vec<PageRef>,
    elements: Vec<Element>,
    allow_robots: Option<bool>,
    copyright: Option<Copyright>,
    body: Option<String>,
}

impl Page {
    /// Start building a page.
    #[must_use]
    pub fn builder(page_ref: PageRef) -> PageBuilder {
        PageBuilder {
            page: Self {
                page_ref,
                title: None,
                parent_pages: Vec::new(),
                child_pages: Vec::new(),
                elements: Vec::new(),
                allow_robots: None,
                copyright: None,
                body: None,
            },
        }
    }

    /// Page identity.
    #[must_use]
    pub const fn page_ref(&self) -> &PageRef {
        &self.page_ref
    }

    /// Page title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Parents in declaration order; empty for a root.
    #[must_use]
    pub fn parent_pages(&self) -> &[PageRef] {
        &self.parent_pages
    }

    /// Children in declaration order, including missing-book children.
    #[must_use]
    pub fn child_pages(&self) -> &[PageRef] {
        &self.child_pages
    }

    /// Content elements.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Robots policy set directly on this page.
    #[must_use]
    pub const fn allow_robots(&self) -> Option<bool> {
        self.allow_robots
    }

    /// Copyright set directly on this page.
    #[must_use]
    pub const fn copyright(&self) -> Option<&Copyright> {
        self.copyright.as_ref()
    }

    /// Rendered body; only present in [`CaptureLevel::Body`] captures.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Trim the page down to what a capture at `level` contains.
    ///
    /// `Meta` keeps structure and element kinds but drops element content and
    /// the body. `Page` drops the body. `Body` keeps everything.
    #[must_use]
    pub fn into_level(mut self, level: CaptureLevel) -> Self {
        if level < CaptureLevel::Body {
            self.body = None;
        }
        if level < CaptureLevel::Page {
            for element in &mut self.elements {
                element.content = None;
            }
        }
        self
    }
}

/// Builder for [`Page`].
#[derive(Debug, Clone)]
pub struct PageBuilder {
    page: Page,
}

impl PageBuilder {
    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.page.title = Some(title.into());
        self
    }

    /// Append a parent reference.
    #[must_use]
    pub fn parent(mut self, parent: PageRef) -> Self {
        self.page.parent_pages.push(parent);
        self
    }

    /// Append a child reference.
    #[must_use]
    pub fn child(mut self, child: PageRef) -> Self {
        self.page.child_pages.push(child);
        self
    }

    /// Append an element.
    #[must_use]
    pub fn element(mut self, element: Element) -> Self {
        self.page.elements.push(element);
        self
    }

    /// Set the robots policy.
    #[must_use]
    pub const fn allow_robots(mut self, allow_robots: Option<bool>) -> Self {
        self.page.allow_robots = allow_robots;
        self
    }

    /// Set the copyright.
    #[must_use]
    pub fn copyright(mut self, copyright: Option<Copyright>) -> Self {
        self.page.copyright = copyright;
        self
    }

    /// Set the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.page.body = Some(body.into());
        self
    }

    /// Finish the page.
    #[must_use]
    pub fn build(self) -> Page {
        self.page
    }
}
