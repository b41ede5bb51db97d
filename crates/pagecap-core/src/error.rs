//! Error types and handling for pagecap-core operations.
//!
//! Every fallible operation in this crate returns [`Result<T>`], built on the
//! single [`Error`] enum below. Errors carry enough context (page references,
//! field names, the disagreeing values) to diagnose a misconfigured page graph
//! without re-running the capture.
//!
//! ## Error Categories
//!
//! - **Inheritance**: same-book parents disagree on an inherited field, a parent
//!   chain loops back on itself, or the chain is deeper than allowed
//! - **Structure**: parent/child links contradict pages already in the cache
//! - **Attributes**: a cache attribute holds a value of a different type
//! - **Unsupported**: an operation the subrequest wrapper refuses to perform
//! - **Loading**: catalog, configuration, I/O and serialization failures
//!
//! ## Recovery Hints
//!
//! None of the graph errors are transient. Retrying an inheritance conflict
//! produces the same conflict, so [`Error::is_recoverable`] only reports
//! interrupted or timed-out I/O as worth a retry:
//!
//! ```rust
//! use pagecap_core::Error;
//!
//! let err = Error::NotFound("docs:/missing".to_string());
//! assert!(!err.is_recoverable());
//! assert_eq!(err.category(), "not_found");
//! ```

use crate::types::PageRef;
use thiserror::Error;

/// The main error type for pagecap-core operations.
///
/// All public functions in pagecap-core return `Result<T, Error>`. The error
/// type converts automatically from the standard library and serde errors the
/// loaders encounter.
#[derive(Error, Debug)]
pub enum Error {
    /// Two same-book parents resolved an inherited field to different values.
    ///
    /// Raised by the inheritance resolver and aborts the whole resolution.
    /// `first` is the value established by the earliest parent in visitation
    /// order, `second` the value of the parent that disagreed with it.
    #[error(
        "Mismatched {field} inherited from different parents of {page}: {first} does not match {second}"
    )]
    InheritanceConflict {
        /// Name of the field being inherited.
        field: &'static str,
        /// Page whose parents disagree.
        page: PageRef,
        /// Value established first.
        first: String,
        /// Value that did not match.
        second: String,
    },

    /// A page's parent/child links contradict a page already cached.
    ///
    /// Detected when a page is added to a cache with relationship verification
    /// enabled. Indicates broken source data, not a transient condition.
    #[error("Structure error: {page} and {related}: {reason}")]
    Structure {
        /// Page being added.
        page: PageRef,
        /// Previously cached page it conflicts with.
        related: PageRef,
        /// What is inconsistent.
        reason: String,
    },

    /// A cache attribute holds a value of a different type than requested.
    #[error("Attribute '{key}' is not of type {expected}")]
    AttributeType {
        /// Attribute key.
        key: String,
        /// Name of the requested type.
        expected: &'static str,
    },

    /// Capture keys can only be built for cacheable levels.
    #[error("Body captures are not cached: {page}")]
    UncacheableLevel {
        /// Page the key was requested for.
        page: PageRef,
    },

    /// The same-book parent chain loops back to a page still being resolved.
    #[error("Parent cycle detected at {page}")]
    ParentCycle {
        /// First page seen twice on the chain.
        page: PageRef,
    },

    /// Inheritance recursion went deeper than the configured limit.
    #[error("Inheritance depth limit of {max_depth} exceeded at {page}")]
    DepthExceeded {
        /// Page at which the limit was hit.
        page: PageRef,
        /// Configured limit.
        max_depth: usize,
    },

    /// The operation is deliberately not supported.
    ///
    /// Fails loudly so callers never mistake it for a successful no-op.
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Requested page or book does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A page catalog is malformed or internally inconsistent.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// Graph errors describe the data and come back unchanged on retry. Only
    /// interrupted or timed-out I/O is considered recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// Useful for structured logging and for grouping failures.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::InheritanceConflict { .. }
            | Self::ParentCycle { .. }
            | Self::DepthExceeded { .. } => "inheritance",
            Self::Structure { .. } => "structure",
            Self::AttributeType { .. } => "attribute",
            Self::UncacheableLevel { .. } => "level",
            Self::Unsupported(_) => "unsupported",
            Self::NotFound(_) => "not_found",
            Self::Catalog(_) => "catalog",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Book;
    use std::io;
    use std::sync::Arc;

    fn page() -> PageRef {
        PageRef::new(Arc::new(Book::new("docs")), "/guide")
    }

    #[test]
    fn test_conflict_message_names_field_and_values() {
        // Given: A conflict between two parents
        let err = Error::InheritanceConflict {
            field: "rights",
            page: page(),
            first: "\"X\"".to_string(),
            second: "\"Y\"".to_string(),
        };

        // When: Rendering it
        let message = err.to_string();

        // Then: Field, page and both values are present
        assert!(message.contains("rights"));
        assert!(message.contains("docs:/guide"));
        assert!(message.contains("\"X\" does not match \"Y\""));
    }

    #[test]
    fn test_recoverability() {
        assert!(Error::Io(io::Error::new(io::ErrorKind::Interrupted, "again")).is_recoverable());
        assert!(!Error::Io(io::Error::new(io::ErrorKind::NotFound, "gone")).is_recoverable());
        assert!(!Error::ParentCycle { page: page() }.is_recoverable());
        assert!(!Error::Unsupported("login").is_recoverable());
    }

    #[test]
    fn test_categories() {
        let cases = vec![
            (Error::ParentCycle { page: page() }, "inheritance"),
            (
                Error::Structure {
                    page: page(),
                    related: page(),
                    reason: "x".into(),
                },
                "structure",
            ),
            (
                Error::AttributeType {
                    key: "k".into(),
                    expected: "u32",
                },
                "attribute",
            ),
            (Error::Unsupported("login"), "unsupported"),
            (Error::Catalog("dup".into()), "catalog"),
            (Error::Serialization("bad".into()), "serialization"),
        ];

        for (error, category) in cases {
            assert_eq!(error.category(), category, "{error}");
        }
    }

    #[test]
    fn test_toml_error_converts_to_serialization() {
        let err: Error = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
