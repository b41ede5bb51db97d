//! Capture depth levels and the cache key built from them.

use crate::types::PageRef;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How deep a capture goes. Ordered shallow to deep.
///
/// Each level carries everything the shallower levels do. Only `Meta` and
/// `Page` captures are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureLevel {
    /// Structure only: references, element kinds, attributes.
    Meta,
    /// Full page content without the rendered body.
    Page,
    /// Everything, including the rendered body. Never cached.
    Body,
}

impl CaptureLevel {
    /// Whether captures at this level may be stored in a cache.
    #[must_use]
    pub const fn is_cacheable(self) -> bool {
        !matches!(self, Self::Body)
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::Page => "page",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for CaptureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptureLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "meta" => Ok(Self::Meta),
            "page" => Ok(Self::Page),
            "body" => Ok(Self::Body),
            other => Err(Error::Other(format!("Unknown capture level: {other}"))),
        }
    }
}

/// Cache key: a page reference at a cacheable level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaptureKey {
    page_ref: PageRef,
    level: CaptureLevel,
}

impl CaptureKey {
    /// Build a key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UncacheableLevel`] for [`CaptureLevel::Body`].
    pub fn new(page_ref: PageRef, level: CaptureLevel) -> Result<Self> {
        if !level.is_cacheable() {
            return Err(Error::UncacheableLevel { page: page_ref });
        }
        Ok(Self { page_ref, level })
    }

    /// Page reference part.
    #[must_use]
    pub const fn page_ref(&self) -> &PageRef {
        &self.page_ref
    }

    /// Level part.
    #[must_use]
    pub const fn level(&self) -> CaptureLevel {
        self.level
    }

    /// Same page, another cacheable level.
    pub(crate) fn at(&self, level: CaptureLevel) -> Self {
        debug_assert!(level.is_cacheable());
        Self {
            page_ref: self.page_ref.clone(),
            level,
        }
    }
}

impl fmt::Display for CaptureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.level, self.page_ref)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(CaptureLevel::Meta < CaptureLevel::Page);
        assert!(CaptureLevel::Page < CaptureLevel::Body);
        assert!(CaptureLevel::Meta.is_cacheable());
        assert!(CaptureLevel::Page.is_cacheable());
        assert!(!CaptureLevel::Body.is_cacheable());
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("META".parse::<CaptureLevel>().unwrap(), CaptureLevel::Meta);
        assert_eq!("body".parse::<CaptureLevel>().unwrap(), CaptureLevel::Body);
        assert!("deep".parse::<CaptureLevel>().is_err());
    }

    #[test]
    fn test_body_keys_are_rejected() {
        let page_ref = PageRef::missing("docs", "/a");
        let err = CaptureKey::new(page_ref.clone(), CaptureLevel::Body).unwrap_err();
        assert!(matches!(err, Error::UncacheableLevel { .. }));

        let key = CaptureKey::new(page_ref, CaptureLevel::Page).unwrap();
        assert_eq!(key.to_string(), "(page, docs:/a)");
        assert_eq!(key.at(CaptureLevel::Meta).level(), CaptureLevel::Meta);
        assert_ne!(key, key.at(CaptureLevel::Meta));
    }
}
