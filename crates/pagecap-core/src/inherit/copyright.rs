use super::Inheritable;
use crate::types::{Book, Copyright, Field, Page};

/// Copyright: three string fields, each inherited on its own.
///
/// A field value of `None` is the resolved "empty" state. A resolved
/// copyright with every field empty is reported as no copyright at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyrightInheritance;

fn values(copyright: &Copyright) -> Vec<Option<String>> {
    [
        &copyright.rights_holder,
        &copyright.rights,
        &copyright.date_copyrighted,
    ]
    .into_iter()
    .map(|field| field.value().map(str::to_owned))
    .collect()
}

impl Inheritable for CopyrightInheritance {
    type Value = Option<String>;
    type Resolved = Option<Copyright>;

    const FIELDS: &'static [&'static str] = &["rights_holder", "rights", "date_copyrighted"];

    fn page_fields(page: &Page) -> Vec<Option<Option<String>>> {
        let Some(copyright) = page.copyright() else {
            return vec![None; Self::FIELDS.len()];
        };
        [
            &copyright.rights_holder,
            &copyright.rights,
            &copyright.date_copyrighted,
        ]
        .into_iter()
        .map(|field| field.is_set().then(|| field.value().map(str::to_owned)))
        .collect()
    }

    fn resolved_fields(resolved: &Option<Copyright>) -> Vec<Option<String>> {
        resolved
            .as_ref()
            .map_or_else(|| vec![None; Self::FIELDS.len()], values)
    }

    // Inherit on a book default has nothing further up to inherit from.
    fn book_fields(book: &Book) -> Vec<Option<String>> {
        book.copyright()
            .map_or_else(|| vec![None; Self::FIELDS.len()], values)
    }

    fn assemble(fields: Vec<Option<String>>) -> Option<Copyright> {
        if fields.iter().all(Option::is_none) {
            return None;
        }
        let mut fields = fields.into_iter().map(Field::from);
        Some(Copyright::new(
            fields.next().unwrap_or_default(),
            fields.next().unwrap_or_default(),
            fields.next().unwrap_or_default(),
        ))
    }

    fn describe(value: &Option<String>) -> String {
        value.clone().unwrap_or_else(|| "(empty)".to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::super::find_copyright;
    use super::*;
    use crate::Error;
    use crate::cache::SynchronizedCache;
    use crate::capture::{CapturePage, PageCapturer};
    use crate::catalog::Catalog;
    use crate::level::CaptureLevel;
    use pretty_assertions::assert_eq;

    const SITE: &str = r#"
[[books]]
name = "docs"
copyright = { rights_holder = "ACME", rights = "All rights reserved" }

[[books]]
name = "blog"

[[pages]]
book = "docs"
path = "/"
copyright = { date_copyrighted = "2024" }
children = ["/a", "/b", "/cleared"]

[[pages]]
book = "docs"
path = "/a"
copyright = { rights = "X" }
parents = ["/"]
children = ["/a/b"]

[[pages]]
book = "docs"
path = "/b"
copyright = { rights = "Y" }
parents = ["/"]
children = ["/a/b"]

[[pages]]
book = "docs"
path = "/a/b"
parents = ["/a", "/b"]

[[pages]]
book = "docs"
path = "/cleared"
copyright = { rights_holder = "", rights = "", date_copyrighted = "" }
parents = ["/"]

[[pages]]
book = "blog"
path = "/post"
"#;

    fn capture(
        engine: &PageCapturer<&Catalog, SynchronizedCache>,
        catalog: &Catalog,
        book: &str,
        path: &str,
    ) -> std::sync::Arc<Page> {
        engine
            .capture_page(&catalog.page_ref(book, path), CaptureLevel::Page)
            .unwrap()
    }

    #[test]
    fn test_fields_merge_across_levels() {
        // Given: rights on /a, date on the root, holder on the book
        let catalog = Catalog::from_toml_str(SITE).unwrap();
        let engine = PageCapturer::new(&catalog, SynchronizedCache::new());
        let a = capture(&engine, &catalog, "docs", "/a");

        // When
        let copyright = find_copyright(&engine, &a).unwrap().unwrap();

        // Then: Each field comes from the nearest level that sets it
        assert_eq!(
            copyright,
            Copyright::new(Field::text("ACME"), Field::text("X"), Field::text("2024"))
        );
        assert!(copyright.has_all_fields());
    }

    #[test]
    fn test_conflicting_rights_fail_the_whole_call() {
        let catalog = Catalog::from_toml_str(SITE).unwrap();
        let engine = PageCapturer::new(&catalog, SynchronizedCache::new());
        let child = capture(&engine, &catalog, "docs", "/a/b");

        match find_copyright(&engine, &child).unwrap_err() {
            Error::InheritanceConflict {
                field,
                first,
                second,
                page,
            } => {
                assert_eq!(field, "rights");
                assert_eq!(first, "X");
                assert_eq!(second, "Y");
                assert_eq!(page, catalog.page_ref("docs", "/a/b"));
            },
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_all_empty_is_none() {
        let catalog = Catalog::from_toml_str(SITE).unwrap();
        let engine = PageCapturer::new(&catalog, SynchronizedCache::new());

        let cleared = capture(&engine, &catalog, "docs", "/cleared");
        assert_eq!(find_copyright(&engine, &cleared).unwrap(), None);

        let post = capture(&engine, &catalog, "blog", "/post");
        assert_eq!(find_copyright(&engine, &post).unwrap(), None);
    }

    #[test]
    fn test_page_fields_distinguish_inherit_from_empty() {
        let page = Page::builder(crate::types::PageRef::missing("docs", "/x"))
            .copyright(Some(Copyright::new(
                Field::Inherit,
                Field::Empty,
                Field::text("2020"),
            )))
            .build();

        assert_eq!(
            CopyrightInheritance::page_fields(&page),
            vec![None, Some(None), Some(Some("2020".to_owned()))]
        );
    }
}
