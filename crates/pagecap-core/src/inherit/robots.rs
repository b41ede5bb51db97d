use super::Inheritable;
use crate::types::{Book, Page};

/// The robots policy: a single boolean field.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowRobots;

impl Inheritable for AllowRobots {
    type Value = bool;
    type Resolved = bool;

    const FIELDS: &'static [&'static str] = &["allow_robots"];

    fn page_fields(page: &Page) -> Vec<Option<bool>> {
        vec![page.allow_robots()]
    }

    fn resolved_fields(resolved: &bool) -> Vec<bool> {
        vec![*resolved]
    }

    fn book_fields(book: &Book) -> Vec<bool> {
        vec![book.allow_robots()]
    }

    fn assemble(fields: Vec<bool>) -> bool {
        matches!(fields.as_slice(), [true])
    }

    fn describe(value: &bool) -> String {
        value.to_string()
    }
}
