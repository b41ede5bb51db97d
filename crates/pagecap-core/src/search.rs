//! Existence queries over the child graph.
//!
//! The graph may contain cycles and links into missing books; neither is an
//! error. Missing-book children are skipped, and a recursive search visits
//! every reachable page at most once.

use crate::cache::{Cache, MemoMap};
use crate::capture::CapturePage;
use crate::level::CaptureLevel;
use crate::types::{Element, Page, PageRef};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, instrument};

/// True if `page` has at least one child in a deployed book.
#[must_use]
pub fn has_child(page: &Page) -> bool {
    page.child_pages().iter().any(|child| !child.is_missing_book())
}

/// True if `page`, or with `recursive` any page reachable through child
/// links, contains an element matching `predicate`.
///
/// Descendants are captured at [`CaptureLevel::Meta`], so the predicate only
/// sees element kinds and ids there, never content. The walk is depth-first
/// in declaration order and stops at the first match, so later siblings of a
/// matching subtree are never captured. A non-recursive search looks at
/// `page` alone and captures nothing.
///
/// # Errors
///
/// Propagates capture failures of reachable pages.
#[instrument(skip(engine, page, predicate), fields(page = %page.page_ref()))]
pub fn has_element<E, P>(engine: &E, page: &Page, predicate: P, recursive: bool) -> Result<bool>
where
    E: CapturePage,
    P: Fn(&Element) -> bool,
{
    if page.elements().iter().any(&predicate) {
        return Ok(true);
    }
    if !recursive {
        return Ok(false);
    }

    let seen = engine.cache().new_map::<PageRef, ()>();
    seen.insert(page.page_ref().clone(), ());
    // One frame per page on the current path: its capture (`None` for the
    // start page) and the index of the next child to visit.
    let mut stack: Vec<(Option<Arc<Page>>, usize)> = vec![(None, 0)];

    while let Some((frame, index)) = stack.last_mut() {
        let next = frame
            .as_deref()
            .unwrap_or(page)
            .child_pages()
            .get(*index)
            .cloned();
        *index += 1;
        let Some(child_ref) = next else {
            stack.pop();
            continue;
        };
        if child_ref.is_missing_book() || seen.contains_key(&child_ref) {
            continue;
        }
        seen.insert(child_ref.clone(), ());
        let child = engine.capture_page(&child_ref, CaptureLevel::Meta)?;
        if child.elements().iter().any(&predicate) {
            debug!(found = %child_ref, visited = seen.len(), "Matching element found");
            return Ok(true);
        }
        stack.push((Some(child), 0));
    }

    debug!(visited = seen.len(), "No matching element");
    Ok(false)
}

/// [`has_element`] matching on element kind.
///
/// # Errors
///
/// See [`has_element`].
pub fn has_element_of_kind<E: CapturePage>(
    engine: &E,
    page: &Page,
    kind: &str,
    recursive: bool,
) -> Result<bool> {
    has_element(engine, page, |element| element.is_kind(kind), recursive)
}
