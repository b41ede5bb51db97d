//! `pagecap has-element` - existence search for an element kind

use super::{Context, WithCache, dispatch, load_target};
use crate::cli::TargetArgs;
use crate::output::{self, log_stats};
use anyhow::Result;
use colored::Colorize;
use pagecap_core::{
    Cache, CaptureLevel, CapturePage, CaptureStatsSummary, Catalog, PageCapturer, PageRef,
    has_element_of_kind,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HasElementReport {
    pub page: String,
    pub kind: String,
    pub recursive: bool,
    pub found: bool,
    pub stats: CaptureStatsSummary,
}

struct Search<'a> {
    catalog: &'a Catalog,
    page_ref: PageRef,
    kind: &'a str,
    recursive: bool,
}

impl WithCache for Search<'_> {
    type Output = HasElementReport;

    fn run<C: Cache>(self, cache: C) -> Result<HasElementReport> {
        let engine = PageCapturer::new(self.catalog, cache);
        let page = engine.capture_page(&self.page_ref, CaptureLevel::Page)?;
        let found = has_element_of_kind(&engine, &page, self.kind, self.recursive)?;
        Ok(HasElementReport {
            page: self.page_ref.to_string(),
            kind: self.kind.to_owned(),
            recursive: self.recursive,
            found,
            stats: engine.stats().summary(),
        })
    }
}

pub fn execute(target: &TargetArgs, kind: &str, recursive: bool, context: &Context) -> Result<()> {
    let (catalog, page_ref) = load_target(target)?;
    let report = dispatch(
        &context.config.cache,
        Search {
            catalog: &catalog,
            page_ref,
            kind,
            recursive,
        },
    )?;
    log_stats(&report.stats);

    output::emit(context.format, &report, |report| {
        let scope = if report.recursive { " (recursive)" } else { "" };
        println!(
            "{} has {}{scope}: {}",
            report.page.bold(),
            report.kind.cyan(),
            output::yes_no(report.found)
        );
    })
}
