//! `pagecap copyright` - effective copyright of a page

use super::{Context, WithCache, dispatch, load_target};
use crate::cli::TargetArgs;
use crate::output::{self, log_stats};
use anyhow::Result;
use colored::Colorize;
use pagecap_core::{
    Cache, CaptureLevel, CapturePage, CaptureStatsSummary, Catalog, Copyright, PageCapturer,
    PageRef, ResolveConfig, Resolver,
};
use serde::Serialize;

/// Resolved copyright; every field is a value or `null`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CopyrightView {
    pub rights_holder: Option<String>,
    pub rights: Option<String>,
    pub date_copyrighted: Option<String>,
}

impl From<&Copyright> for CopyrightView {
    fn from(copyright: &Copyright) -> Self {
        Self {
            rights_holder: copyright.rights_holder.value().map(str::to_owned),
            rights: copyright.rights.value().map(str::to_owned),
            date_copyrighted: copyright.date_copyrighted.value().map(str::to_owned),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CopyrightReport {
    pub page: String,
    pub copyright: Option<CopyrightView>,
    pub stats: CaptureStatsSummary,
}

struct FindCopyright<'a> {
    catalog: &'a Catalog,
    page_ref: PageRef,
    resolve: &'a ResolveConfig,
}

impl WithCache for FindCopyright<'_> {
    type Output = CopyrightReport;

    fn run<C: Cache>(self, cache: C) -> Result<CopyrightReport> {
        let engine = PageCapturer::new(self.catalog, cache);
        let page = engine.capture_page(&self.page_ref, CaptureLevel::Page)?;
        let copyright = Resolver::from_config(&engine, self.resolve).copyright(&page)?;
        Ok(CopyrightReport {
            page: self.page_ref.to_string(),
            copyright: copyright.as_ref().map(CopyrightView::from),
            stats: engine.stats().summary(),
        })
    }
}

pub fn execute(target: &TargetArgs, context: &Context) -> Result<()> {
    let (catalog, page_ref) = load_target(target)?;
    let report = dispatch(
        &context.config.cache,
        FindCopyright {
            catalog: &catalog,
            page_ref,
            resolve: &context.config.resolve,
        },
    )?;
    log_stats(&report.stats);

    output::emit(context.format, &report, print_text)
}

fn print_text(report: &CopyrightReport) {
    println!("{}", report.page.bold());
    let Some(copyright) = &report.copyright else {
        println!("  {}", "no copyright".dimmed());
        return;
    };
    for (label, value) in [
        ("rights holder", &copyright.rights_holder),
        ("rights", &copyright.rights),
        ("date", &copyright.date_copyrighted),
    ] {
        match value {
            Some(value) => println!("  {label:<14} {value}"),
            None => println!("  {label:<14} {}", "-".dimmed()),
        }
    }
}
