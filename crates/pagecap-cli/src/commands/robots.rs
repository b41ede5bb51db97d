//! `pagecap robots` - effective allow-robots policy of a page

use super::{Context, WithCache, dispatch, load_target};
use crate::cli::TargetArgs;
use crate::output::{self, log_stats};
use anyhow::Result;
use colored::Colorize;
use pagecap_core::{
    Cache, CaptureLevel, CapturePage, CaptureStatsSummary, Catalog, PageCapturer, PageRef,
    ResolveConfig, Resolver,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RobotsReport {
    pub page: String,
    pub allow_robots: bool,
    pub stats: CaptureStatsSummary,
}

struct Robots<'a> {
    catalog: &'a Catalog,
    page_ref: PageRef,
    resolve: &'a ResolveConfig,
}

impl WithCache for Robots<'_> {
    type Output = RobotsReport;

    fn run<C: Cache>(self, cache: C) -> Result<RobotsReport> {
        let engine = PageCapturer::new(self.catalog, cache);
        let page = engine.capture_page(&self.page_ref, CaptureLevel::Page)?;
        let allow_robots = Resolver::from_config(&engine, self.resolve).allow_robots(&page)?;
        Ok(RobotsReport {
            page: self.page_ref.to_string(),
            allow_robots,
            stats: engine.stats().summary(),
        })
    }
}

pub fn execute(target: &TargetArgs, context: &Context) -> Result<()> {
    let (catalog, page_ref) = load_target(target)?;
    let report = dispatch(
        &context.config.cache,
        Robots {
            catalog: &catalog,
            page_ref,
            resolve: &context.config.resolve,
        },
    )?;
    log_stats(&report.stats);

    output::emit(context.format, &report, |report| {
        println!(
            "{} allow robots: {}",
            report.page.bold(),
            output::yes_no(report.allow_robots)
        );
    })
}
