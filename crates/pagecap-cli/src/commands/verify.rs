//! `pagecap verify` - capture every page and report link mismatches
//!
//! A cache only checks a new capture against neighbours it already holds,
//! so the catalog is captured twice, forwards and backwards, each time into
//! a fresh verifying cache. Every link is then checked from both ends.

use super::{Context, WithCache, dispatch, load_catalog};
use crate::output;
use anyhow::{Result, bail};
use colored::Colorize;
use pagecap_core::{
    Cache, CacheConfig, CaptureLevel, CapturePage, CaptureStatsSummary, Catalog, Error,
    PageCapturer, PageRef,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Violation {
    pub page: String,
    pub related: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub pages: usize,
    pub violations: Vec<Violation>,
    pub stats: CaptureStatsSummary,
}

struct CaptureAll<'a> {
    catalog: &'a Catalog,
    order: Vec<&'a PageRef>,
}

impl WithCache for CaptureAll<'_> {
    type Output = (Vec<(PageRef, PageRef, String)>, CaptureStatsSummary);

    fn run<C: Cache>(self, cache: C) -> Result<Self::Output> {
        let engine = PageCapturer::new(self.catalog, cache);
        let mut found = Vec::new();
        for page_ref in self.order {
            match engine.capture_page(page_ref, CaptureLevel::Meta) {
                Ok(_) => {},
                Err(Error::Structure {
                    page,
                    related,
                    reason,
                }) => found.push((page, related, reason)),
                Err(other) => return Err(other.into()),
            }
        }
        Ok((found, engine.stats().summary()))
    }
}

pub fn execute(catalog_path: &Path, context: &Context) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;
    let report = verify(&catalog, &context.config.cache)?;
    output::log_stats(&report.stats);

    output::emit(context.format, &report, print_text)?;
    if !report.violations.is_empty() {
        bail!("{} parent/child violation(s) found", report.violations.len());
    }
    Ok(())
}

fn verify(catalog: &Catalog, cache: &CacheConfig) -> Result<VerifyReport> {
    let config = CacheConfig {
        verify_parent_child: true,
        ..cache.clone()
    };
    let forward: Vec<&PageRef> = catalog.page_refs().collect();
    let backward: Vec<&PageRef> = forward.iter().rev().copied().collect();

    let mut violations = BTreeMap::new();
    let mut stats = CaptureStatsSummary::default();
    for order in [forward, backward] {
        let (found, pass) = dispatch(&config, CaptureAll { catalog, order })?;
        debug!(violations = found.len(), builds = pass.builds, "Verification pass done");
        for (page, related, reason) in found {
            // Same link seen from either end
            let key = if page.to_string() <= related.to_string() {
                (page.to_string(), related.to_string())
            } else {
                (related.to_string(), page.to_string())
            };
            violations.entry(key).or_insert_with(|| Violation {
                page: page.to_string(),
                related: related.to_string(),
                reason,
            });
        }
        stats.hits += pass.hits;
        stats.fallbacks += pass.fallbacks;
        stats.misses += pass.misses;
        stats.builds += pass.builds;
    }

    Ok(VerifyReport {
        pages: catalog.len(),
        violations: violations.into_values().collect(),
        stats,
    })
}

fn print_text(report: &VerifyReport) {
    if report.violations.is_empty() {
        println!("{} {} pages, all links consistent", "✓".green(), report.pages);
        return;
    }
    println!(
        "{} {} pages, {} violation(s)",
        "✗".red(),
        report.pages,
        report.violations.len()
    );
    for violation in &report.violations {
        println!(
            "  {} -> {}: {}",
            violation.page.bold(),
            violation.related,
            violation.reason
        );
    }
}
