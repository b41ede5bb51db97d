//! Command implementations for the pagecap CLI.
//!
//! Each command loads its catalog, builds the cache tier selected by the
//! configuration and runs the resolvers through a [`PageCapturer`].

pub mod copyright;
pub mod has_element;
pub mod robots;
pub mod verify;

use crate::cli::{ScopeArg, TargetArgs};
use crate::output::OutputFormat;
use anyhow::{Context as _, Result};
use pagecap_core::{
    Cache, CacheConfig, CacheScope, Catalog, Config, ConcurrentCache, PageRef, RequestCache,
    SynchronizedCache,
};
use std::path::Path;
use tracing::debug;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub format: OutputFormat,
}

impl Context {
    /// Load configuration from `--config` or the platform file, then apply
    /// environment overrides and the `--scope` flag.
    pub fn load(path: Option<&Path>, scope: Option<ScopeArg>, format: OutputFormat) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let mut config = Config::from_path(path)?;
                config.apply_env_overrides()?;
                config
            },
            None => Config::load()?,
        };
        if let Some(scope) = scope {
            config.cache.scope = scope.into();
        }
        debug!(?config, "Loaded configuration");
        Ok(Self { config, format })
    }
}

/// Load a catalog file with the path in the error context.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    Catalog::load(path).with_context(|| format!("Failed to load catalog {}", path.display()))
}

/// Load the target's catalog and resolve the target page reference.
pub fn load_target(target: &TargetArgs) -> Result<(Catalog, PageRef)> {
    let catalog = load_catalog(&target.catalog)?;
    let page_ref = catalog.page_ref(&target.book, &target.path);
    Ok((catalog, page_ref))
}

/// Work that runs against whichever cache tier the configuration selects.
pub trait WithCache {
    type Output;

    fn run<C: Cache>(self, cache: C) -> Result<Self::Output>;
}

/// Build the configured cache tier and hand it to `work`.
pub fn dispatch<W: WithCache>(config: &CacheConfig, work: W) -> Result<W::Output> {
    debug!(scope = ?config.scope, "Building cache");
    match config.scope {
        CacheScope::Shared => work.run(ConcurrentCache::from_config(config)),
        CacheScope::Subrequest => work.run(SynchronizedCache::from_config(config)),
        CacheScope::Request => work.run(RequestCache::from_config(config)),
    }
}
