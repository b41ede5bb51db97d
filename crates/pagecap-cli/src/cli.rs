//! # CLI Structure and Argument Parsing
//!
//! `pagecap` answers questions about a page catalog the same way a server
//! would: every page is captured through a cache tier and the resolvers walk
//! the captured graph.
//!
//! ## Usage Patterns
//!
//! ```bash
//! # Effective robots policy and copyright of a page
//! pagecap robots site.toml docs /guide/install
//! pagecap copyright site.toml docs /guide/install --format json
//!
//! # Does anything below /downloads carry a file element?
//! pagecap has-element site.toml docs /downloads file --recursive
//!
//! # Check every parent/child link in the catalog
//! pagecap verify site.toml
//! ```
//!
//! ## Output Formats
//!
//! - **text**: Human-readable output (default)
//! - **json**: Machine-readable JSON, including capture statistics

use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pagecap_core::CacheScope;
use std::path::PathBuf;

/// Main CLI structure for the `pagecap` command
#[derive(Parser, Clone, Debug)]
#[command(name = "pagecap")]
#[command(version)]
#[command(about = "pagecap - capture, cache and resolve book/page catalogs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Path to configuration file (overrides the platform config). Also via `PAGECAP_CONFIG`.
    #[arg(long, global = true, value_name = "FILE", env = "PAGECAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache tier to capture through (overrides `[cache] scope`)
    #[arg(long, value_enum, global = true)]
    pub scope: Option<ScopeArg>,
}

/// Available subcommands for the `pagecap` CLI
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Effective allow-robots policy of a page
    Robots {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Effective copyright of a page
    Copyright {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Check whether a page (or anything below it) has an element of a kind
    HasElement {
        #[command(flatten)]
        target: TargetArgs,

        /// Element kind to look for, e.g. `file` or `heading`
        kind: String,

        /// Search every page reachable through child links
        #[arg(short, long)]
        recursive: bool,
    },

    /// Capture every page and report parent/child link mismatches
    Verify {
        /// Catalog file (TOML, or JSON with a `.json` extension)
        catalog: PathBuf,
    },
}

/// A page inside a catalog file.
#[derive(Args, Clone, Debug)]
pub struct TargetArgs {
    /// Catalog file (TOML, or JSON with a `.json` extension)
    pub catalog: PathBuf,

    /// Book name
    pub book: String,

    /// Page path within the book
    pub path: String,
}

/// Command-line spelling of [`CacheScope`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    /// Shared, fully concurrent cache
    Shared,
    /// Single request with concurrent subrequests
    Subrequest,
    /// Single sequential request
    Request,
}

impl From<ScopeArg> for CacheScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Shared => Self::Shared,
            ScopeArg::Subrequest => Self::Subrequest,
            ScopeArg::Request => Self::Request,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pagecap",
            "has-element",
            "site.toml",
            "docs",
            "/",
            "file",
            "--recursive",
            "--format",
            "json",
            "--scope",
            "shared",
        ])
        .unwrap();

        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(cli.scope, Some(ScopeArg::Shared));
        match cli.command {
            Commands::HasElement {
                target,
                kind,
                recursive,
            } => {
                assert_eq!(target.book, "docs");
                assert_eq!(kind, "file");
                assert!(recursive);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
