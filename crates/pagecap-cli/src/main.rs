//! pagecap CLI - inspect page catalogs through the capture cache
//!
//! Entry point: parses arguments, installs logging and dispatches to the
//! command modules.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    execute_command(cli)
}

fn initialize_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    // stdout carries command output, so logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn execute_command(cli: Cli) -> Result<()> {
    let context = commands::Context::load(cli.config.as_deref(), cli.scope, cli.format)?;

    match cli.command {
        Commands::Robots { target } => commands::robots::execute(&target, &context),
        Commands::Copyright { target } => commands::copyright::execute(&target, &context),
        Commands::HasElement {
            target,
            kind,
            recursive,
        } => commands::has_element::execute(&target, &kind, recursive, &context),
        Commands::Verify { catalog } => commands::verify::execute(&catalog, &context),
    }
}
