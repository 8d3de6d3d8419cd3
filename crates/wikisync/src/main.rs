//! wikisync CLI - Markdown to Confluence page tree synchronizer.
//!
//! Provides commands for:
//! - `sync`: Create or update a page hierarchy from a directory of documents
//! - `convert`: Print the storage markup of a single document

mod commands;
mod error;
mod output;

use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, SyncArgs};
use output::Output;

/// wikisync - Markdown to Confluence synchronizer.
#[derive(Parser)]
#[command(name = "wikisync", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize a directory of documents to Confluence.
    Sync(SyncArgs),
    /// Convert one document to Confluence storage markup.
    Convert(ConvertArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Sync(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Sync(args) => args.execute(),
        Commands::Convert(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        let mut source = err.source();
        while let Some(cause) = source {
            output.error(&format!("  caused by: {cause}"));
            source = cause.source();
        }
        std::process::exit(1);
    }
}
