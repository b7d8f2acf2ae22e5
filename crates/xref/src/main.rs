//! xref CLI - API documentation cross-referencer.
//!
//! Provides commands for:
//! - `process`: Resolve links in a doclet set and write the result
//! - `nav`: Print the navigation sidebar for one page

mod commands;
mod error;
mod input;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{NavArgs, ProcessArgs};
use output::Output;

/// xref - API documentation cross-referencer.
#[derive(Parser)]
#[command(name = "xref", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a doclet set and write the rewritten doclets.
    Process(ProcessArgs),
    /// Print the navigation markup for a page.
    Nav(NavArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Process(args) => args.input.verbose,
        Commands::Nav(args) => args.input.verbose,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Process(args) => args.execute(),
        Commands::Nav(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
