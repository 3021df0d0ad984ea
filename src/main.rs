//! Mixer - custom OS mix builder
//!
//! Combines upstream and local bundle definitions into a mix, builds bundle
//! chroots and produces versioned update content for an update server.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod commands;
mod common;
mod config;
mod error;
mod hash;
mod merge;
mod pipeline;
mod process;
mod progress;
mod resolver;
mod version;
mod workspace;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};

/// Log to stderr, filtered by `RUST_LOG`; `--verbose` lowers the default to debug
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init(args) => commands::init::run(cli.workspace, &args),
        Commands::Bundle(args) => commands::bundle::run(cli.workspace, args),
        Commands::Build(args) => commands::build::run(cli.workspace, args),
        Commands::Versions(args) => commands::versions::run(cli.workspace, args),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
