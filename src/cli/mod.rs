//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - init: Init command arguments
//! - bundle: Bundle subcommand arguments
//! - build: Build subcommand arguments
//! - versions: Versions command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod build;
pub mod bundle;
pub mod completions;
pub mod init;
pub mod versions;

pub use build::{BuildArgs, BuildSubcommand};
pub use bundle::{BundleArgs, BundleSubcommand};
pub use completions::CompletionsArgs;
pub use init::InitArgs;
pub use versions::{VersionsArgs, VersionsSubcommand};

/// Mixer - custom OS mix builder
///
/// Combine upstream bundles with local ones and build versioned update content.
#[derive(Parser, Debug)]
#[command(
    name = "mixer",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Build custom OS mixes from upstream and local bundles",
    long_about = "Mixer merges upstream bundle catalogs with local bundle definitions, \
                  builds bundle chroots and produces versioned, signed and incrementally \
                  updatable release content.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  mixer init --upstream-version 30000  \x1b[90m# Start a new mix\x1b[0m\n   \
                  mixer bundle add editors             \x1b[90m# Add a bundle to the mix\x1b[0m\n   \
                  mixer bundle list --tree             \x1b[90m# Show the mix include tree\x1b[0m\n   \
                  mixer build all                      \x1b[90m# Build bundles and update content\x1b[0m\n   \
                  mixer versions update                \x1b[90m# Move to the next mix version\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Workspace directory (defaults to current directory)
    #[arg(long, short = 'w', global = true, env = "MIXER_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a mix workspace
    Init(InitArgs),

    /// Manage the bundles of the mix
    Bundle(BundleArgs),

    /// Build bundles and update content
    Build(BuildArgs),

    /// Show or update mix and upstream versions
    Versions(VersionsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_init() {
        let cli = Cli::try_parse_from(["mixer", "init", "--upstream-version", "30000"])
            .expect("parse");
        match cli.command {
            Commands::Init(args) => assert_eq!(args.upstream_version, 30000),
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::try_parse_from(["mixer", "-v", "-w", "/tmp/mix", "versions"])
            .expect("parse");
        assert!(cli.verbose);
        assert_eq!(cli.workspace, Some(PathBuf::from("/tmp/mix")));
        assert!(matches!(cli.command, Commands::Versions(_)));
    }

    #[test]
    fn test_cli_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["mixer", "bundle", "list", "-w", "/tmp/mix"])
            .expect("parse");
        assert_eq!(cli.workspace, Some(PathBuf::from("/tmp/mix")));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["mixer"]).is_err());
    }
}
