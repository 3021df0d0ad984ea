use clap::{Args, Parser, Subcommand};

use crate::version::UpstreamTarget;

/// Arguments for the versions command
///
/// Without a subcommand the current versions are printed.
#[derive(Parser, Debug)]
pub struct VersionsArgs {
    #[command(subcommand)]
    pub command: Option<VersionsSubcommand>,
}

#[derive(Subcommand, Debug)]
pub enum VersionsSubcommand {
    /// Move to a new mix version and upstream version
    #[command(after_help = "EXAMPLES:\n  \
                  Next mix version on the latest upstream:\n    mixer versions update\n\n\
                  Pick both versions:\n    mixer versions update --mix-version 40 --upstream-version 31000")]
    Update(UpdateVersionsArgs),
}

#[derive(Args, Debug)]
pub struct UpdateVersionsArgs {
    /// New mix version (defaults to the current one plus 10)
    #[arg(long)]
    pub mix_version: Option<u32>,

    /// New upstream version, or "latest" of the current format
    #[arg(long, default_value = "latest")]
    pub upstream_version: UpstreamTarget,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};

    #[test]
    fn test_versions_without_subcommand() {
        let cli = Cli::try_parse_from(["mixer", "versions"]).expect("parse");
        let Commands::Versions(args) = cli.command else {
            panic!("Expected Versions command");
        };
        assert!(args.command.is_none());
    }

    #[test]
    fn test_versions_update() {
        let cli = Cli::try_parse_from([
            "mixer",
            "versions",
            "update",
            "--mix-version",
            "40",
            "--upstream-version",
            "31000",
        ])
        .expect("parse");
        let Commands::Versions(VersionsArgs {
            command: Some(VersionsSubcommand::Update(args)),
        }) = cli.command
        else {
            panic!("Expected versions update");
        };
        assert_eq!(args.mix_version, Some(40));
        assert_eq!(args.upstream_version, UpstreamTarget::Version(31000));
    }

    #[test]
    fn test_versions_update_defaults_to_latest() {
        let cli = Cli::try_parse_from(["mixer", "versions", "update"]).expect("parse");
        let Commands::Versions(VersionsArgs {
            command: Some(VersionsSubcommand::Update(args)),
        }) = cli.command
        else {
            panic!("Expected versions update");
        };
        assert_eq!(args.upstream_version, UpstreamTarget::Latest);
        assert_eq!(args.mix_version, None);
    }
}
