use clap::{Args, Parser, Subcommand};

use crate::pipeline::BuildParams;
use crate::pipeline::packs::DeltaSource;

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    #[command(subcommand)]
    pub command: BuildSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum BuildSubcommand {
    /// Build the bundle chroots of the mix
    Bundles,

    /// Build update content from the bundle chroots
    #[command(after_help = "EXAMPLES:\n  \
                  Build and publish:\n    mixer build update\n\n\
                  Build without signing or publishing:\n    mixer build update --skip-signing --no-publish")]
    Update(UpdateArgs),

    /// Build bundles, then update content
    All(UpdateArgs),

    /// Create delta packs into a version
    #[command(after_help = "EXAMPLES:\n  \
                  Deltas from the three previous versions:\n    mixer build delta-packs --previous-versions 3\n\n\
                  Deltas from one version:\n    mixer build delta-packs --from 10 --to 30")]
    DeltaPacks(DeltaPacksArgs),
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Files changed before this version are not re-versioned
    #[arg(long, default_value_t = 0)]
    pub min_version: u32,

    /// Format to build (defaults to the mix format)
    #[arg(long)]
    pub format: Option<u32>,

    /// Do not sign the MoM
    #[arg(long)]
    pub skip_signing: bool,

    /// Do not move the latest version pointers
    #[arg(long)]
    pub no_publish: bool,

    /// Keep bundle chroots (hard-linked) after the build
    #[arg(long)]
    pub keep_chroots: bool,

    /// Move to the next mix version once the build is published
    #[arg(long, conflicts_with = "no_publish")]
    pub increment: bool,
}

impl From<&UpdateArgs> for BuildParams {
    fn from(args: &UpdateArgs) -> Self {
        Self {
            min_version: args.min_version,
            format: args.format,
            skip_signing: args.skip_signing,
            publish: !args.no_publish,
            keep_chroots: args.keep_chroots,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct DeltaPacksArgs {
    /// Version to create deltas from
    #[arg(
        long,
        conflicts_with = "previous_versions",
        required_unless_present = "previous_versions"
    )]
    pub from: Option<u32>,

    /// Number of previous versions to create deltas from
    #[arg(long)]
    pub previous_versions: Option<u32>,

    /// Version to create deltas to (defaults to the mix version)
    #[arg(long)]
    pub to: Option<u32>,
}

impl DeltaPacksArgs {
    pub fn source(&self) -> DeltaSource {
        match (self.from, self.previous_versions) {
            (Some(from), _) => DeltaSource::From(from),
            (None, count) => DeltaSource::PreviousVersions(count.unwrap_or(1)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};

    fn build_command(args: &[&str]) -> BuildSubcommand {
        let cli = Cli::try_parse_from(args).expect("parse");
        match cli.command {
            Commands::Build(args) => args.command,
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_update_defaults_publish() {
        let BuildSubcommand::Update(args) = build_command(&["mixer", "build", "update"]) else {
            panic!("Expected Update");
        };
        let params = BuildParams::from(&args);
        assert!(params.publish);
        assert!(!params.skip_signing);
        assert_eq!(params.format, None);
    }

    #[test]
    fn test_all_flags() {
        let BuildSubcommand::All(args) = build_command(&[
            "mixer",
            "build",
            "all",
            "--no-publish",
            "--keep-chroots",
            "--format",
            "3",
            "--min-version",
            "20",
        ]) else {
            panic!("Expected All");
        };
        let params = BuildParams::from(&args);
        assert!(!params.publish);
        assert!(params.keep_chroots);
        assert_eq!(params.format, Some(3));
        assert_eq!(params.min_version, 20);
    }

    #[test]
    fn test_increment_needs_publish() {
        let BuildSubcommand::Update(args) =
            build_command(&["mixer", "build", "update", "--increment"])
        else {
            panic!("Expected Update");
        };
        assert!(args.increment);
        assert!(
            Cli::try_parse_from(["mixer", "build", "update", "--increment", "--no-publish"])
                .is_err()
        );
    }

    #[test]
    fn test_delta_packs_source() {
        let BuildSubcommand::DeltaPacks(args) =
            build_command(&["mixer", "build", "delta-packs", "--previous-versions", "3"])
        else {
            panic!("Expected DeltaPacks");
        };
        assert_eq!(args.source(), DeltaSource::PreviousVersions(3));

        let BuildSubcommand::DeltaPacks(args) =
            build_command(&["mixer", "build", "delta-packs", "--from", "10", "--to", "30"])
        else {
            panic!("Expected DeltaPacks");
        };
        assert_eq!(args.source(), DeltaSource::From(10));
        assert_eq!(args.to, Some(30));
    }

    #[test]
    fn test_delta_packs_needs_exactly_one_source() {
        assert!(Cli::try_parse_from(["mixer", "build", "delta-packs"]).is_err());
        assert!(
            Cli::try_parse_from([
                "mixer",
                "build",
                "delta-packs",
                "--from",
                "10",
                "--previous-versions",
                "2"
            ])
            .is_err()
        );
    }
}
