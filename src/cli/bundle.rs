use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::resolver::ListMode;

/// Arguments for the bundle command
#[derive(Parser, Debug)]
pub struct BundleArgs {
    #[command(subcommand)]
    pub command: BundleSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum BundleSubcommand {
    /// Add bundles to the mix
    #[command(after_help = "EXAMPLES:\n  \
                  Add bundles:\n    mixer bundle add editors os-core\n\n\
                  Add every local bundle:\n    mixer bundle add --all-local")]
    Add(AddArgs),

    /// Remove bundles from the mix
    #[command(after_help = "EXAMPLES:\n  \
                  Remove a bundle from the mix:\n    mixer bundle remove editors\n\n\
                  Delete the local definition but keep the bundle in the mix:\n    \
                  mixer bundle remove editors --no-mix --local -y")]
    Remove(RemoveArgs),

    /// List bundles in the mix or the catalogs
    #[command(after_help = "EXAMPLES:\n  \
                  List the mix:\n    mixer bundle list\n\n\
                  Show the include tree:\n    mixer bundle list --tree\n\n\
                  List upstream bundles:\n    mixer bundle list upstream")]
    List(ListArgs),

    /// Create local bundle definitions
    #[command(after_help = "EXAMPLES:\n  \
                  Copy an upstream bundle for editing:\n    mixer bundle create editors\n\n\
                  Create and add a new bundle:\n    mixer bundle create my-tools --add")]
    Create(CreateArgs),

    /// Validate local bundle definitions
    #[command(after_help = "EXAMPLES:\n  \
                  Validate one bundle:\n    mixer bundle validate editors\n\n\
                  Validate every local bundle strictly:\n    mixer bundle validate --all-local --strict")]
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Bundle names
    #[arg(required_unless_present_any = ["all_local", "all_upstream"])]
    pub bundles: Vec<String>,

    /// Add every local bundle
    #[arg(long)]
    pub all_local: bool,

    /// Add every upstream bundle
    #[arg(long)]
    pub all_upstream: bool,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Bundle names
    #[arg(required = true)]
    pub bundles: Vec<String>,

    /// Keep the bundles in the mix
    #[arg(long)]
    pub no_mix: bool,

    /// Delete the local bundle definitions
    #[arg(long)]
    pub local: bool,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Which bundles `bundle list` shows
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListModeArg {
    #[default]
    Mix,
    Local,
    Upstream,
}

impl From<ListModeArg> for ListMode {
    fn from(mode: ListModeArg) -> Self {
        match mode {
            ListModeArg::Mix => ListMode::Mix,
            ListModeArg::Local => ListMode::Local,
            ListModeArg::Upstream => ListMode::Upstream,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Which bundles to list
    #[arg(value_enum, default_value_t)]
    pub mode: ListModeArg,

    /// Show the include tree instead of a flat list
    #[arg(long)]
    pub tree: bool,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Bundle names
    #[arg(required = true)]
    pub bundles: Vec<String>,

    /// Also add the bundles to the mix
    #[arg(long)]
    pub add: bool,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Bundle names
    #[arg(required_unless_present = "all_local")]
    pub bundles: Vec<String>,

    /// Validate every local bundle
    #[arg(long)]
    pub all_local: bool,

    /// Also require complete header fields
    #[arg(long)]
    pub strict: bool,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    use super::*;

    fn bundle_command(args: &[&str]) -> BundleSubcommand {
        let cli = Cli::try_parse_from(args).expect("parse");
        match cli.command {
            Commands::Bundle(args) => args.command,
            _ => panic!("Expected Bundle command"),
        }
    }

    #[test]
    fn test_parse_add() {
        let BundleSubcommand::Add(args) =
            bundle_command(&["mixer", "bundle", "add", "editors", "os-core"])
        else {
            panic!("Expected Add");
        };
        assert_eq!(args.bundles, vec!["editors", "os-core"]);
        assert!(!args.all_local);
    }

    #[test]
    fn test_add_needs_names_or_all() {
        assert!(Cli::try_parse_from(["mixer", "bundle", "add"]).is_err());
        let BundleSubcommand::Add(args) = bundle_command(&["mixer", "bundle", "add", "--all-local"])
        else {
            panic!("Expected Add");
        };
        assert!(args.all_local);
        assert!(args.bundles.is_empty());
    }

    #[test]
    fn test_parse_remove_flags() {
        let BundleSubcommand::Remove(args) = bundle_command(&[
            "mixer", "bundle", "remove", "editors", "--no-mix", "--local", "-y",
        ]) else {
            panic!("Expected Remove");
        };
        assert!(args.no_mix);
        assert!(args.local);
        assert!(args.yes);
    }

    #[test]
    fn test_parse_list_mode() {
        let BundleSubcommand::List(args) = bundle_command(&["mixer", "bundle", "list"]) else {
            panic!("Expected List");
        };
        assert_eq!(args.mode, ListModeArg::Mix);

        let BundleSubcommand::List(args) =
            bundle_command(&["mixer", "bundle", "list", "upstream", "--tree"])
        else {
            panic!("Expected List");
        };
        assert_eq!(ListMode::from(args.mode), ListMode::Upstream);
        assert!(args.tree);
    }

    #[test]
    fn test_parse_validate_strict() {
        let BundleSubcommand::Validate(args) =
            bundle_command(&["mixer", "bundle", "validate", "--all-local", "--strict"])
        else {
            panic!("Expected Validate");
        };
        assert!(args.all_local && args.strict);
    }
}
