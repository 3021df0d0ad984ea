use clap::Parser;

use crate::version::DEFAULT_UPSTREAM_URL;

/// Arguments for the init command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Start a mix on top of upstream 30000:\n    mixer init --upstream-version 30000\n\n\
                  Use another update server:\n    mixer init --upstream-version 30000 --upstream-url https://updates.example.org")]
pub struct InitArgs {
    /// Upstream version the mix is based on
    #[arg(long)]
    pub upstream_version: u32,

    /// Upstream update server
    #[arg(long, default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,

    /// First mix version
    #[arg(long, default_value_t = 10)]
    pub mix_version: u32,

    /// Format of the first mix version
    #[arg(long, default_value_t = crate::version::state::DEFAULT_FORMAT)]
    pub format: u32,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};

    #[test]
    fn test_init_defaults() {
        let cli =
            Cli::try_parse_from(["mixer", "init", "--upstream-version", "30000"]).expect("parse");
        let Commands::Init(args) = cli.command else {
            panic!("Expected Init command");
        };
        assert_eq!(args.mix_version, 10);
        assert_eq!(args.format, 1);
        assert_eq!(args.upstream_url, DEFAULT_UPSTREAM_URL);
    }

    #[test]
    fn test_init_requires_upstream_version() {
        assert!(Cli::try_parse_from(["mixer", "init"]).is_err());
    }
}
