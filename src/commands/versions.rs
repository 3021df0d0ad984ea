//! Versions command implementation
//!
//! Prints the ledger, or moves it forward with `versions update`.

use console::Style;

use crate::cli::versions::UpdateVersionsArgs;
use crate::cli::{VersionsArgs, VersionsSubcommand};
use crate::commands::helpers::open_workspace;
use crate::error::Result;
use crate::version::{MirrorUpstream, VersionLedger, VersionReport, VersionUpdate};

/// Run versions command
pub fn run(workspace: Option<std::path::PathBuf>, args: VersionsArgs) -> Result<()> {
    let workspace = open_workspace(workspace)?;
    let ledger = VersionLedger::new(&workspace.root);
    let upstream = MirrorUpstream::new(workspace.upstream_mirror());

    match args.command {
        None => {
            print!("{}", render_report(&ledger.report(&upstream)?));
            Ok(())
        }
        Some(VersionsSubcommand::Update(UpdateVersionsArgs {
            mix_version,
            upstream_version,
        })) => {
            let update = ledger.update_versions(mix_version, upstream_version, &upstream)?;
            print!("{}", render_update(&update));
            Ok(())
        }
    }
}

fn render_report(report: &VersionReport) -> String {
    let bold = Style::new().bold();
    format!(
        "{} {}\n{} {}\n\n{} {}, versions {} to {}\n",
        bold.apply_to("Mix:     "),
        report.mix,
        bold.apply_to("Upstream:"),
        report.upstream,
        bold.apply_to("Format:  "),
        report.range.format,
        report.range.first,
        report.range.latest
    )
}

fn render_update(update: &VersionUpdate) -> String {
    let bold = Style::new().bold().yellow();
    let mut out = format!(
        "Mix version:      {} -> {}\nUpstream version: {} -> {}\n",
        update.previous_mix,
        bold.apply_to(update.mix),
        update.previous_upstream,
        bold.apply_to(update.upstream)
    );
    if update.upstream == update.range.latest {
        out.push_str("Upstream is at the latest version of its format\n");
    }
    out
}
