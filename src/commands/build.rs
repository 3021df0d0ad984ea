//! Build command implementation

use console::Style;

use crate::cli::build::UpdateArgs;
use crate::cli::{BuildArgs, BuildSubcommand};
use crate::commands::helpers::open_workspace;
use crate::error::Result;
use crate::pipeline::{BuildParams, DefaultServices, PipelineOrchestrator};
use crate::version::VersionLedger;

/// Run build command
///
/// The stage timings are printed whether or not the build succeeded.
pub fn run(workspace: Option<std::path::PathBuf>, args: BuildArgs) -> Result<()> {
    let workspace = open_workspace(workspace)?;
    let ledger = VersionLedger::new(&workspace.root);
    let services = DefaultServices::for_workspace(&workspace, ledger.upstream_version()?);
    let mut orchestrator = PipelineOrchestrator::new(&workspace, services.collaborators());

    let result = match &args.command {
        BuildSubcommand::Bundles => orchestrator.build_bundles().map(|_| ()),
        BuildSubcommand::Update(update) => run_update(&mut orchestrator, &ledger, update),
        BuildSubcommand::All(update) => orchestrator
            .build_bundles()
            .and_then(|_| run_update(&mut orchestrator, &ledger, update)),
        BuildSubcommand::DeltaPacks(deltas) => orchestrator
            .delta_packs(deltas.to, deltas.source())
            .map(|failed| {
                if failed > 0 {
                    println!(
                        "{} {failed} delta pack(s) could not be created",
                        Style::new().bold().yellow().apply_to("Warning:")
                    );
                }
            }),
    };

    orchestrator.stopwatch().print_summary();
    result
}

fn run_update(
    orchestrator: &mut PipelineOrchestrator<'_>,
    ledger: &VersionLedger,
    args: &UpdateArgs,
) -> Result<()> {
    let summary = orchestrator.build_update(&BuildParams::from(args))?;
    let state = if args.no_publish { "built" } else { "published" };
    println!(
        "\nVersion {} {state}",
        Style::new().bold().green().apply_to(summary.version)
    );

    if args.increment {
        let next = ledger.bump_mix_version()?;
        println!("Mix version is now {next}");
    }
    Ok(())
}
