//! Bundle command implementation
//!
//! Thin wrappers around the resolver operations that print their reports.

use console::Style;
use inquire::Confirm;

use crate::catalog::Origin;
use crate::cli::bundle::{AddArgs, CreateArgs, ListArgs, RemoveArgs, ValidateArgs};
use crate::cli::{BundleArgs, BundleSubcommand};
use crate::commands::helpers::{mix_list, open_catalog, open_workspace};
use crate::error::{MixError, Result, bundle as bundle_error};
use crate::resolver::list::{list_entries, render_list, render_tree};
use crate::resolver::operations::{
    add_bundles, create_bundles, remove_bundles, validate_bundles,
};
use crate::resolver::{
    AddOptions, BundleResolver, ListMode, RemoveOptions, ROOT_BUNDLE, ValidationLevel,
};

/// Run bundle command
pub fn run(workspace: Option<std::path::PathBuf>, args: BundleArgs) -> Result<()> {
    match args.command {
        BundleSubcommand::Add(args) => add(workspace, &args),
        BundleSubcommand::Remove(args) => remove(workspace, &args),
        BundleSubcommand::List(args) => list(workspace, &args),
        BundleSubcommand::Create(args) => create(workspace, &args),
        BundleSubcommand::Validate(args) => validate(workspace, &args),
    }
}

fn add(workspace: Option<std::path::PathBuf>, args: &AddArgs) -> Result<()> {
    let workspace = open_workspace(workspace)?;
    let catalog = open_catalog(&workspace)?;

    let report = add_bundles(
        &catalog,
        &mix_list(&workspace),
        &args.bundles,
        AddOptions {
            all_local: args.all_local,
            all_upstream: args.all_upstream,
        },
    )?;

    for (name, location) in &report.added {
        println!(
            "Adding bundle \"{}\" from {location}",
            Style::new().bold().yellow().apply_to(name)
        );
    }
    Ok(())
}

fn remove(workspace: Option<std::path::PathBuf>, args: &RemoveArgs) -> Result<()> {
    let workspace = open_workspace(workspace)?;
    let catalog = open_catalog(&workspace)?;

    if args.local && !args.yes && !confirm_local_delete(&args.bundles)? {
        println!("Removal cancelled.");
        return Ok(());
    }

    let report = remove_bundles(
        &catalog,
        &mix_list(&workspace),
        &args.bundles,
        RemoveOptions {
            mix: !args.no_mix,
            local: args.local,
        },
    )?;

    for name in &report.removed_from_mix {
        println!(
            "Removing bundle \"{}\" from mix",
            Style::new().bold().yellow().apply_to(name)
        );
        if name == ROOT_BUNDLE {
            println!(
                "{} {ROOT_BUNDLE} is required to build the mix",
                Style::new().bold().red().apply_to("Warning:")
            );
        }
    }
    for name in &report.deleted_local {
        println!("Removed local definition of {name}");
    }
    for (name, location) in &report.now_points {
        println!("Mix bundle {name} now points to {location}");
    }
    Ok(())
}

fn confirm_local_delete(bundles: &[String]) -> Result<bool> {
    println!("\nLocal bundle definitions to delete:");
    for name in bundles {
        println!("  - {}", Style::new().bold().yellow().apply_to(name));
    }
    println!();

    let confirmed = Confirm::new("Delete these local definitions?")
        .with_default(false)
        .with_help_message("Press Enter to cancel, or type 'y' to delete")
        .prompt();

    match confirmed {
        Ok(answer) => Ok(answer),
        Err(e) => match MixError::from(e) {
            MixError::OperationCancelled => Ok(false),
            other => Err(other),
        },
    }
}

fn list(workspace: Option<std::path::PathBuf>, args: &ListArgs) -> Result<()> {
    let workspace = open_workspace(workspace)?;
    let catalog = open_catalog(&workspace)?;
    let list = mix_list(&workspace);
    let mode = ListMode::from(args.mode);

    if args.tree {
        let roots: Vec<String> = match mode {
            ListMode::Mix => list.read()?,
            ListMode::Local => catalog.names(Origin::Local)?.into_iter().collect(),
            ListMode::Upstream => catalog.names(Origin::Upstream)?.into_iter().collect(),
        };
        let set = BundleResolver::new(&catalog).full_bundle_set(&roots)?;
        print!("{}", render_tree(&set, &roots));
        return Ok(());
    }

    let entries = list_entries(&catalog, &list, mode)?;
    if entries.is_empty() {
        println!("No bundles found.");
        return Ok(());
    }
    print!("{}", render_list(&entries));
    Ok(())
}

fn create(workspace: Option<std::path::PathBuf>, args: &CreateArgs) -> Result<()> {
    let workspace = open_workspace(workspace)?;
    let catalog = open_catalog(&workspace)?;

    let report = create_bundles(&catalog, &mix_list(&workspace), &args.bundles, args.add)?;

    for name in &report.copied {
        println!("Copied upstream bundle {name} to local-bundles");
    }
    for name in &report.templated {
        println!("Created new bundle {name} from template");
    }
    if args.add {
        println!("Added {} to the mix", args.bundles.join(", "));
    }
    Ok(())
}

fn validate(workspace: Option<std::path::PathBuf>, args: &ValidateArgs) -> Result<()> {
    let workspace = open_workspace(workspace)?;
    let catalog = open_catalog(&workspace)?;
    let level = if args.strict {
        ValidationLevel::Strict
    } else {
        ValidationLevel::Basic
    };

    let results = validate_bundles(&catalog, &args.bundles, args.all_local, level)?;
    let mut failed = Vec::new();
    for result in &results {
        if result.is_valid() {
            println!("{} {}", Style::new().green().apply_to("ok"), result.name);
            continue;
        }
        println!("{} {}", Style::new().bold().red().apply_to("invalid"), result.name);
        for problem in &result.problems {
            println!("    {problem}");
        }
        failed.push(result);
    }

    match failed.as_slice() {
        [] => Ok(()),
        [single] => Err(bundle_error::validation_failed(&single.name, &single.problems)),
        many => Err(bundle_error::validation_failed(
            format!("{} bundles", many.len()),
            &many
                .iter()
                .map(|r| format!("{}: {}", r.name, r.problems.join("; ")))
                .collect::<Vec<_>>(),
        )),
    }
}
