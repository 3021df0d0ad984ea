//! Init command implementation
//!
//! Creates the version files, the mix state and a mix list holding the
//! root bundle. The configuration file stays optional; defaults apply
//! until one is written.

use std::collections::BTreeSet;
use std::path::Path;

use console::Style;

use crate::cli::InitArgs;
use crate::commands::helpers::{mix_list, resolve_workspace_path};
use crate::common::fs::write_atomic;
use crate::config::{CONFIG_FILE, MixConfig};
use crate::error::{Result, config as config_error, fs as fs_error};
use crate::resolver::ROOT_BUNDLE;
use crate::version::{InitVersions, MixState, VersionLedger};
use crate::workspace::Workspace;

/// Run init command
pub fn run(workspace: Option<std::path::PathBuf>, args: &InitArgs) -> Result<()> {
    let root = resolve_workspace_path(workspace)?;
    let workspace = init_workspace(&root, args)?;

    println!(
        "{} mix {} on upstream {} in {}",
        Style::new().bold().green().apply_to("Initialized"),
        args.mix_version,
        args.upstream_version,
        workspace.root.display()
    );
    Ok(())
}

pub fn init_workspace(root: &Path, args: &InitArgs) -> Result<Workspace> {
    if Workspace::exists(root) {
        return Err(config_error::invalid(format!(
            "{} is already a mix workspace",
            root.display()
        )));
    }
    std::fs::create_dir_all(root).map_err(|e| fs_error::write_failed(root, &e))?;

    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        write_atomic(&config_path, MixConfig::default().to_yaml()?)?;
    }
    let workspace = Workspace::with_config(root)?;

    VersionLedger::new(root).init(&InitVersions {
        mix_version: args.mix_version,
        upstream_version: args.upstream_version,
        upstream_url: args.upstream_url.clone(),
    })?;
    MixState {
        format: args.format,
        previous_mix_version: 0,
    }
    .save(root)?;

    for dir in [workspace.local_bundle_dir(), workspace.state_dir()] {
        std::fs::create_dir_all(&dir).map_err(|e| fs_error::write_failed(&dir, &e))?;
    }

    let list = mix_list(&workspace);
    if list.read()?.is_empty() {
        list.write(&BTreeSet::from([ROOT_BUNDLE.to_string()]))?;
    }

    tracing::debug!("initialized workspace at {}", root.display());
    Ok(workspace)
}
