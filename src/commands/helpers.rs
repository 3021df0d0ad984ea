//! Command helper utilities

use std::path::PathBuf;

use crate::catalog::{BundleCatalog, CatalogPaths};
use crate::error::{MixError, Result, fs as fs_error};
use crate::resolver::MixBundleList;
use crate::version::VersionLedger;
use crate::workspace::Workspace;

/// Resolve workspace path from optional argument
///
/// If a workspace path is provided, use it. Otherwise,
/// resolve to the current directory.
pub fn resolve_workspace_path(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => Ok(path),
        None => std::env::current_dir()
            .map_err(|e| fs_error::io_error(format!("Failed to get current directory: {e}"))),
    }
}

/// Find and open the workspace containing the given (or current) directory
pub fn open_workspace(workspace: Option<PathBuf>) -> Result<Workspace> {
    let workspace_path = resolve_workspace_path(workspace)?;
    let root = Workspace::find_from(&workspace_path).ok_or_else(|| MixError::WorkspaceNotFound {
        path: workspace_path.display().to_string(),
    })?;
    Workspace::open(&root)
}

/// Catalog of the workspace at its current upstream version
pub fn open_catalog(workspace: &Workspace) -> Result<BundleCatalog> {
    let upstream = VersionLedger::new(&workspace.root).upstream_version()?;
    Ok(BundleCatalog::new(CatalogPaths::for_workspace(
        workspace, upstream,
    )))
}

pub fn mix_list(workspace: &Workspace) -> MixBundleList {
    MixBundleList::new(workspace.mix_list_file())
}
