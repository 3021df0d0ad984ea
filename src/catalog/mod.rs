//! Bundle catalog: locates bundle and package definitions
//!
//! Lookup order for a name, first match wins:
//!
//! 1. local bundle definition directory
//! 2. local flat package list
//! 3. upstream bundle definition directory (current upstream version)
//! 4. upstream flat package list
//!
//! The two package lists are read once per catalog, on first use.

pub mod bundle;
pub mod parser;

use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub use bundle::{Bundle, BundleSet, DefinitionKind, Origin};

use crate::common::fs::{list_files, read_optional};
use crate::error::{Result, bundle as bundle_error, fs as fs_error};
use crate::workspace::Workspace;

/// On-disk locations of the local and upstream catalogs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPaths {
    pub local_bundles: PathBuf,
    pub local_packages: PathBuf,
    pub upstream_bundles: PathBuf,
    pub upstream_packages: PathBuf,
}

impl CatalogPaths {
    /// Catalog paths of a workspace for one upstream version
    pub fn for_workspace(workspace: &Workspace, upstream_version: u32) -> Self {
        let upstream = workspace.upstream_catalog_dir(upstream_version);
        Self {
            local_bundles: workspace.local_bundle_dir(),
            local_packages: workspace.local_packages_file(),
            upstream_bundles: upstream.join("bundles"),
            upstream_packages: upstream.join("packages"),
        }
    }
}

/// Where a name resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: PathBuf,
    pub origin: Origin,
    pub kind: DefinitionKind,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.origin, self.kind)
    }
}

/// Local and upstream bundle catalogs with local-over-upstream precedence
#[derive(Debug)]
pub struct BundleCatalog {
    paths: CatalogPaths,
    local_packages: OnceCell<BTreeSet<String>>,
    upstream_packages: OnceCell<BTreeSet<String>>,
}

impl BundleCatalog {
    pub fn new(paths: CatalogPaths) -> Self {
        Self {
            paths,
            local_packages: OnceCell::new(),
            upstream_packages: OnceCell::new(),
        }
    }

    pub fn paths(&self) -> &CatalogPaths {
        &self.paths
    }

    /// Local package list, empty when the file does not exist
    pub fn local_packages(&self) -> Result<&BTreeSet<String>> {
        load_package_list(&self.local_packages, &self.paths.local_packages)
    }

    /// Upstream package list, empty when the file does not exist
    pub fn upstream_packages(&self) -> Result<&BTreeSet<String>> {
        load_package_list(&self.upstream_packages, &self.paths.upstream_packages)
    }

    fn packages(&self, origin: Origin) -> Result<&BTreeSet<String>> {
        match origin {
            Origin::Local => self.local_packages(),
            Origin::Upstream => self.upstream_packages(),
        }
    }

    fn bundles_dir(&self, origin: Origin) -> &Path {
        match origin {
            Origin::Local => &self.paths.local_bundles,
            Origin::Upstream => &self.paths.upstream_bundles,
        }
    }

    fn packages_file(&self, origin: Origin) -> &Path {
        match origin {
            Origin::Local => &self.paths.local_packages,
            Origin::Upstream => &self.paths.upstream_packages,
        }
    }

    /// Path a local definition for `name` has (or would have)
    pub fn local_definition_path(&self, name: &str) -> PathBuf {
        self.paths.local_bundles.join(name)
    }

    pub fn upstream_definition_path(&self, name: &str) -> PathBuf {
        self.paths.upstream_bundles.join(name)
    }

    /// Look `name` up in a single catalog
    pub fn locate_in(&self, name: &str, origin: Origin) -> Result<Option<Location>> {
        if !parser::is_valid_package_name(name) {
            return Err(bundle_error::invalid_name(name));
        }

        let definition = self.bundles_dir(origin).join(name);
        if definition.is_file() {
            return Ok(Some(Location {
                path: definition,
                origin,
                kind: DefinitionKind::Bundle,
            }));
        }

        if self.packages(origin)?.contains(name) {
            return Ok(Some(Location {
                path: self.packages_file(origin).to_path_buf(),
                origin,
                kind: DefinitionKind::Package,
            }));
        }

        Ok(None)
    }

    /// Look `name` up, local catalog first
    pub fn locate(&self, name: &str) -> Result<Location> {
        for origin in [Origin::Local, Origin::Upstream] {
            if let Some(location) = self.locate_in(name, origin)? {
                return Ok(location);
            }
        }
        Err(bundle_error::not_found(name))
    }

    /// Resolve and load `name`
    pub fn load(&self, name: &str) -> Result<Bundle> {
        let location = self.locate(name)?;
        Self::load_from(name, &location)
    }

    /// Load `name` from a known location
    pub fn load_from(name: &str, location: &Location) -> Result<Bundle> {
        if location.kind == DefinitionKind::Package {
            return Ok(Bundle::from_package(
                name,
                location.path.clone(),
                location.origin,
            ));
        }

        let content = fs::read_to_string(&location.path)
            .map_err(|e| fs_error::read_failed(&location.path, &e))?;
        let def = parser::parse_definition(&location.path, &content)?;

        Ok(Bundle {
            name: name.to_string(),
            filename: location.path.clone(),
            header: def.header,
            direct_includes: def.direct_includes,
            optional_includes: def.optional_includes,
            direct_packages: def.direct_packages,
            all_packages: BTreeSet::new(),
            content_chroots: def.content_chroots,
            files: BTreeSet::new(),
            origin: location.origin,
            kind: DefinitionKind::Bundle,
        })
    }

    /// Names of every entry of one catalog, without parsing definitions
    pub fn names(&self, origin: Origin) -> Result<BTreeSet<String>> {
        let mut names: BTreeSet<String> =
            list_files(self.bundles_dir(origin))?.into_iter().collect();
        names.extend(self.packages(origin)?.iter().cloned());
        Ok(names)
    }

    /// Every entry of one catalog: definition files plus package list entries
    ///
    /// Entries are loaded from that catalog directly, so a local definition
    /// does not hide the upstream entry of the same name here.
    pub fn entries(&self, origin: Origin) -> Result<BundleSet> {
        let mut set = BundleSet::new();

        for name in list_files(self.bundles_dir(origin))? {
            let location = Location {
                path: self.bundles_dir(origin).join(&name),
                origin,
                kind: DefinitionKind::Bundle,
            };
            let bundle = Self::load_from(&name, &location)?;
            set.insert(name, bundle);
        }

        for package in self.packages(origin)? {
            if set.contains_key(package) {
                continue;
            }
            set.insert(
                package.clone(),
                Bundle::from_package(package, self.packages_file(origin).to_path_buf(), origin),
            );
        }

        Ok(set)
    }
}

fn load_package_list<'a>(
    cell: &'a OnceCell<BTreeSet<String>>,
    path: &Path,
) -> Result<&'a BTreeSet<String>> {
    if let Some(packages) = cell.get() {
        return Ok(packages);
    }
    let packages = match read_optional(path)? {
        Some(content) => parser::parse_package_list(&content),
        None => {
            tracing::debug!("package list {} not found", path.display());
            BTreeSet::new()
        }
    };
    Ok(cell.get_or_init(|| packages))
}
