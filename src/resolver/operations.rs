//! Operations that change the selected list or the local catalog

use std::collections::BTreeSet;
use std::fs;

use crate::catalog::{BundleCatalog, DefinitionKind, Location, Origin, parser};
use crate::common::fs::write_atomic;
use crate::error::{MixError, Result, fs as fs_error};
use crate::resolver::{BundleResolver, MixBundleList, validate_and_fill};

/// Options for [`add_bundles`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AddOptions {
    /// Add every entry of the local catalog
    pub all_local: bool,
    /// Add every entry of the upstream catalog
    pub all_upstream: bool,
}

#[derive(Debug, Default)]
pub struct AddReport {
    pub added: Vec<(String, Location)>,
    pub skipped: Vec<String>,
}

/// Add bundles to the selected list
///
/// Every name is resolved before anything is written, so an unknown name
/// leaves the list untouched.
pub fn add_bundles(
    catalog: &BundleCatalog,
    list: &MixBundleList,
    names: &[String],
    options: AddOptions,
) -> Result<AddReport> {
    let mut requested: Vec<(String, Location)> = Vec::new();

    for name in names {
        requested.push((name.clone(), catalog.locate(name)?));
    }
    for (enabled, origin) in [
        (options.all_local, Origin::Local),
        (options.all_upstream, Origin::Upstream),
    ] {
        if !enabled {
            continue;
        }
        for name in catalog.names(origin)? {
            if let Some(location) = catalog.locate_in(&name, origin)? {
                requested.push((name, location));
            }
        }
    }

    let mut selected = list.read_set()?;
    let mut report = AddReport::default();

    for (name, location) in requested {
        if !selected.insert(name.clone()) {
            tracing::warn!("Bundle {name:?} already in mix; skipping");
            report.skipped.push(name);
            continue;
        }
        report.added.push((name, location));
    }

    list.write(&selected)?;
    Ok(report)
}

/// Options for [`remove_bundles`]
#[derive(Debug, Clone, Copy)]
pub struct RemoveOptions {
    /// Remove the names from the selected list
    pub mix: bool,
    /// Delete the local definition files
    pub local: bool,
}

impl Default for RemoveOptions {
    fn default() -> Self {
        Self {
            mix: true,
            local: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct RemoveReport {
    pub removed_from_mix: Vec<String>,
    pub deleted_local: Vec<String>,
    /// Selected bundles that fell back to another catalog entry
    pub now_points: Vec<(String, Location)>,
    /// Selected bundles that no longer resolve at all
    pub invalid_left: Vec<String>,
}

/// Remove bundles from the selected list and/or the local catalog
pub fn remove_bundles(
    catalog: &BundleCatalog,
    list: &MixBundleList,
    names: &[String],
    options: RemoveOptions,
) -> Result<RemoveReport> {
    let mut selected = list.read_set()?;
    let mut report = RemoveReport::default();

    for name in names {
        if options.mix {
            if selected.remove(name) {
                report.removed_from_mix.push(name.clone());
            } else {
                tracing::warn!("Bundle {name:?} not found in mix; skipping");
            }
        }

        if !options.local {
            continue;
        }

        let path = catalog.local_definition_path(name);
        if !path.is_file() {
            tracing::warn!("Bundle {name:?} not found in local-bundles; skipping");
            continue;
        }
        fs::remove_file(&path).map_err(|e| fs_error::write_failed(&path, &e))?;
        report.deleted_local.push(name.clone());

        if options.mix || !selected.contains(name) {
            continue;
        }
        // The catalog caches package lists only, so this sees the deletion.
        match catalog.locate(name) {
            Ok(location) => report.now_points.push((name.clone(), location)),
            Err(MixError::BundleNotFound { .. }) => {
                tracing::warn!("Invalid bundle left in mix: {name}");
                report.invalid_left.push(name.clone());
            }
            Err(e) => return Err(e),
        }
    }

    if options.mix {
        list.write(&selected)?;
    }
    Ok(report)
}

#[derive(Debug, Default)]
pub struct CreateReport {
    pub copied: Vec<String>,
    pub templated: Vec<String>,
    pub existing: Vec<String>,
}

/// Create local definitions, copying the upstream one when available
///
/// With `add` set the names are also added to the selected list.
pub fn create_bundles(
    catalog: &BundleCatalog,
    list: &MixBundleList,
    names: &[String],
    add: bool,
) -> Result<CreateReport> {
    for name in names {
        parser::validate_bundle_name(name)?;
    }

    let mut report = CreateReport::default();
    for name in names {
        let local = catalog.local_definition_path(name);
        if local.exists() {
            tracing::warn!("Bundle {name:?} already exists in local-bundles; skipping");
            report.existing.push(name.clone());
            continue;
        }

        let upstream = catalog.upstream_definition_path(name);
        if upstream.is_file() {
            let content =
                fs::read_to_string(&upstream).map_err(|e| fs_error::read_failed(&upstream, &e))?;
            write_atomic(&local, content)?;
            report.copied.push(name.clone());
        } else {
            write_atomic(&local, parser::definition_template(name))?;
            report.templated.push(name.clone());
        }
    }

    if add {
        let mut selected = list.read_set()?;
        selected.extend(names.iter().cloned());
        list.write(&selected)?;
    }
    Ok(report)
}

/// How thorough [`validate_bundles`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationLevel {
    /// Name, syntax and include checks
    #[default]
    Basic,
    /// Basic checks plus a complete header
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub name: String,
    pub problems: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Validate local bundle definitions
///
/// Problems are collected per bundle instead of stopping at the first one.
pub fn validate_bundles(
    catalog: &BundleCatalog,
    names: &[String],
    all_local: bool,
    level: ValidationLevel,
) -> Result<Vec<ValidationResult>> {
    let mut targets: BTreeSet<String> = names.iter().cloned().collect();
    if all_local {
        targets.extend(crate::common::fs::list_files(&catalog.paths().local_bundles)?);
    }

    let resolver = BundleResolver::new(catalog);
    let mut results = Vec::with_capacity(targets.len());

    for name in targets {
        let problems = validate_one(catalog, &resolver, &name, level)?;
        results.push(ValidationResult { name, problems });
    }
    Ok(results)
}

fn validate_one(
    catalog: &BundleCatalog,
    resolver: &BundleResolver<'_>,
    name: &str,
    level: ValidationLevel,
) -> Result<Vec<String>> {
    let mut problems = Vec::new();

    if let Err(e) = parser::validate_bundle_name(name) {
        problems.push(e.to_string());
        return Ok(problems);
    }

    let location = match catalog.locate_in(name, Origin::Local)? {
        Some(location) if location.kind == DefinitionKind::Bundle => location,
        _ => {
            problems.push(format!("no local definition for bundle {name:?}"));
            return Ok(problems);
        }
    };

    let bundle = match BundleCatalog::load_from(name, &location) {
        Ok(bundle) => bundle,
        Err(e) => {
            problems.push(e.to_string());
            return Ok(problems);
        }
    };

    match resolver.full_bundle_set([name]) {
        Ok(mut set) => {
            if let Err(e) = validate_and_fill(&mut set) {
                problems.push(e.to_string());
            }
        }
        Err(e) => problems.push(e.to_string()),
    }

    if level == ValidationLevel::Strict {
        let header = &bundle.header;
        if header.title.is_empty() {
            problems.push("missing TITLE header".to_string());
        } else if header.title != name {
            problems.push(format!(
                "TITLE {:?} does not match bundle name {name:?}",
                header.title
            ));
        }
        for (key, value) in [
            ("DESCRIPTION", &header.description),
            ("MAINTAINER", &header.maintainer),
            ("STATUS", &header.status),
            ("CAPABILITIES", &header.capabilities),
        ] {
            if value.is_empty() {
                problems.push(format!("missing {key} header"));
            }
        }
    }

    Ok(problems)
}
