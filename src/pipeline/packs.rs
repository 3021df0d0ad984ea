//! Zero and delta pack scheduling

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, pipeline as pipeline_error};
use crate::pipeline::artifact::{ArtifactStore, PackKey, ensure};
use crate::pipeline::manifest::{Manifest, manifest_file_name};
use crate::pipeline::services::{BundleVersion, ManifestService, PackRequest, PackSummary};
use crate::pipeline::workers::run_pool;

/// Everything a pack task needs
pub struct PackContext<'a> {
    pub service: &'a dyn ManifestService,
    pub store: &'a dyn ArtifactStore,
    pub www_dir: PathBuf,
    pub image_dir: PathBuf,
    pub workers: usize,
}

impl PackContext<'_> {
    fn request(&self, key: &PackKey) -> PackRequest {
        PackRequest {
            bundle: key.bundle.clone(),
            from: key.from,
            to: key.to,
            output_dir: self.www_dir.clone(),
            chroot_dir: self.image_dir.clone(),
            workers: self.workers,
        }
    }

    /// MoM of `version` in the `www` directory
    pub fn read_mom(&self, version: u32) -> Result<Manifest> {
        self.service.parse_manifest_file(&mom_path(&self.www_dir, version))
    }
}

pub fn mom_path(www_dir: &Path, version: u32) -> PathBuf {
    www_dir.join(version.to_string()).join(manifest_file_name("MoM"))
}

fn pack_report(title: &str, summary: &PackSummary) -> String {
    let mut out = format!("{title}\n");
    for warning in &summary.warnings {
        let _ = writeln!(out, "  WARNING: {warning}");
    }
    let _ = writeln!(out, "  Fullfiles in pack: {}", summary.fullfiles);
    let _ = write!(out, "  Deltas in pack: {}", summary.deltas);
    out
}

/// Create `pack-<bundle>-from-0.tar` for every bundle of a MoM
pub fn create_zero_packs(ctx: &PackContext<'_>, bundles: &[BundleVersion]) -> Result<()> {
    let keys = bundles
        .iter()
        .map(|b| {
            if b.version == 0 {
                return Err(pipeline_error::invalid_pack_range(&b.name, 0, 0));
            }
            Ok(PackKey::new(&b.name, 0, b.version))
        })
        .collect::<Result<Vec<_>>>()?;

    run_pool(ctx.workers, keys, |key| {
        ensure(ctx.store, &key, || {
            let summary = ctx.service.create_pack(&ctx.request(&key))?;
            println!(
                "{}",
                pack_report(
                    &format!(
                        "Creating zero pack for {} to version {}",
                        key.bundle, key.to
                    ),
                    &summary
                )
            );
            Ok(())
        })
        .map(|_| ())
    })
}

/// Where delta packs start from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaSource {
    /// One explicit from version
    From(u32),
    /// Up to N versions back along the `previous` chain
    PreviousVersions(u32),
}

/// Bundles that changed between two MoMs
///
/// Bundles missing from `from` are packed from 0.
pub fn bundles_to_pack(from: &Manifest, to: &Manifest) -> Result<Vec<PackKey>> {
    let before = from.bundle_versions();
    let mut keys = Vec::new();

    for (name, to_version) in to.bundle_versions() {
        let from_version = before.get(&name).copied().unwrap_or(0);
        if from_version > to_version {
            return Err(pipeline_error::invalid_pack_range(
                name,
                from_version,
                to_version,
            ));
        }
        if to_version > from_version {
            keys.push(PackKey::new(name, from_version, to_version));
        }
    }
    Ok(keys)
}

/// MoMs to create delta packs from, newest first
fn source_manifests(
    ctx: &PackContext<'_>,
    to: &Manifest,
    source: DeltaSource,
) -> Result<Vec<Manifest>> {
    match source {
        DeltaSource::From(version) => {
            if version > to.header.version {
                return Err(pipeline_error::invalid_parameter(format!(
                    "cannot create delta packs from version {version} to older version {}",
                    to.header.version
                )));
            }
            Ok(vec![ctx.read_mom(version)?])
        }
        DeltaSource::PreviousVersions(count) => {
            let mut manifests = Vec::new();
            let mut previous = to.header.previous;
            for _ in 0..count {
                if previous == 0 {
                    break;
                }
                let Ok(manifest) = ctx.read_mom(previous) else {
                    tracing::warn!(
                        "could not find manifest for previous version {previous}, skipping"
                    );
                    break;
                };
                previous = manifest.header.previous;
                manifests.push(manifest);
            }
            Ok(manifests)
        }
    }
}

/// Pack tasks for the deltas into version `to`
pub fn delta_pack_tasks(
    ctx: &PackContext<'_>,
    to: u32,
    source: DeltaSource,
) -> Result<Vec<PackKey>> {
    let to_mom = ctx.read_mom(to)?;
    let mut keys = BTreeSet::new();

    for from_mom in source_manifests(ctx, &to_mom, source)? {
        println!(
            "Creating delta packs from {} to {}",
            from_mom.header.version, to_mom.header.version
        );
        keys.extend(bundles_to_pack(&from_mom, &to_mom)?);
    }
    Ok(keys.into_iter().collect())
}

/// Create delta packs into `to`
///
/// A failed pack is logged and skipped; the remaining packs are still
/// created. Returns the number of packs that failed.
pub fn create_delta_packs(ctx: &PackContext<'_>, to: u32, source: DeltaSource) -> Result<usize> {
    let keys = delta_pack_tasks(ctx, to, source)?;
    let failed = AtomicUsize::new(0);

    run_pool(ctx.workers, keys, |key| {
        let result = ensure(ctx.store, &key, || {
            let summary = ctx.service.create_pack(&ctx.request(&key))?;
            println!(
                "{}",
                pack_report(
                    &format!(
                        "Creating delta pack for bundle {:?} from {} to {}",
                        key.bundle, key.from, key.to
                    ),
                    &summary
                )
            );
            Ok(())
        });
        if let Err(e) = result {
            tracing::error!("pack {key} failed to be created: {e}");
            failed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    })?;

    Ok(failed.into_inner())
}

#[cfg(test)]
mod tests;
