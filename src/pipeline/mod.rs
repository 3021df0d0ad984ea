//! Versioned build pipeline
//!
//! `build bundles` runs PREPARE and BUILD BUNDLES; `build update` runs
//! CREATE MANIFESTS through PUBLISH. Stages are timed by a [`Stopwatch`];
//! nothing is checkpointed, so a rerun relies on every artifact step
//! skipping work that already exists.
//!
//! ```text
//! PREPARE -> BUILD BUNDLES -> CREATE MANIFESTS -> SIGN MANIFEST
//!   -> COMPRESS MANIFESTS -> CREATE FULLFILES -> CREATE ZERO PACKS
//!   -> MINIMIZE CHROOTS -> PUBLISH
//! ```

pub mod archive;
pub mod artifact;
pub mod manifest;
pub mod packs;
pub mod services;
pub mod special_files;
pub mod stopwatch;
pub mod workers;

use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{BundleCatalog, BundleSet, CatalogPaths};
use crate::common::fs::{remove_dir_all_if_exists, write_atomic};
use crate::error::{Result, fs as fs_error, pipeline as pipeline_error};
use crate::merge::ContentMerger;
use crate::progress::BuildProgress;
use crate::resolver::{BundleResolver, MixBundleList};
use crate::version::{DEFAULT_UPSTREAM_URL, VersionLedger};
use crate::workspace::Workspace;

use artifact::{ArtifactStore, FsArtifactStore};
use manifest::manifest_file_name;
use packs::{DeltaSource, PackContext};
use services::{
    DnfInstaller, ExternalManifestService, HardlinkCommand, Hardlinker, Installer,
    ManifestRequest, ManifestService, ManifestSummary, OpensslSigner, Signer,
};
pub use stopwatch::Stopwatch;

/// Version written to `mixer-src-version`
const MIXER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Options of `build update`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildParams {
    /// Files changed before this version are not re-versioned
    pub min_version: u32,
    /// Format to build; the persisted format when unset
    pub format: Option<u32>,
    pub skip_signing: bool,
    pub publish: bool,
    pub keep_chroots: bool,
}

/// The external collaborators a build talks to
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub installer: &'a dyn Installer,
    pub manifests: &'a dyn ManifestService,
    pub signer: &'a dyn Signer,
    pub hardlinker: &'a dyn Hardlinker,
    pub store: &'a dyn ArtifactStore,
}

/// Process-backed collaborators configured from a workspace
pub struct DefaultServices {
    installer: DnfInstaller,
    manifests: ExternalManifestService,
    signer: OpensslSigner,
    hardlinker: HardlinkCommand,
    store: FsArtifactStore,
}

impl DefaultServices {
    pub fn for_workspace(workspace: &Workspace, upstream_version: u32) -> Self {
        let config = &workspace.config;
        Self {
            installer: DnfInstaller {
                command: config.installer.command.clone(),
                config: workspace.installer_config(),
                release: upstream_version,
                repo_dir: workspace.repo_dir(),
                createrepo_command: config.installer.createrepo_command.clone(),
            },
            manifests: ExternalManifestService::new(&config.services.manifest_command)
                .with_args(config.services.manifest_args.iter().cloned()),
            signer: OpensslSigner {
                command: config.signing.command.clone(),
                cert: workspace.signing_cert(),
                key: workspace.signing_key(),
            },
            hardlinker: HardlinkCommand {
                command: config.services.hardlink_command.clone(),
            },
            store: FsArtifactStore::new(workspace.www_dir()),
        }
    }

    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            installer: &self.installer,
            manifests: &self.manifests,
            signer: &self.signer,
            hardlinker: &self.hardlinker,
            store: &self.store,
        }
    }
}

/// Runs build stages for one workspace
pub struct PipelineOrchestrator<'a> {
    workspace: &'a Workspace,
    services: Collaborators<'a>,
    ledger: VersionLedger,
    stopwatch: Stopwatch,
}

impl<'a> PipelineOrchestrator<'a> {
    pub fn new(workspace: &'a Workspace, services: Collaborators<'a>) -> Self {
        Self {
            workspace,
            services,
            ledger: VersionLedger::new(&workspace.root),
            stopwatch: Stopwatch::new(),
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_stopwatch(mut self, stopwatch: Stopwatch) -> Self {
        self.stopwatch = stopwatch;
        self
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    fn catalog(&self, upstream_version: u32) -> BundleCatalog {
        BundleCatalog::new(CatalogPaths::for_workspace(
            self.workspace,
            upstream_version,
        ))
    }

    fn selected(&self) -> Result<Vec<String>> {
        MixBundleList::new(self.workspace.mix_list_file()).read()
    }

    fn pack_context(&self, workers: usize) -> PackContext<'a> {
        PackContext {
            service: self.services.manifests,
            store: self.services.store,
            www_dir: self.workspace.www_dir(),
            image_dir: self.workspace.image_dir(),
            workers,
        }
    }

    /// PREPARE and BUILD BUNDLES
    pub fn build_bundles(&mut self) -> Result<BundleSet> {
        let mix = self.ledger.mix_version()?;
        let upstream = self.ledger.upstream_version()?;

        self.stopwatch.start("PREPARE");
        self.prepare(mix)?;
        self.stopwatch.stop();

        self.stopwatch.start("BUILD BUNDLES");
        let set = self.build_bundle_chroots(mix, upstream)?;
        self.stopwatch.stop();

        Ok(set)
    }

    fn prepare(&self, mix: u32) -> Result<()> {
        for dir in [
            self.workspace.state_dir(),
            self.workspace.version_image_dir(mix),
            self.workspace.version_www_dir(mix),
        ] {
            fs::create_dir_all(&dir).map_err(|e| fs_error::write_failed(&dir, &e))?;
        }

        let url = self
            .ledger
            .upstream_url()?
            .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());
        let config = self.workspace.installer_config();
        if services::write_installer_config(&config, &url, &self.workspace.repo_dir())? {
            println!("Wrote installer configuration {}", config.display());
        }

        self.services.installer.refresh_repository()
    }

    fn build_bundle_chroots(&self, mix: u32, upstream: u32) -> Result<BundleSet> {
        let catalog = self.catalog(upstream);
        let selected = self.selected()?;
        let mut set = BundleResolver::new(&catalog).resolve_for_build(&selected)?;

        let version_dir = self.workspace.version_image_dir(mix);
        println!("Preparing new {}", version_dir.display());

        for bundle in set.values_mut() {
            let includes: String = bundle
                .direct_includes
                .iter()
                .map(|name| format!("{name}\n"))
                .collect();
            write_atomic(
                &version_dir.join(format!("{}-includes", bundle.name)),
                includes,
            )?;

            bundle.content_chroots = bundle
                .content_chroots
                .iter()
                .map(|chroot| self.workspace.root.join(chroot))
                .collect();
        }

        let progress = BuildProgress::new(u64::try_from(set.len()).unwrap_or(u64::MAX));
        for bundle in set.values_mut() {
            progress.update_bundle(&bundle.name, "Installing");
            if !bundle.all_packages.is_empty() {
                let root = version_dir.join(&bundle.name);
                if let Err(e) = self
                    .services
                    .installer
                    .install(&root, &bundle.all_packages, None)
                {
                    progress.abandon();
                    return Err(e);
                }
                bundle.content_chroots.insert(root);
            }
            progress.inc_bundle();
        }
        progress.finish();

        let full_dir = self.workspace.full_chroot(mix);
        ContentMerger::new(&full_dir).merge_bundles(&mut set)?;
        special_files::install_special_files(&full_dir, &mut set, mix)?;

        for bundle in set.values() {
            let info = serde_json::to_string_pretty(bundle)?;
            write_atomic(&version_dir.join(format!("{}-info", bundle.name)), info)?;
        }

        let last_ver = self.workspace.last_ver_file();
        if !last_ver.exists() {
            write_atomic(&last_ver, "0\n")?;
        }

        Ok(set)
    }

    /// CREATE MANIFESTS through PUBLISH
    pub fn build_update(&mut self, params: &BuildParams) -> Result<ManifestSummary> {
        let mix = self.ledger.mix_version()?;
        let upstream = self.ledger.upstream_version()?;
        let mut state = self.workspace.load_state()?;
        let format = params.format.unwrap_or(state.format);
        let workers = &self.workspace.config.workers;

        if params.min_version > mix {
            return Err(pipeline_error::invalid_parameter(format!(
                "minimum version {} is newer than mix version {mix}",
                params.min_version
            )));
        }
        if format == 0 {
            return Err(pipeline_error::invalid_parameter("format must be positive"));
        }

        let version_www = self.workspace.version_www_dir(mix);
        let format_dir = self.workspace.format_dir(format);
        fs::create_dir_all(&format_dir).map_err(|e| fs_error::write_failed(&format_dir, &e))?;

        self.stopwatch.start("CREATE MANIFESTS");
        write_meta_files(&version_www, format)?;
        let summary = self.services.manifests.create_manifests(&ManifestRequest {
            version: mix,
            previous: state.previous_mix_version,
            min_version: params.min_version,
            format,
            state_dir: self.workspace.state_dir(),
            workers: workers.manifests,
        })?;
        println!("MoM version {}", summary.version);
        for bundle in &summary.bundles {
            println!("- {:<20} {}", bundle.name, bundle.version);
        }
        self.stopwatch.stop();

        let mom = version_www.join(manifest_file_name("MoM"));
        let mut mom_files = vec![mom.clone()];
        if !params.skip_signing {
            self.stopwatch.start("SIGN MANIFEST");
            println!("Signing manifest.");
            mom_files.push(self.services.signer.sign(&mom)?);
            self.stopwatch.stop();
        }

        self.stopwatch.start("COMPRESS MANIFESTS");
        self.compress_manifests(&version_www, mom_files, &summary)?;
        self.stopwatch.stop();

        self.stopwatch.start("CREATE FULLFILES");
        println!("Using {} workers", workers.fullfiles);
        let fullfiles = self.services.manifests.create_fullfiles(
            &version_www.join(manifest_file_name("full")),
            &self.workspace.full_chroot(mix),
            &version_www.join("files"),
            workers.fullfiles,
        )?;
        println!("- Already created: {}", fullfiles.already_created);
        println!("- Not compressed:  {}", fullfiles.not_compressed);
        println!("- Compressed");
        for (kind, count) in &fullfiles.compressed {
            println!("  - {kind:<20} {count}");
        }
        println!("Total fullfiles: {}", fullfiles.total());
        self.stopwatch.stop();

        self.stopwatch.start("CREATE ZERO PACKS");
        packs::create_zero_packs(&self.pack_context(workers.packs), &summary.bundles)?;
        self.stopwatch.stop();

        self.stopwatch.start("MINIMIZE CHROOTS");
        self.minimize_chroots(mix, upstream, params.keep_chroots)?;
        self.stopwatch.stop();

        self.stopwatch.start("PUBLISH");
        if let Some(url) = self.ledger.upstream_url()? {
            println!("Saving the upstream URL: {url}");
            write_atomic(&version_www.join("upstreamurl"), &url)?;
            println!("Saving the upstream version: {upstream}");
            write_atomic(&version_www.join("upstreamver"), upstream.to_string())?;
        }
        if params.publish {
            println!("Setting latest version to {mix}");
            write_atomic(&format_dir.join("latest"), mix.to_string())?;
            write_atomic(&self.workspace.last_ver_file(), mix.to_string())?;
            state.format = format;
            state.previous_mix_version = mix;
            state.save(&self.workspace.root)?;
        }
        self.stopwatch.stop();

        Ok(summary)
    }

    fn compress_manifests(
        &self,
        version_www: &Path,
        mom_files: Vec<PathBuf>,
        summary: &ManifestSummary,
    ) -> Result<()> {
        let mut tasks = vec![mom_files];
        for bundle in &summary.updated {
            tasks.push(vec![version_www.join(manifest_file_name(bundle))]);
        }
        let full = version_www.join(manifest_file_name("full"));
        if full.is_file() {
            tasks.push(vec![full]);
        }

        println!("Compressing {} manifests", tasks.len());
        workers::run_pool(self.workspace.config.workers.compression, tasks, |files| {
            let files: Vec<&Path> = files.iter().map(PathBuf::as_path).collect();
            let archive = archive::create_compressed_archive(&files)?;
            tracing::debug!("compressed {}", archive.display());
            Ok(())
        })
    }

    fn minimize_chroots(&self, mix: u32, upstream: u32, keep_chroots: bool) -> Result<()> {
        let version_dir = self.workspace.version_image_dir(mix);
        if keep_chroots {
            return self.services.hardlinker.hardlink(&version_dir);
        }

        let catalog = self.catalog(upstream);
        let set = BundleResolver::new(&catalog).full_bundle_set(self.selected()?)?;
        for name in set.keys() {
            remove_dir_all_if_exists(&version_dir.join(name))?;
        }
        Ok(())
    }

    /// Delta packs into `to` (the current mix version by default)
    ///
    /// Returns the number of packs that failed.
    pub fn delta_packs(&mut self, to: Option<u32>, source: DeltaSource) -> Result<usize> {
        let to = match to {
            Some(version) => version,
            None => self.ledger.mix_version()?,
        };

        self.stopwatch.start("CREATE DELTA PACKS");
        let failed = packs::create_delta_packs(
            &self.pack_context(self.workspace.config.workers.delta),
            to,
            source,
        )?;
        self.stopwatch.stop();
        Ok(failed)
    }
}

/// Write `format` and `mixer-src-version` into a `www/<version>` directory
fn write_meta_files(dir: &Path, format: u32) -> Result<()> {
    write_atomic(&dir.join("format"), format.to_string())?;
    write_atomic(&dir.join("mixer-src-version"), MIXER_VERSION)
}
