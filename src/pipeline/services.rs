//! External collaborators of the build pipeline
//!
//! Each collaborator is a trait with a process-backed default. The pipeline
//! only talks to the traits, so tests substitute in-process fakes.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::common::fs::{read_optional, write_atomic};
use crate::error::{Result, fs as fs_error, pipeline as pipeline_error};
use crate::pipeline::manifest::{self, Manifest};
use crate::process::Cmd;

/// Inputs of the CREATE MANIFESTS stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRequest {
    pub version: u32,
    pub previous: u32,
    pub min_version: u32,
    pub format: u32,
    pub state_dir: PathBuf,
    pub workers: usize,
}

/// One bundle entry of a MoM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleVersion {
    pub name: String,
    pub version: u32,
}

/// What the manifest service produced for a version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSummary {
    pub version: u32,
    pub previous: u32,
    /// Every bundle listed by the new MoM
    pub bundles: Vec<BundleVersion>,
    /// Bundles whose manifest was written for this version
    #[serde(default)]
    pub updated: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FullfilesSummary {
    pub already_created: usize,
    pub not_compressed: usize,
    /// Fullfiles written per compression type
    pub compressed: BTreeMap<String, usize>,
}

impl FullfilesSummary {
    pub fn total(&self) -> usize {
        self.already_created + self.not_compressed + self.compressed.values().sum::<usize>()
    }
}

/// Inputs of one pack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackRequest {
    pub bundle: String,
    pub from: u32,
    pub to: u32,
    /// `www` directory; the pack lands in `<output_dir>/<to>/`
    pub output_dir: PathBuf,
    /// `image` directory holding the per-version chroots
    pub chroot_dir: PathBuf,
    pub workers: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackSummary {
    pub fullfiles: usize,
    pub deltas: usize,
    pub warnings: Vec<String>,
}

/// Builds manifests, fullfiles and packs
pub trait ManifestService: Sync {
    fn create_manifests(&self, request: &ManifestRequest) -> Result<ManifestSummary>;

    fn create_fullfiles(
        &self,
        manifest: &Path,
        chroot_dir: &Path,
        output_dir: &Path,
        workers: usize,
    ) -> Result<FullfilesSummary>;

    fn create_pack(&self, request: &PackRequest) -> Result<PackSummary>;

    fn parse_manifest_file(&self, path: &Path) -> Result<Manifest> {
        manifest::parse_manifest_file(path)
    }
}

/// Manifest service backed by an external program
///
/// The program is called as `<command> [args...] <subcommand> <flags>` and
/// prints a JSON summary on stdout.
#[derive(Debug, Clone)]
pub struct ExternalManifestService {
    command: String,
    args: Vec<String>,
}

impl ExternalManifestService {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
        }
    }

    /// Arguments placed before the subcommand
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    fn call<T: DeserializeOwned>(&self, operation: &str, flags: Vec<String>) -> Result<T> {
        let output = Cmd::new(&self.command)
            .args(&self.args)
            .arg(operation)
            .args(flags)
            .run()?;
        serde_json::from_str(output.stdout_trimmed())
            .map_err(|e| pipeline_error::service_failed(operation, format!("invalid summary: {e}")))
    }
}

fn flag(name: &str, value: impl std::fmt::Display) -> String {
    format!("--{name}={value}")
}

impl ManifestService for ExternalManifestService {
    fn create_manifests(&self, request: &ManifestRequest) -> Result<ManifestSummary> {
        self.call(
            "create-manifests",
            vec![
                flag("version", request.version),
                flag("previous", request.previous),
                flag("min-version", request.min_version),
                flag("format", request.format),
                flag("state-dir", request.state_dir.display()),
                flag("workers", request.workers),
            ],
        )
    }

    fn create_fullfiles(
        &self,
        manifest: &Path,
        chroot_dir: &Path,
        output_dir: &Path,
        workers: usize,
    ) -> Result<FullfilesSummary> {
        self.call(
            "create-fullfiles",
            vec![
                flag("manifest", manifest.display()),
                flag("chroot-dir", chroot_dir.display()),
                flag("output-dir", output_dir.display()),
                flag("workers", workers),
            ],
        )
    }

    fn create_pack(&self, request: &PackRequest) -> Result<PackSummary> {
        self.call(
            "create-pack",
            vec![
                flag("bundle", &request.bundle),
                flag("from", request.from),
                flag("to", request.to),
                flag("output-dir", request.output_dir.display()),
                flag("chroot-dir", request.chroot_dir.display()),
                flag("workers", request.workers),
            ],
        )
    }
}

/// Installs packages into a bundle chroot
pub trait Installer: Sync {
    /// Install `packages` into `root`, optionally only from `repo`
    fn install(&self, root: &Path, packages: &BTreeSet<String>, repo: Option<&str>) -> Result<()>;

    /// Regenerate metadata of the local package repository
    fn refresh_repository(&self) -> Result<()>;
}

/// `dnf` backed installer
#[derive(Debug, Clone)]
pub struct DnfInstaller {
    pub command: String,
    pub config: PathBuf,
    pub release: u32,
    pub repo_dir: PathBuf,
    pub createrepo_command: String,
}

impl DnfInstaller {
    pub fn install_command(
        &self,
        root: &Path,
        packages: &BTreeSet<String>,
        repo: Option<&str>,
    ) -> Cmd {
        let mut cmd = Cmd::new(&self.command)
            .arg(format!("--config={}", self.config.display()))
            .arg("-y")
            .arg(format!("--releasever={}", self.release))
            .arg(format!("--installroot={}", root.display()));
        if let Some(repo) = repo {
            cmd = cmd.arg(format!("--repo={repo}"));
        }
        cmd.arg("install").args(packages)
    }
}

impl Installer for DnfInstaller {
    fn install(&self, root: &Path, packages: &BTreeSet<String>, repo: Option<&str>) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        std::fs::create_dir_all(root).map_err(|e| fs_error::write_failed(root, &e))?;
        self.install_command(root, packages, repo).run()?;
        Ok(())
    }

    fn refresh_repository(&self) -> Result<()> {
        if !self.repo_dir.is_dir() {
            tracing::debug!("no local repository at {}", self.repo_dir.display());
            return Ok(());
        }
        Cmd::new(&self.createrepo_command)
            .arg(".")
            .dir(&self.repo_dir)
            .run()?;
        Ok(())
    }
}

const INSTALLER_MAIN: &str = "[main]
cachedir=/var/cache/yum/clear/
keepcache=0
debuglevel=2
logfile=/var/log/yum.log
exactarch=1
obsoletes=1
gpgcheck=0
plugins=0
installonly_limit=3
reposdir=/root/mash

[clear]
name=Clear
failovermethod=priority
baseurl={url}/releases/$releasever/clear/x86_64/os/
enabled=1
gpgcheck=0
";

const LOCAL_SECTION: &str = "[local]";

fn local_repo_section(repo_dir: &Path) -> String {
    format!(
        "{LOCAL_SECTION}
name=Local
failovermethod=priority
baseurl=file://{}
enabled=1
gpgcheck=0
priority=1
",
        repo_dir.display()
    )
}

/// Write the installer configuration unless it already exists
///
/// An existing file without a `[local]` repository gets one appended.
/// Returns whether the file changed.
pub fn write_installer_config(path: &Path, upstream_url: &str, repo_dir: &Path) -> Result<bool> {
    match read_optional(path)? {
        Some(existing) if existing.contains(LOCAL_SECTION) => Ok(false),
        Some(mut existing) => {
            if !existing.ends_with('\n') {
                existing.push('\n');
            }
            existing.push('\n');
            existing.push_str(&local_repo_section(repo_dir));
            write_atomic(path, existing)?;
            Ok(true)
        }
        None => {
            let url = upstream_url.trim_end_matches('/');
            let content = format!(
                "{}\n{}",
                INSTALLER_MAIN.replace("{url}", url),
                local_repo_section(repo_dir)
            );
            write_atomic(path, content)?;
            Ok(true)
        }
    }
}

/// Signs the MoM
pub trait Signer: Sync {
    /// Sign `file`, returning the signature path
    fn sign(&self, file: &Path) -> Result<PathBuf>;
}

/// Path of the detached signature of `file`
pub fn signature_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(".sig");
    PathBuf::from(name)
}

#[derive(Debug, Clone)]
pub struct OpensslSigner {
    pub command: String,
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl OpensslSigner {
    pub fn sign_command(&self, file: &Path) -> Cmd {
        Cmd::new(&self.command)
            .args(["smime", "-sign", "-binary", "-in"])
            .arg_path(file)
            .arg("-signer")
            .arg_path(&self.cert)
            .arg("-inkey")
            .arg_path(&self.key)
            .args(["-outform", "DER", "-out"])
            .arg_path(&signature_path(file))
    }
}

impl Signer for OpensslSigner {
    fn sign(&self, file: &Path) -> Result<PathBuf> {
        for required in [&self.cert, &self.key] {
            if !required.is_file() {
                return Err(fs_error::not_found(required));
            }
        }
        self.sign_command(file).run()?;
        Ok(signature_path(file))
    }
}

/// Replaces identical files below a directory with hard links
pub trait Hardlinker: Sync {
    fn hardlink(&self, dir: &Path) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct HardlinkCommand {
    pub command: String,
}

impl Hardlinker for HardlinkCommand {
    fn hardlink(&self, dir: &Path) -> Result<()> {
        Cmd::new(&self.command).arg("-f").arg_path(dir).run()?;
        Ok(())
    }
}
