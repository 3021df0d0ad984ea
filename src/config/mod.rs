//! Mix configuration (`mixer.yaml`)
//!
//! Every section is optional; a missing file means all defaults. Relative
//! paths are resolved against the workspace root by [`crate::workspace`].
//!
//! ```yaml
//! bundles:
//!   local_dir: local-bundles
//!   local_packages: local-packages
//!   upstream_dir: upstream-bundles
//!   mix_list: mixbundles
//! builder:
//!   state_dir: update
//!   upstream_mirror: upstream-mirror
//! installer:
//!   command: dnf
//!   config: dnf.conf
//!   repo_dir: local-repo
//! signing:
//!   cert: Swupd_Root.pem
//!   key: private.pem
//! workers:
//!   fullfiles: 8
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, config as config_error};

/// Configuration filename at the workspace root
pub const CONFIG_FILE: &str = "mixer.yaml";

/// Top-level mix configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixConfig {
    pub bundles: BundlesConfig,
    pub builder: BuilderConfig,
    pub installer: InstallerConfig,
    pub signing: SigningConfig,
    pub workers: WorkerConfig,
    pub services: ServicesConfig,
}

/// Where bundle catalogs and the selected list live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundlesConfig {
    pub local_dir: PathBuf,
    pub local_packages: PathBuf,
    /// Holds one `clr-bundles-<version>` checkout per upstream version
    pub upstream_dir: PathBuf,
    pub mix_list: PathBuf,
}

impl Default for BundlesConfig {
    fn default() -> Self {
        Self {
            local_dir: PathBuf::from("local-bundles"),
            local_packages: PathBuf::from("local-packages"),
            upstream_dir: PathBuf::from("upstream-bundles"),
            mix_list: PathBuf::from("mixbundles"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Root of `image/` and `www/`
    pub state_dir: PathBuf,
    /// Local copy of the upstream `update/` tree, used for format ranges
    pub upstream_mirror: PathBuf,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("update"),
            upstream_mirror: PathBuf::from("upstream-mirror"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    pub command: String,
    /// Package manager configuration written by the PREPARE stage
    pub config: PathBuf,
    /// Local RPM repository merged with upstream
    pub repo_dir: PathBuf,
    pub createrepo_command: String,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            command: "dnf".to_string(),
            config: PathBuf::from("dnf.conf"),
            repo_dir: PathBuf::from("local-repo"),
            createrepo_command: "createrepo_c".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    pub command: String,
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            command: "openssl".to_string(),
            cert: PathBuf::from("Swupd_Root.pem"),
            key: PathBuf::from("private.pem"),
        }
    }
}

/// Worker counts for the fan-out stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub manifests: usize,
    pub compression: usize,
    pub fullfiles: usize,
    pub packs: usize,
    pub delta: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        let cpus = num_cpus::get();
        Self {
            manifests: cpus,
            compression: cpus,
            fullfiles: cpus,
            packs: cpus,
            delta: cpus,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Program implementing `create-manifests`, `create-fullfiles` and `create-pack`
    pub manifest_command: String,
    /// Arguments placed before the subcommand, e.g. a script for an interpreter
    pub manifest_args: Vec<String>,
    pub hardlink_command: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            manifest_command: "mixer-swupd".to_string(),
            manifest_args: Vec::new(),
            hardlink_command: "hardlink".to_string(),
        }
    }
}

impl MixConfig {
    /// Load `mixer.yaml` from `root`, falling back to defaults when absent
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("no {} in {}, using defaults", CONFIG_FILE, root.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(config_error::read_failed(
                    path.display().to_string(),
                    e.to_string(),
                ));
            }
        };

        let config = Self::from_yaml(&content)
            .map_err(|e| config_error::parse_failed(path.display().to_string(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn validate(&self) -> Result<()> {
        let counts = [
            ("manifests", self.workers.manifests),
            ("compression", self.workers.compression),
            ("fullfiles", self.workers.fullfiles),
            ("packs", self.workers.packs),
            ("delta", self.workers.delta),
        ];
        for (name, count) in counts {
            if count == 0 {
                return Err(config_error::invalid(format!(
                    "workers.{name} must be at least 1"
                )));
            }
        }
        if self.installer.command.trim().is_empty() {
            return Err(config_error::invalid("installer.command must not be empty"));
        }
        Ok(())
    }
}
