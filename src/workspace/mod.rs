//! Mix workspace layout
//!
//! ## Workspace Structure
//!
//! ```text
//! <root>/
//! ├── mixer.yaml           # Optional configuration
//! ├── mixer.state          # Format and previous mix version
//! ├── mixversion           # Mix version counter
//! ├── upstreamversion      # Upstream version the mix is based on
//! ├── upstreamurl          # Upstream update server
//! ├── mixbundles           # Selected bundles, one per line
//! ├── local-bundles/       # Local bundle definitions
//! ├── local-packages       # Local flat package list
//! ├── upstream-bundles/    # clr-bundles-<version>/{bundles/,packages}
//! └── update/              # Build state: image/ and www/
//! ```

use std::path::{Path, PathBuf};

use crate::config::{CONFIG_FILE, MixConfig};
use crate::error::{MixError, Result};
use crate::version::{MIX_VERSION_FILE, MixState};

/// Name of the global "latest published" pointer inside `image/`
pub const LAST_VER_FILE: &str = "LAST_VER";

/// Name of the union chroot inside `image/<version>/`
pub const FULL_CHROOT: &str = "full";

/// An opened mix workspace: a root directory plus its configuration
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub config: MixConfig,
}

impl Workspace {
    /// Detect if a mix workspace exists at the given path
    pub fn exists(root: &Path) -> bool {
        root.join(CONFIG_FILE).is_file()
            || root.join(MIX_VERSION_FILE.current).is_file()
            || root.join(MIX_VERSION_FILE.deprecated).is_file()
    }

    /// Find a workspace by searching upward from the given path
    pub fn find_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if Self::exists(&current) {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Open an existing workspace
    pub fn open(root: &Path) -> Result<Self> {
        if !Self::exists(root) {
            return Err(MixError::WorkspaceNotFound {
                path: root.display().to_string(),
            });
        }
        Self::with_config(root)
    }

    /// Open a directory as a workspace whether or not it was initialized
    pub fn with_config(root: &Path) -> Result<Self> {
        let config = MixConfig::load(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn local_bundle_dir(&self) -> PathBuf {
        self.resolve(&self.config.bundles.local_dir)
    }

    pub fn local_packages_file(&self) -> PathBuf {
        self.resolve(&self.config.bundles.local_packages)
    }

    /// Upstream catalog checkout for one upstream version
    pub fn upstream_catalog_dir(&self, upstream_version: u32) -> PathBuf {
        self.resolve(&self.config.bundles.upstream_dir)
            .join(format!("clr-bundles-{upstream_version}"))
    }

    pub fn mix_list_file(&self) -> PathBuf {
        self.resolve(&self.config.bundles.mix_list)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.resolve(&self.config.builder.state_dir)
    }

    pub fn image_dir(&self) -> PathBuf {
        self.state_dir().join("image")
    }

    /// Per-version chroot directory (`image/<version>`)
    pub fn version_image_dir(&self, version: u32) -> PathBuf {
        self.image_dir().join(version.to_string())
    }

    pub fn full_chroot(&self, version: u32) -> PathBuf {
        self.version_image_dir(version).join(FULL_CHROOT)
    }

    pub fn www_dir(&self) -> PathBuf {
        self.state_dir().join("www")
    }

    pub fn version_www_dir(&self, version: u32) -> PathBuf {
        self.www_dir().join(version.to_string())
    }

    /// Directory of the format-scoped `latest` pointer
    pub fn format_dir(&self, format: u32) -> PathBuf {
        self.www_dir().join("version").join(format!("format{format}"))
    }

    pub fn last_ver_file(&self) -> PathBuf {
        self.image_dir().join(LAST_VER_FILE)
    }

    pub fn installer_config(&self) -> PathBuf {
        self.resolve(&self.config.installer.config)
    }

    pub fn repo_dir(&self) -> PathBuf {
        self.resolve(&self.config.installer.repo_dir)
    }

    pub fn signing_cert(&self) -> PathBuf {
        self.resolve(&self.config.signing.cert)
    }

    pub fn signing_key(&self) -> PathBuf {
        self.resolve(&self.config.signing.key)
    }

    pub fn upstream_mirror(&self) -> PathBuf {
        self.resolve(&self.config.builder.upstream_mirror)
    }

    /// Load the persisted mix state, defaulting from `image/LAST_VER`
    pub fn load_state(&self) -> Result<MixState> {
        MixState::load(&self.root, &self.last_ver_file())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::test_fixtures::{create_mix_workspace, create_temp_dir, create_test_files};

    #[test]
    fn test_exists_with_version_file() {
        let temp = create_mix_workspace();
        assert!(Workspace::exists(temp.path()));
    }

    #[test]
    fn test_exists_with_deprecated_version_file() {
        let temp = create_temp_dir();
        create_test_files(&temp, &[(".mixversion", "10")]);
        assert!(Workspace::exists(temp.path()));
    }

    #[test]
    fn test_open_missing_workspace() {
        let temp = create_temp_dir();
        let err = Workspace::open(temp.path()).expect_err("should fail");
        assert!(matches!(err, MixError::WorkspaceNotFound { .. }));
    }

    #[test]
    fn test_find_from_nested() {
        let temp = create_mix_workspace();
        let nested = temp.path().join("local-bundles/deep");
        std::fs::create_dir_all(&nested).expect("mkdir");

        assert_eq!(
            Workspace::find_from(&nested),
            Some(temp.path().to_path_buf())
        );
    }

    #[test]
    fn test_layout_paths() {
        let temp = create_mix_workspace();
        let ws = Workspace::open(temp.path()).expect("open");

        assert_eq!(
            ws.upstream_catalog_dir(300),
            temp.path().join("upstream-bundles/clr-bundles-300")
        );
        assert_eq!(ws.full_chroot(20), temp.path().join("update/image/20/full"));
        assert_eq!(
            ws.format_dir(3),
            temp.path().join("update/www/version/format3")
        );
        assert_eq!(ws.last_ver_file(), temp.path().join("update/image/LAST_VER"));
    }

    #[test]
    fn test_absolute_config_paths_kept() {
        let temp = create_mix_workspace();
        create_test_files(&temp, &[(CONFIG_FILE, "builder:\n  state_dir: /srv/mix\n")]);
        let ws = Workspace::open(temp.path()).expect("open");

        assert_eq!(ws.state_dir(), PathBuf::from("/srv/mix"));
    }
}
