//! Common test utilities for mixer integration tests

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// Upstream version every test workspace is based on
#[allow(dead_code)]
pub const UPSTREAM_VERSION: u32 = 30000;

/// A test workspace for integration tests
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create an empty directory to run `mixer init` in
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Create an initialized workspace with an upstream catalog
    ///
    /// The upstream catalog holds `os-core` and `editors`, plus `curl` in the
    /// flat package list.
    #[allow(dead_code)]
    pub fn initialized() -> Self {
        let workspace = Self::new();
        mixer_cmd()
            .current_dir(&workspace.path)
            .args(["init", "--upstream-version", &UPSTREAM_VERSION.to_string()])
            .assert()
            .success();

        let upstream = format!("upstream-bundles/clr-bundles-{UPSTREAM_VERSION}");
        workspace.write_file(
            &format!("{upstream}/bundles/os-core"),
            "# [TITLE]: os-core\nfilesystem\n",
        );
        workspace.write_file(
            &format!("{upstream}/bundles/editors"),
            "# [TITLE]: editors\ninclude(os-core)\nvim\nnano\n",
        );
        workspace.write_file(&format!("{upstream}/packages"), "curl\n");
        workspace
    }

    /// Mirror upstream release metadata for one format
    #[allow(dead_code)]
    pub fn write_upstream_mirror(&self, format: u32, first: u32, latest: u32) {
        let root = "upstream-mirror/update";
        for version in [first, UPSTREAM_VERSION, latest] {
            self.write_file(&format!("{root}/{version}/format"), &format.to_string());
            self.write_file(&format!("{root}/{version}/Manifest.MoM"), "MANIFEST\t1\n");
        }
        self.write_file(
            &format!("{root}/version/format{format}/first"),
            &first.to_string(),
        );
        self.write_file(
            &format!("{root}/version/format{format}/latest"),
            &latest.to_string(),
        );
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    #[allow(dead_code)]
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    #[allow(dead_code)]
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// The mixer binary, isolated from the developer's environment
#[allow(deprecated)]
pub fn mixer_cmd() -> Command {
    let mut cmd = Command::cargo_bin("mixer").expect("mixer binary");
    cmd.env_remove("MIXER_WORKSPACE");
    cmd.env_remove("RUST_LOG");
    cmd
}
