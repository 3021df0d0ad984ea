//! Test fixtures for mix workspaces.
//!
//! ```ignore
//! use crate::test_fixtures::{create_mix_workspace, create_test_files};
//!
//! let temp = create_mix_workspace();
//! create_test_files(&temp, &[("local-bundles/editors", "include(os-core)\nvim\n")]);
//! ```

use std::path::Path;

use tempfile::TempDir;

/// Upstream version used by [`create_mix_workspace`]
pub const TEST_UPSTREAM_VERSION: u32 = 30000;

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Create a mix workspace with version files and an upstream catalog holding
/// `os-core`.
///
/// # Panics
///
/// Panics if any file cannot be written.
#[must_use]
pub fn create_mix_workspace() -> TempDir {
    let temp = create_temp_dir();
    let upstream = upstream_bundles_prefix(TEST_UPSTREAM_VERSION);
    create_test_files(
        &temp,
        &[
            ("mixversion", "10"),
            ("upstreamversion", &TEST_UPSTREAM_VERSION.to_string()),
            ("upstreamurl", "https://cdn.example.org/update"),
            (&format!("{upstream}/bundles/os-core"), "# [TITLE]: os-core\nfilesystem\n"),
            (&format!("{upstream}/packages"), ""),
        ],
    );
    temp
}

/// Relative path of the upstream catalog for `version`
#[must_use]
pub fn upstream_bundles_prefix(version: u32) -> String {
    format!("upstream-bundles/clr-bundles-{version}")
}

/// Create test files in a directory.
///
/// Takes a list of (path, content) tuples relative to the temp root.
///
/// # Panics
///
/// Panics if any file cannot be created.
pub fn create_test_files(temp: &TempDir, files: &[(&str, &str)]) {
    write_files(temp.path(), files);
}

/// Same as [`create_test_files`] for an arbitrary root.
///
/// # Panics
///
/// Panics if any file cannot be created.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&full_path, content).expect("Failed to write test file");
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_temp_dir() {
        let temp = create_temp_dir();
        assert!(temp.path().exists());
    }

    #[test]
    fn test_create_mix_workspace() {
        let temp = create_mix_workspace();
        assert!(temp.path().join("mixversion").exists());
        assert!(
            temp.path()
                .join(upstream_bundles_prefix(TEST_UPSTREAM_VERSION))
                .join("bundles/os-core")
                .exists()
        );
    }

    #[test]
    fn test_create_test_files() {
        let temp = create_temp_dir();
        create_test_files(&temp, &[("local-bundles/editors", "vim\n")]);

        let content = std::fs::read_to_string(temp.path().join("local-bundles/editors"))
            .expect("Failed to read");
        assert_eq!(content, "vim\n");
    }
}
