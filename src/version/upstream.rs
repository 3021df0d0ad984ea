//! Upstream release metadata

use std::path::{Path, PathBuf};

use crate::common::fs::read_optional;
use crate::error::{Result, version as version_error};

/// Versions that share one upstream format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatRange {
    pub format: u32,
    pub first: u32,
    pub latest: u32,
}

impl FormatRange {
    pub fn contains(&self, version: u32) -> bool {
        (self.first..=self.latest).contains(&version)
    }
}

/// Source of upstream release information
pub trait UpstreamSource {
    /// Format of an upstream version
    fn format_of(&self, version: u32) -> Result<u32>;

    fn first_in_format(&self, format: u32) -> Result<u32>;

    fn latest_in_format(&self, format: u32) -> Result<u32>;

    /// Where the MoM of an upstream version is expected
    fn version_manifest(&self, version: u32) -> PathBuf;

    fn has_version(&self, version: u32) -> Result<bool> {
        Ok(self.version_manifest(version).is_file())
    }

    fn format_range(&self, version: u32) -> Result<FormatRange> {
        let format = self.format_of(version)?;
        Ok(FormatRange {
            format,
            first: self.first_in_format(format)?,
            latest: self.latest_in_format(format)?,
        })
    }
}

/// Upstream update content mirrored into a local directory
///
/// Layout follows the update server:
///
/// ```text
/// <root>/update/<version>/format
/// <root>/update/<version>/Manifest.MoM
/// <root>/update/version/format<F>/first
/// <root>/update/version/format<F>/latest
/// ```
#[derive(Debug, Clone)]
pub struct MirrorUpstream {
    root: PathBuf,
}

impl MirrorUpstream {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_number(path: &Path) -> Result<u32> {
        let Some(content) = read_optional(path)? else {
            return Err(version_error::upstream_missing(path));
        };
        let value = content.trim();
        value
            .parse()
            .map_err(|_| version_error::parse_failed(path, value))
    }

    fn format_dir(&self, format: u32) -> PathBuf {
        self.root
            .join("update/version")
            .join(format!("format{format}"))
    }
}

impl UpstreamSource for MirrorUpstream {
    fn format_of(&self, version: u32) -> Result<u32> {
        Self::read_number(&self.root.join(format!("update/{version}/format")))
    }

    fn first_in_format(&self, format: u32) -> Result<u32> {
        Self::read_number(&self.format_dir(format).join("first"))
    }

    fn latest_in_format(&self, format: u32) -> Result<u32> {
        Self::read_number(&self.format_dir(format).join("latest"))
    }

    fn version_manifest(&self, version: u32) -> PathBuf {
        self.root.join(format!("update/{version}/Manifest.MoM"))
    }
}
