//! Version ledger: the mix version, upstream version and upstream URL files
//!
//! Each value lives in its own plain-text file at the workspace root. Older
//! workspaces use dot-prefixed names; those are still read (with a warning)
//! but every write goes to the current name.

pub mod state;
pub mod upstream;

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;

pub use state::MixState;
pub use upstream::{FormatRange, MirrorUpstream, UpstreamSource};

use crate::common::fs::{read_optional, write_atomic};
use crate::error::{Result, fs as fs_error, version as version_error};

/// Distance between consecutive mix versions
pub const VERSION_STEP: u32 = 10;

/// Upstream URL written by `init` when none is given
pub const DEFAULT_UPSTREAM_URL: &str = "https://cdn.download.clearlinux.org";

/// File names of one ledger value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionFile {
    pub current: &'static str,
    pub deprecated: &'static str,
}

pub const MIX_VERSION_FILE: VersionFile = VersionFile {
    current: "mixversion",
    deprecated: ".mixversion",
};

pub const UPSTREAM_VERSION_FILE: VersionFile = VersionFile {
    current: "upstreamversion",
    deprecated: ".clearversion",
};

pub const UPSTREAM_URL_FILE: VersionFile = VersionFile {
    current: "upstreamurl",
    deprecated: ".clearurl",
};

/// Requested upstream version for [`VersionLedger::update_versions`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpstreamTarget {
    /// Latest upstream release of the current format
    #[default]
    Latest,
    Version(u32),
}

impl FromStr for UpstreamTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("latest") {
            return Ok(Self::Latest);
        }
        s.parse::<u32>()
            .map(Self::Version)
            .map_err(|_| format!("expected a version number or 'latest', got '{s}'"))
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Version(v) => write!(f, "{v}"),
        }
    }
}

/// Outcome of [`VersionLedger::update_versions`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionUpdate {
    pub previous_mix: u32,
    pub previous_upstream: u32,
    pub mix: u32,
    pub upstream: u32,
    pub range: FormatRange,
}

/// Snapshot printed by `mixer versions`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionReport {
    pub mix: u32,
    pub upstream: u32,
    pub range: FormatRange,
}

/// Values written by `mixer init`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitVersions {
    pub mix_version: u32,
    pub upstream_version: u32,
    pub upstream_url: String,
}

/// Reads and writes the version files of one directory
#[derive(Debug, Clone)]
pub struct VersionLedger {
    dir: PathBuf,
}

impl VersionLedger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path the value is read from: the deprecated name when it exists
    fn read_path(&self, file: VersionFile) -> PathBuf {
        let deprecated = self.dir.join(file.deprecated);
        if deprecated.is_file() {
            tracing::warn!(
                "'{}' has been deprecated. Please rename file to '{}'",
                file.deprecated,
                file.current
            );
            return deprecated;
        }
        self.dir.join(file.current)
    }

    fn read_text(&self, file: VersionFile) -> Result<Option<(PathBuf, String)>> {
        let path = self.read_path(file);
        Ok(read_optional(&path)?.map(|content| (path, content.trim().to_string())))
    }

    fn read_number(&self, file: VersionFile) -> Result<u32> {
        let Some((path, value)) = self.read_text(file)? else {
            return Err(version_error::file_missing(&self.dir.join(file.current)));
        };
        value
            .parse()
            .map_err(|_| version_error::parse_failed(&path, value))
    }

    /// Write to the current name and drop a deprecated file so it cannot shadow the new value
    fn write_text(&self, file: VersionFile, value: &str) -> Result<()> {
        write_atomic(&self.dir.join(file.current), format!("{value}\n"))?;

        let deprecated = self.dir.join(file.deprecated);
        match fs::remove_file(&deprecated) {
            Ok(()) => {
                tracing::info!("migrated {} to {}", file.deprecated, file.current);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(fs_error::write_failed(&deprecated, &e)),
        }
    }

    pub fn mix_version(&self) -> Result<u32> {
        self.read_number(MIX_VERSION_FILE)
    }

    pub fn upstream_version(&self) -> Result<u32> {
        self.read_number(UPSTREAM_VERSION_FILE)
    }

    /// Upstream URL, `None` when no URL file exists
    pub fn upstream_url(&self) -> Result<Option<String>> {
        Ok(self
            .read_text(UPSTREAM_URL_FILE)?
            .map(|(_, url)| url)
            .filter(|url| !url.is_empty()))
    }

    pub fn write_mix_version(&self, version: u32) -> Result<()> {
        self.write_text(MIX_VERSION_FILE, &version.to_string())
    }

    pub fn write_upstream_version(&self, version: u32) -> Result<()> {
        self.write_text(UPSTREAM_VERSION_FILE, &version.to_string())
    }

    pub fn write_upstream_url(&self, url: &str) -> Result<()> {
        self.write_text(UPSTREAM_URL_FILE, url)
    }

    /// Advance the mix version by [`VERSION_STEP`], returning the new value
    pub fn bump_mix_version(&self) -> Result<u32> {
        let current = self.mix_version()?;
        let next = current
            .checked_add(VERSION_STEP)
            .ok_or_else(|| version_error::overflow(current))?;
        self.write_mix_version(next)?;
        Ok(next)
    }

    /// Create the ledger files of a fresh workspace
    pub fn init(&self, versions: &InitVersions) -> Result<()> {
        self.write_mix_version(versions.mix_version)?;
        self.write_upstream_version(versions.upstream_version)?;
        self.write_upstream_url(&versions.upstream_url)
    }

    /// Current versions plus the format range of the current upstream
    pub fn report(&self, upstream: &dyn UpstreamSource) -> Result<VersionReport> {
        let mix = self.mix_version()?;
        let current_upstream = self.upstream_version()?;
        let range = upstream.format_range(current_upstream)?;
        Ok(VersionReport {
            mix,
            upstream: current_upstream,
            range,
        })
    }

    /// Move both the mix and the upstream version forward
    ///
    /// `next_mix` defaults to the current mix version plus [`VERSION_STEP`].
    /// The upstream version must stay inside the format of the current
    /// upstream version, since crossing a format needs a format bump build.
    pub fn update_versions(
        &self,
        next_mix: Option<u32>,
        next_upstream: UpstreamTarget,
        upstream: &dyn UpstreamSource,
    ) -> Result<VersionUpdate> {
        let previous_mix = self.mix_version()?;
        let previous_upstream = self.upstream_version()?;
        let range = upstream.format_range(previous_upstream)?;

        let mix = match next_mix {
            Some(v) => v,
            None => previous_mix
                .checked_add(VERSION_STEP)
                .ok_or_else(|| version_error::overflow(previous_mix))?,
        };
        if mix <= previous_mix {
            return Err(version_error::not_increasing(previous_mix, mix));
        }

        let next_upstream = match next_upstream {
            UpstreamTarget::Latest => range.latest,
            UpstreamTarget::Version(v) if range.contains(v) => v,
            UpstreamTarget::Version(v) => {
                return Err(version_error::out_of_format_range(
                    v,
                    range.format,
                    range.first,
                    range.latest,
                ));
            }
        };
        if !upstream.has_version(next_upstream)? {
            return Err(version_error::upstream_missing(
                &upstream.version_manifest(next_upstream),
            ));
        }

        self.write_mix_version(mix)?;
        self.write_upstream_version(next_upstream)?;

        Ok(VersionUpdate {
            previous_mix,
            previous_upstream,
            mix,
            upstream: next_upstream,
            range,
        })
    }
}

#[cfg(test)]
mod tests;
