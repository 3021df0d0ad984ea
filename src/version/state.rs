//! Persisted mix state (`mixer.state`)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::fs::{read_optional, write_atomic};
use crate::error::{Result, config as config_error};

pub const STATE_FILE: &str = "mixer.state";

/// Format used by a workspace that never recorded one
pub const DEFAULT_FORMAT: u32 = 1;

/// Build state that outlives a single build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixState {
    pub format: u32,
    /// Last published mix version, 0 before the first publish
    pub previous_mix_version: u32,
}

/// On-disk shape; missing keys fall back to defaults in [`MixState::load`]
#[derive(Debug, Default, Deserialize)]
struct StateFile {
    format: Option<u32>,
    previous_mix_version: Option<u32>,
}

impl MixState {
    pub fn path(root: &Path) -> PathBuf {
        root.join(STATE_FILE)
    }

    /// Load the state of a workspace
    ///
    /// A missing previous version is taken from `last_ver` (the published
    /// `LAST_VER` pointer), and is 0 when that does not exist either.
    pub fn load(root: &Path, last_ver: &Path) -> Result<Self> {
        let path = Self::path(root);
        let file: StateFile = match read_optional(&path)? {
            Some(content) if !content.trim().is_empty() => {
                serde_yaml::from_str(&content).map_err(|e| {
                    config_error::parse_failed(path.display().to_string(), e.to_string())
                })?
            }
            _ => StateFile::default(),
        };

        let previous_mix_version = match file.previous_mix_version {
            Some(v) => v,
            None => read_optional(last_ver)?
                .and_then(|content| content.trim().parse().ok())
                .unwrap_or(0),
        };

        Ok(Self {
            format: file.format.unwrap_or(DEFAULT_FORMAT),
            previous_mix_version,
        })
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        write_atomic(&Self::path(root), content)
    }
}
