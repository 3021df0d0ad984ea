//! The selected Mix Bundle List (`mixbundles`)
//!
//! One bundle name per line, sorted, without duplicates. It only ever holds
//! the bundles a user picked; includes are resolved on demand.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::common::fs::{read_optional, write_atomic};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct MixBundleList {
    path: PathBuf,
}

impl MixBundleList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Names in file order, first occurrence kept; missing file is empty
    pub fn read(&self) -> Result<Vec<String>> {
        let Some(content) = read_optional(&self.path)? else {
            return Ok(Vec::new());
        };

        let mut seen = BTreeSet::new();
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter(|line| seen.insert((*line).to_string()))
            .map(str::to_string)
            .collect())
    }

    pub fn read_set(&self) -> Result<BTreeSet<String>> {
        Ok(self.read()?.into_iter().collect())
    }

    /// Replace the list with `names`, sorted, one per line
    pub fn write(&self, names: &BTreeSet<String>) -> Result<()> {
        let mut content = String::new();
        for name in names {
            content.push_str(name);
            content.push('\n');
        }
        write_atomic(&self.path, content)
    }
}
