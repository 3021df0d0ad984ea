//! Idempotent build artifacts
//!
//! Packs are expensive and never change once written, so every pack task
//! first asks an [`ArtifactStore`] whether the artifact is already there.

#[cfg(test)]
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
#[cfg(test)]
use std::sync::{Mutex, PoisonError};

use crate::error::{Result, pipeline as pipeline_error};
use crate::pipeline::manifest::pack_file_name;

/// One pack artifact: a bundle update from one version to another
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackKey {
    pub bundle: String,
    pub from: u32,
    pub to: u32,
}

impl PackKey {
    pub fn new(bundle: impl Into<String>, from: u32, to: u32) -> Self {
        Self {
            bundle: bundle.into(),
            from,
            to,
        }
    }

    pub fn is_zero_pack(&self) -> bool {
        self.from == 0
    }
}

impl fmt::Display for PackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}->{}", self.bundle, self.from, self.to)
    }
}

/// Records which artifacts exist
pub trait ArtifactStore: Sync {
    fn exists(&self, key: &PackKey) -> Result<bool>;

    /// Record that `key` was produced
    fn create(&self, key: &PackKey) -> Result<()>;
}

/// Packs on disk: `www/<to>/pack-<bundle>-from-<from>.tar`
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    www_dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(www_dir: impl Into<PathBuf>) -> Self {
        Self {
            www_dir: www_dir.into(),
        }
    }

    pub fn path(&self, key: &PackKey) -> PathBuf {
        self.www_dir
            .join(key.to.to_string())
            .join(pack_file_name(&key.bundle, key.from))
    }
}

impl ArtifactStore for FsArtifactStore {
    fn exists(&self, key: &PackKey) -> Result<bool> {
        crate::common::fs::lexists(&self.path(key))
    }

    /// The pack file itself is the record, so it must be on disk by now
    fn create(&self, key: &PackKey) -> Result<()> {
        let path = self.path(key);
        if path.is_file() {
            Ok(())
        } else {
            Err(pipeline_error::archive_failed(&path, "pack was not produced"))
        }
    }
}

/// In-memory store for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    keys: Mutex<BTreeSet<PackKey>>,
}

#[cfg(test)]
impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
impl ArtifactStore for MemoryArtifactStore {
    fn exists(&self, key: &PackKey) -> Result<bool> {
        Ok(self
            .keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key))
    }

    fn create(&self, key: &PackKey) -> Result<()> {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
        Ok(())
    }
}

/// What [`ensure`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensured {
    AlreadyExisted,
    Created,
}

/// Produce `key` unless the store already has it
pub fn ensure<S, F>(store: &S, key: &PackKey, produce: F) -> Result<Ensured>
where
    S: ArtifactStore + ?Sized,
    F: FnOnce() -> Result<()>,
{
    if store.exists(key)? {
        if key.is_zero_pack() {
            println!(
                "Zero pack already exists for {} to version {}",
                key.bundle, key.to
            );
        } else {
            println!(
                "Delta pack already exists for {} from version {} to version {}",
                key.bundle, key.from, key.to
            );
        }
        return Ok(Ensured::AlreadyExisted);
    }

    produce()?;
    store.create(key)?;
    Ok(Ensured::Created)
}
