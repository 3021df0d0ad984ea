//! Content chroot merging
//!
//! Every bundle may carry content chroots (its installer chroot and any
//! `content(...)` directories). Their files are merged into one shared
//! "full" tree; a path shipped by two chroots must be identical in both.
//!
//! A bundle merges all-or-nothing: its `files` set only grows once every one
//! of its chroots merged cleanly. Bundles merged before a conflict keep their
//! files in the full tree.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::{MetadataExt, PermissionsExt, chown, symlink};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::catalog::{Bundle, BundleSet};
use crate::error::{Result, fs as fs_error, merge as merge_error};
use crate::hash::same_contents;

const MODE_MASK: u32 = 0o7777;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directory,
    File,
    Symlink,
}

impl EntryKind {
    fn of(path: &Path, file_type: fs::FileType) -> Result<Self> {
        if file_type.is_symlink() {
            Ok(Self::Symlink)
        } else if file_type.is_dir() {
            Ok(Self::Directory)
        } else if file_type.is_file() {
            Ok(Self::File)
        } else {
            Err(merge_error::unsupported_type(path))
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::File => "file",
            Self::Symlink => "symlink",
        }
    }
}

/// Merges bundle content chroots into a shared full tree
#[derive(Debug, Clone)]
pub struct ContentMerger {
    full_dir: PathBuf,
}

impl ContentMerger {
    pub fn new(full_dir: impl Into<PathBuf>) -> Self {
        Self {
            full_dir: full_dir.into(),
        }
    }

    /// Merge every bundle of the set, in name order
    ///
    /// Stops at the first bundle that fails.
    pub fn merge_bundles(&self, set: &mut BundleSet) -> Result<()> {
        for bundle in set.values_mut() {
            self.merge_bundle(bundle)?;
        }
        Ok(())
    }

    /// Merge all content chroots of one bundle
    pub fn merge_bundle(&self, bundle: &mut Bundle) -> Result<()> {
        fs::create_dir_all(&self.full_dir)
            .map_err(|e| fs_error::write_failed(&self.full_dir, &e))?;

        let mut files = BTreeSet::new();
        for chroot in &bundle.content_chroots {
            if !chroot.is_dir() {
                return Err(merge_error::chroot_missing(&bundle.name, chroot));
            }
            self.merge_chroot(&bundle.name, chroot, &mut files)?;
        }

        tracing::debug!(
            "merged {} paths of bundle {} into {}",
            files.len(),
            bundle.name,
            self.full_dir.display()
        );
        bundle.files.extend(files);
        Ok(())
    }

    fn merge_chroot(
        &self,
        bundle: &str,
        chroot: &Path,
        files: &mut BTreeSet<String>,
    ) -> Result<()> {
        let walker = WalkDir::new(chroot)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| {
                fs_error::io_error(format!("Failed to walk {}: {e}", chroot.display()))
            })?;
            let source = entry.path();
            let Ok(relative) = source.strip_prefix(chroot) else {
                continue;
            };
            let shipped = format!("/{}", relative.display());
            let target = self.full_dir.join(relative);

            let kind = EntryKind::of(source, entry.file_type())?;
            match existing_kind(&target)? {
                None => copy_entry(source, &target, kind)?,
                Some(existing) if existing != kind => {
                    return Err(merge_error::conflict(
                        bundle,
                        &shipped,
                        format!(
                            "type mismatch ({} vs existing {})",
                            kind.label(),
                            existing.label()
                        ),
                    ));
                }
                Some(_) => {
                    if let Some(reason) = compare_entry(source, &target, kind)? {
                        return Err(merge_error::conflict(bundle, &shipped, reason));
                    }
                }
            }

            files.insert(shipped);
        }
        Ok(())
    }
}

fn existing_kind(path: &Path) -> Result<Option<EntryKind>> {
    match fs::symlink_metadata(path) {
        Ok(meta) => EntryKind::of(path, meta.file_type()).map(Some),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(fs_error::read_failed(path, &e)),
    }
}

fn mode_of(path: &Path) -> Result<u32> {
    let meta = fs::symlink_metadata(path).map_err(|e| fs_error::read_failed(path, &e))?;
    Ok(meta.permissions().mode() & MODE_MASK)
}

fn owner_of(path: &Path) -> Result<(u32, u32)> {
    let meta = fs::symlink_metadata(path).map_err(|e| fs_error::read_failed(path, &e))?;
    Ok((meta.uid(), meta.gid()))
}

/// Returns the conflict reason, if any
fn compare_entry(source: &Path, target: &Path, kind: EntryKind) -> Result<Option<String>> {
    match kind {
        EntryKind::Directory => {
            let ours = mode_of(source)?;
            let theirs = mode_of(target)?;
            if ours != theirs {
                return Ok(Some(format!(
                    "directory permissions differ ({ours:04o} vs existing {theirs:04o})"
                )));
            }
            let (uid, gid) = owner_of(source)?;
            let (existing_uid, existing_gid) = owner_of(target)?;
            if (uid, gid) != (existing_uid, existing_gid) {
                return Ok(Some(format!(
                    "directory ownership differs ({uid}:{gid} vs existing {existing_uid}:{existing_gid})"
                )));
            }
            Ok(None)
        }
        EntryKind::File => {
            if same_contents(source, target)? {
                Ok(None)
            } else {
                Ok(Some("file contents differ".to_string()))
            }
        }
        EntryKind::Symlink => {
            let ours = fs::read_link(source).map_err(|e| fs_error::read_failed(source, &e))?;
            let theirs = fs::read_link(target).map_err(|e| fs_error::read_failed(target, &e))?;
            if ours == theirs {
                Ok(None)
            } else {
                Ok(Some(format!(
                    "symlink targets differ ({} vs existing {})",
                    ours.display(),
                    theirs.display()
                )))
            }
        }
    }
}

fn copy_entry(source: &Path, target: &Path, kind: EntryKind) -> Result<()> {
    match kind {
        EntryKind::Directory => {
            let mode = mode_of(source)?;
            let (uid, gid) = owner_of(source)?;
            fs::create_dir(target).map_err(|e| fs_error::write_failed(target, &e))?;
            fs::set_permissions(target, fs::Permissions::from_mode(mode))
                .map_err(|e| fs_error::write_failed(target, &e))?;
            chown(target, Some(uid), Some(gid)).map_err(|e| fs_error::write_failed(target, &e))?;
        }
        EntryKind::File => {
            let mode = mode_of(source)?;
            fs::copy(source, target).map_err(|e| fs_error::write_failed(target, &e))?;
            fs::set_permissions(target, fs::Permissions::from_mode(mode))
                .map_err(|e| fs_error::write_failed(target, &e))?;
        }
        EntryKind::Symlink => {
            let link = fs::read_link(source).map_err(|e| fs_error::read_failed(source, &e))?;
            symlink(&link, target).map_err(|e| fs_error::write_failed(target, &e))?;
        }
    }
    Ok(())
}
