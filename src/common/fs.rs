//! Common file system operations with unified error handling

use std::fs;
use std::io::{ErrorKind, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Result, fs as fs_error};

/// Mode given to files written through [`write_atomic`]
const WRITE_MODE: u32 = 0o644;

/// Replace `path` with `contents` in a single rename
///
/// The content lands in a temporary file next to the target first, so readers
/// see either the old or the new content, never a partial write.
pub fn write_atomic(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| fs_error::write_failed(&parent, &e))?;

    let mut tmp = NamedTempFile::new_in(&parent).map_err(|e| fs_error::write_failed(path, &e))?;
    tmp.write_all(contents.as_ref())
        .and_then(|()| tmp.as_file().sync_all())
        .and_then(|()| {
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(WRITE_MODE))
        })
        .map_err(|e| fs_error::write_failed(path, &e))?;
    tmp.persist(path)
        .map_err(|e| fs_error::write_failed(path, &e.error))?;
    Ok(())
}

/// Read a whole file, returning `None` when it does not exist
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(fs_error::read_failed(path, &e)),
    }
}

/// Check whether anything (including a dangling symlink) exists at `path`
pub fn lexists(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(fs_error::read_failed(path, &e)),
    }
}

/// Names of the regular files directly inside `dir`, sorted
///
/// Hidden files are skipped. A missing directory has no entries.
pub fn list_files(dir: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(fs_error::read_failed(dir, &e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| fs_error::read_failed(dir, &e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let file_type = entry
            .file_type()
            .map_err(|e| fs_error::read_failed(&entry.path(), &e))?;
        if file_type.is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Remove a directory tree, treating an already missing one as removed
pub fn remove_dir_all_if_exists(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(fs_error::write_failed(dir, &e)),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::test_fixtures::create_temp_dir;

    #[test]
    fn test_write_atomic_creates_parents() {
        let temp = create_temp_dir();
        let path = temp.path().join("www/version/format1/latest");

        write_atomic(&path, "10").expect("write");

        assert_eq!(fs::read_to_string(&path).expect("read"), "10");
        let mode = fs::metadata(&path).expect("meta").permissions().mode() & 0o777;
        assert_eq!(mode, WRITE_MODE);
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let temp = create_temp_dir();
        let path = temp.path().join("mixversion");

        write_atomic(&path, "a much longer first content").expect("write");
        write_atomic(&path, "20").expect("rewrite");

        assert_eq!(fs::read_to_string(&path).expect("read"), "20");
    }

    #[test]
    fn test_read_optional_missing() {
        let temp = create_temp_dir();
        assert!(
            read_optional(&temp.path().join("nope"))
                .expect("read")
                .is_none()
        );
    }

    #[test]
    fn test_lexists_dangling_symlink() {
        let temp = create_temp_dir();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink("missing-target", &link).expect("symlink");

        assert!(lexists(&link).expect("lexists"));
        assert!(!link.exists());
    }

    #[test]
    fn test_list_files_skips_hidden_and_dirs() {
        let temp = create_temp_dir();
        fs::write(temp.path().join("b"), "").expect("write");
        fs::write(temp.path().join("a"), "").expect("write");
        fs::write(temp.path().join(".hidden"), "").expect("write");
        fs::create_dir(temp.path().join("dir")).expect("mkdir");

        assert_eq!(list_files(temp.path()).expect("list"), vec!["a", "b"]);
        assert!(
            list_files(&temp.path().join("missing"))
                .expect("list")
                .is_empty()
        );
    }
}
