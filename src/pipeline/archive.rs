//! xz-compressed tar archives of manifests

use std::fs::{self, File};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use xz2::write::XzEncoder;

use crate::error::{Result, pipeline as pipeline_error};

/// xz preset used for manifest archives
const XZ_LEVEL: u32 = 6;

const ARCHIVE_MODE: u32 = 0o644;

/// Path of the archive written for `file`
pub fn archive_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(".tar");
    PathBuf::from(name)
}

/// Write `<first file>.tar`, an xz-compressed tar holding `files` by name
///
/// The archive is written next to the first file and renamed into place.
pub fn create_compressed_archive(files: &[&Path]) -> Result<PathBuf> {
    let Some(first) = files.first() else {
        return Err(pipeline_error::invalid_parameter("no files given for archive"));
    };
    let target = archive_path(first);
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let fail = |reason: String| pipeline_error::archive_failed(&target, reason);

    let tmp = NamedTempFile::new_in(dir).map_err(|e| fail(e.to_string()))?;
    let encoder = XzEncoder::new(tmp, XZ_LEVEL);
    let mut builder = tar::Builder::new(encoder);

    for file in files {
        let Some(name) = file.file_name() else {
            return Err(fail(format!("{} has no file name", file.display())));
        };
        let mut source = File::open(file).map_err(|e| fail(format!("{}: {e}", file.display())))?;
        builder
            .append_file(name, &mut source)
            .map_err(|e| fail(e.to_string()))?;
    }

    let encoder = builder.into_inner().map_err(|e| fail(e.to_string()))?;
    let mut tmp = encoder.finish().map_err(|e| fail(e.to_string()))?;
    tmp.flush()
        .and_then(|()| {
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(ARCHIVE_MODE))
        })
        .map_err(|e| fail(e.to_string()))?;
    tmp.persist(&target).map_err(|e| fail(e.error.to_string()))?;

    Ok(target)
}
