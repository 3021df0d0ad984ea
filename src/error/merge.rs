//! Content chroot merge errors

use std::path::Path;

use super::MixError;

/// Creates a conflict error for a path shipped differently by two content chroots
pub fn conflict(
    bundle: impl Into<String>,
    path: impl Into<String>,
    reason: impl Into<String>,
) -> MixError {
    MixError::ContentConflict {
        bundle: bundle.into(),
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an error for a content chroot that is not on disk
pub fn chroot_missing(bundle: impl Into<String>, path: &Path) -> MixError {
    MixError::ContentChrootMissing {
        bundle: bundle.into(),
        path: path.display().to_string(),
    }
}

/// Creates an error for fifos, sockets and device nodes
pub fn unsupported_type(path: &Path) -> MixError {
    MixError::UnsupportedFileType {
        path: path.display().to_string(),
    }
}
