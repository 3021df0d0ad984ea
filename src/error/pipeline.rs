//! Build pipeline errors

use std::path::Path;

use super::MixError;

/// Creates a manifest parse error
pub fn manifest_parse_failed(path: &Path, reason: impl Into<String>) -> MixError {
    MixError::ManifestParseFailed {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

/// Creates an error for a failed manifest service call
pub fn service_failed(operation: impl Into<String>, reason: impl Into<String>) -> MixError {
    MixError::ManifestServiceFailed {
        operation: operation.into(),
        reason: reason.into(),
    }
}

/// Creates an error for a pack whose source version is not below its target
pub fn invalid_pack_range(bundle: impl Into<String>, from: u32, to: u32) -> MixError {
    MixError::InvalidPackRange {
        bundle: bundle.into(),
        from,
        to,
    }
}

/// Creates an archive creation error
pub fn archive_failed(path: &Path, reason: impl Into<String>) -> MixError {
    MixError::ArchiveFailed {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

/// Creates an invalid build parameter error
pub fn invalid_parameter(message: impl Into<String>) -> MixError {
    MixError::InvalidBuildParameter {
        message: message.into(),
    }
}
