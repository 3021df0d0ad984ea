//! Version ledger errors

use std::path::Path;

use super::MixError;

pub fn file_missing(path: &Path) -> MixError {
    MixError::VersionFileMissing {
        path: path.display().to_string(),
    }
}

pub fn parse_failed(path: &Path, value: impl Into<String>) -> MixError {
    MixError::VersionParseFailed {
        path: path.display().to_string(),
        value: value.into(),
    }
}

pub fn not_increasing(current: u32, requested: u32) -> MixError {
    MixError::VersionNotIncreasing { current, requested }
}

pub fn overflow(current: u32) -> MixError {
    MixError::VersionOverflow { current }
}

pub fn out_of_format_range(version: u32, format: u32, first: u32, latest: u32) -> MixError {
    MixError::VersionOutOfFormatRange {
        version,
        format,
        first,
        latest,
    }
}

pub fn upstream_missing(path: &Path) -> MixError {
    MixError::UpstreamInfoMissing {
        path: path.display().to_string(),
    }
}
