//! File system errors

use std::path::Path;

use super::MixError;

/// Creates a file not found error
pub fn not_found(path: &Path) -> MixError {
    MixError::FileNotFound {
        path: path.display().to_string(),
    }
}

/// Creates a read error from the underlying IO error
pub fn read_failed(path: &Path, err: &std::io::Error) -> MixError {
    MixError::FileReadFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates a write error from the underlying IO error
pub fn write_failed(path: &Path, err: &std::io::Error) -> MixError {
    MixError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> MixError {
    MixError::IoError {
        message: message.into(),
    }
}
