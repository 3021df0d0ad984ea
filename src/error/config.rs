//! Configuration errors

use super::MixError;

pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> MixError {
    MixError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

pub fn invalid(message: impl Into<String>) -> MixError {
    MixError::ConfigInvalid {
        message: message.into(),
    }
}

pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> MixError {
    MixError::ConfigReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
