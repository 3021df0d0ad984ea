//! Bundle catalog and resolution errors

use super::MixError;

/// Creates a bundle not found error
pub fn not_found(name: impl Into<String>) -> MixError {
    MixError::BundleNotFound { name: name.into() }
}

/// Creates an invalid bundle name error
pub fn invalid_name(name: impl Into<String>) -> MixError {
    MixError::InvalidBundleName { name: name.into() }
}

/// Creates a definition parse error pointing at a 1-based line number
pub fn parse_failed(path: impl Into<String>, line: usize, reason: impl Into<String>) -> MixError {
    MixError::BundleParseFailed {
        path: path.into(),
        line,
        reason: reason.into(),
    }
}

/// Creates a validation error listing every problem found for one bundle
pub fn validation_failed(name: impl Into<String>, problems: &[String]) -> MixError {
    MixError::BundleValidationFailed {
        name: name.into(),
        problems: problems
            .iter()
            .map(|p| format!("  - {p}"))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Creates an include cycle error from the names along the cycle
pub fn cycle(chain: &[String]) -> MixError {
    MixError::CircularInclude {
        chain: chain.join(" -> "),
    }
}
