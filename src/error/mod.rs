//! Error types and handling for mixer
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`bundle`]: Bundle catalog and resolution errors
//! - [`merge`]: Content chroot merge errors
//! - [`version`]: Version ledger errors
//! - [`pipeline`]: Build pipeline errors
//! - [`process`]: External command errors
//! - [`config`]: Configuration errors
//! - [`fs`]: File system errors

pub mod bundle;
pub mod config;
pub mod fs;
pub mod merge;
pub mod pipeline;
pub mod process;
pub mod version;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for mixer operations
#[derive(Error, Diagnostic, Debug)]
pub enum MixError {
    // Bundle errors
    #[error("Bundle \"{name}\" not found")]
    #[diagnostic(
        code(mixer::bundle::not_found),
        help("Check local-bundles/, local-packages and the upstream bundles of the current upstream version")
    )]
    BundleNotFound { name: String },

    #[error("Invalid bundle name: {name}")]
    #[diagnostic(
        code(mixer::bundle::invalid_name),
        help("Bundle names may only contain letters, digits, '-' and '_', and cannot be 'MoM' or 'full'")
    )]
    InvalidBundleName { name: String },

    #[error("Failed to parse bundle definition {path} (line {line}): {reason}")]
    #[diagnostic(code(mixer::bundle::parse_failed))]
    BundleParseFailed {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Bundle \"{name}\" failed validation:\n{problems}")]
    #[diagnostic(code(mixer::bundle::validation_failed))]
    BundleValidationFailed { name: String, problems: String },

    #[error("cycle found in bundles: {chain}")]
    #[diagnostic(
        code(mixer::bundle::cycle),
        help("Remove one of the include() lines that form the cycle")
    )]
    CircularInclude { chain: String },

    #[error("os-core bundle not found")]
    #[diagnostic(
        code(mixer::bundle::root_missing),
        help("Every mix must contain os-core. Run 'mixer bundle add os-core'")
    )]
    RootBundleMissing,

    // Merge errors
    #[error("Content conflict in bundle \"{bundle}\" at \"{path}\": {reason}")]
    #[diagnostic(
        code(mixer::merge::conflict),
        help("Two content chroots ship different versions of the same path")
    )]
    ContentConflict {
        bundle: String,
        path: String,
        reason: String,
    },

    #[error("Content chroot {path} of bundle \"{bundle}\" does not exist")]
    #[diagnostic(code(mixer::merge::chroot_missing))]
    ContentChrootMissing { bundle: String, path: String },

    #[error("Unsupported file type at {path}")]
    #[diagnostic(
        code(mixer::merge::unsupported_type),
        help("Only regular files, directories and symlinks can be shipped")
    )]
    UnsupportedFileType { path: String },

    // Version errors
    #[error("Version file not found: {path}")]
    #[diagnostic(
        code(mixer::version::not_found),
        help("Run 'mixer init' to create the version files")
    )]
    VersionFileMissing { path: String },

    #[error("Invalid version in {path}: '{value}'")]
    #[diagnostic(code(mixer::version::parse_failed))]
    VersionParseFailed { path: String, value: String },

    #[error(
        "new mix version ({requested}) must be greater than the current mix version ({current})"
    )]
    #[diagnostic(code(mixer::version::not_increasing))]
    VersionNotIncreasing { current: u32, requested: u32 },

    #[error("mix version {current} cannot be incremented further")]
    #[diagnostic(code(mixer::version::overflow))]
    VersionOverflow { current: u32 },

    #[error(
        "invalid upstream version to update ({version}) out of the format {format} range: must be at least {first} and at most {latest}"
    )]
    #[diagnostic(code(mixer::version::out_of_format_range))]
    VersionOutOfFormatRange {
        version: u32,
        format: u32,
        first: u32,
        latest: u32,
    },

    #[error("Upstream information not found: {path}")]
    #[diagnostic(
        code(mixer::version::upstream_missing),
        help("Check the upstream mirror directory configured in mixer.yaml")
    )]
    UpstreamInfoMissing { path: String },

    // Pipeline errors
    #[error("Failed to parse manifest {path}: {reason}")]
    #[diagnostic(code(mixer::pipeline::manifest_parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    #[error("Manifest service failed to {operation}: {reason}")]
    #[diagnostic(code(mixer::pipeline::manifest_service))]
    ManifestServiceFailed { operation: String, reason: String },

    #[error("Invalid pack range for bundle \"{bundle}\": from {from} to {to}")]
    #[diagnostic(code(mixer::pipeline::invalid_pack_range))]
    InvalidPackRange { bundle: String, from: u32, to: u32 },

    #[error("Failed to create archive {path}: {reason}")]
    #[diagnostic(code(mixer::pipeline::archive_failed))]
    ArchiveFailed { path: String, reason: String },

    #[error("Invalid build parameter: {message}")]
    #[diagnostic(code(mixer::pipeline::invalid_parameter))]
    InvalidBuildParameter { message: String },

    // Process errors
    #[error("Failed to execute '{program}': {reason}")]
    #[diagnostic(
        code(mixer::process::spawn_failed),
        help("Check that the program is installed and on PATH")
    )]
    CommandSpawnFailed { program: String, reason: String },

    #[error("Command failed ({status}): {command}\n{output}")]
    #[diagnostic(code(mixer::process::failed))]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    // Configuration errors
    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(mixer::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(mixer::config::invalid))]
    ConfigInvalid { message: String },

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(mixer::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(mixer::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(mixer::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(mixer::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(mixer::fs::io_error))]
    IoError { message: String },

    #[error("Mix workspace not found at: {path}")]
    #[diagnostic(
        code(mixer::workspace::not_found),
        help("Run 'mixer init' to create a mix workspace, or pass --workspace")
    )]
    WorkspaceNotFound { path: String },

    #[error("Operation cancelled")]
    #[diagnostic(code(mixer::cancelled))]
    OperationCancelled,
}

impl From<std::io::Error> for MixError {
    fn from(err: std::io::Error) -> Self {
        MixError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for MixError {
    fn from(err: serde_yaml::Error) -> Self {
        MixError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for MixError {
    fn from(err: serde_json::Error) -> Self {
        MixError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for MixError {
    fn from(err: inquire::InquireError) -> Self {
        match err {
            inquire::InquireError::OperationCanceled
            | inquire::InquireError::OperationInterrupted => MixError::OperationCancelled,
            other => MixError::IoError {
                message: other.to_string(),
            },
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, MixError>;
