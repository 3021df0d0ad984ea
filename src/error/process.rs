//! External command errors

use super::MixError;

/// Creates an error for a program that could not be started
pub fn spawn_failed(program: impl Into<String>, reason: impl Into<String>) -> MixError {
    MixError::CommandSpawnFailed {
        program: program.into(),
        reason: reason.into(),
    }
}

/// Creates an error for a command that exited unsuccessfully
pub fn failed(
    command: impl Into<String>,
    status: impl Into<String>,
    output: impl Into<String>,
) -> MixError {
    MixError::CommandFailed {
        command: command.into(),
        status: status.into(),
        output: output.into(),
    }
}
