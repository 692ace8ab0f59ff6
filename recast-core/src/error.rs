// ============================================================================
// recast-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the re-encode transaction
//
// Every failure the transaction can observe maps to one CoreError variant.
// Backup failures happen before anything changed. Transcode, probe,
// verification and tag failures are recovered by rolling the backup back into
// place. Commit and rollback failures are unrecoverable and leave files on
// disk for manual recovery.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Placeholder reported when a tracked stream parameter is absent from probe output.
pub const MISSING_VALUE: &str = "<missing>";

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to back up '{}': {reason}", original.display())]
    Backup { original: PathBuf, reason: String },

    #[error("Failed to execute {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Command '{tool}' failed with status {status}. Stderr: {stderr}")]
    CommandFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Transcode failed with status {status}: {diagnostics}")]
    Transcode { status: ExitStatus, diagnostics: String },

    #[error("Verification failed: {param} is '{actual}' (expected '{expected}')")]
    Verification {
        param: String,
        actual: String,
        expected: String,
    },

    #[error("Failed to write tags to '{}': {reason}", path.display())]
    Tag { path: PathBuf, reason: String },

    #[error(
        "Failed to move '{}' onto '{}': {source}. Backup kept at '{}'",
        temp.display(),
        original.display(),
        backup.display()
    )]
    Commit {
        temp: PathBuf,
        original: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Rollback failed ({reason}) after: {cause}")]
    RollbackFailed { cause: Box<CoreError>, reason: String },

    #[error("Required external dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CoreError {
    /// True for failures that leave backup and/or temp files behind for manual recovery.
    #[must_use]
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, Self::Commit { .. } | Self::RollbackFailed { .. })
    }

    /// The error that started the failure, looking through a failed rollback.
    #[must_use]
    pub fn root_cause(&self) -> &CoreError {
        match self {
            Self::RollbackFailed { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

pub fn command_start_error(tool: impl Into<String>, error: io::Error) -> CoreError {
    CoreError::CommandStart(tool.into(), error)
}

pub fn command_failed_error(
    tool: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        tool: tool.into(),
        status,
        stderr: stderr.into(),
    }
}
