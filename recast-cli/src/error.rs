// ============================================================================
// recast-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Exit-code policy for the CLI
//
// The CLI works with `anyhow::Error` at its boundary. Core failures are found
// again by downcasting so the process can tell a restored original (exit 1)
// from one that needs manual recovery (exit 2).

use recast_core::CoreError;

/// Run committed.
pub const EXIT_SUCCESS: i32 = 0;

/// Run failed and the original is untouched or restored.
pub const EXIT_RECOVERABLE: i32 = 1;

/// Commit or rollback failed; backup and/or temp files are left on disk.
pub const EXIT_UNRECOVERABLE: i32 = 2;

/// Maps a failed run to the process exit code.
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<CoreError>() {
        Some(core) if core.is_unrecoverable() => EXIT_UNRECOVERABLE,
        _ => EXIT_RECOVERABLE,
    }
}

/// Extra guidance printed after an unrecoverable failure.
pub fn recovery_hint(error: &anyhow::Error) -> Option<String> {
    match error.downcast_ref::<CoreError>()? {
        CoreError::Commit { backup, temp, .. } => Some(format!(
            "The original is preserved at '{}' and the verified output at '{}'.",
            backup.display(),
            temp.display()
        )),
        CoreError::RollbackFailed { .. } => Some(
            "The original could not be restored; its backup was left in place.".to_string(),
        ),
        _ => None,
    }
}
