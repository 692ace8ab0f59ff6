//! Restoring the original after a failed step.
//!
//! Every step checks for existence first, so a rollback that was interrupted
//! part way can be run again and ends in the same state.

use super::TransactionPaths;
use super::paths::same_file;
use crate::error::{CoreError, CoreResult};

use std::fs;

/// Puts the backup back under the original's name and removes the temp file.
///
/// If restoring the backup fails nothing else is touched: the backup and any
/// temp output stay on disk and the error is returned.
pub fn rollback(paths: &TransactionPaths) -> CoreResult<()> {
    if paths.backup.exists() {
        log::info!(
            "Restoring original from backup: {} -> {}",
            paths.backup.display(),
            paths.original.display()
        );
        fs::rename(&paths.backup, &paths.original)?;
    } else {
        log::debug!("No backup at {}, nothing to restore", paths.backup.display());
    }

    if same_file(&paths.temp, &paths.original) {
        log::warn!(
            "Temp path {} names the original; leaving it in place",
            paths.temp.display()
        );
    } else if paths.temp.exists() {
        log::debug!("Removing temp output {}", paths.temp.display());
        fs::remove_file(&paths.temp)?;
    }

    Ok(())
}

/// Rolls back after `cause`, returning the error the caller should see.
///
/// That is `cause` itself when the rollback succeeds, or a compound
/// [`CoreError::RollbackFailed`] wrapping it when the rollback fails.
pub(crate) fn rollback_after(paths: &TransactionPaths, cause: CoreError) -> (CoreError, bool) {
    match rollback(paths) {
        Ok(()) => (cause, true),
        Err(e) => {
            log::error!(
                "Rollback failed; backup left at {} and temp at {}: {}",
                paths.backup.display(),
                paths.temp.display(),
                e
            );
            (
                CoreError::RollbackFailed {
                    cause: Box::new(cause),
                    reason: e.to_string(),
                },
                false,
            )
        }
    }
}
