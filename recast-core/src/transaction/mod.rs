// ============================================================================
// recast-core/src/transaction/mod.rs
// ============================================================================
//
// TRANSACTION: Backup -> transcode -> verify -> tag -> commit
//
// The orchestrator drives every other component linearly and is the only
// code that renames or deletes files. The original is renamed to the backup
// first; any failure before the commit rename restores it. The backup is
// deleted only after the new file sits under the original's name.
//
// STATES:
//   Start -> BackedUp -> Transcoded -> Verified -> Tagged -> Committed
//
// A failure leaving BackedUp, Transcoded or Verified rolls back. A failed
// commit rename and a failed rollback are unrecoverable and leave files on
// disk. Running two transactions against the same original concurrently is
// not supported; callers must serialize runs per file.

mod paths;
mod rollback;

pub use paths::{BACKUP_SUFFIX, DEFAULT_TEMP_FILE_NAME, TransactionPaths, backup_path_for};
pub use rollback::rollback;

use crate::config::EncodingProfile;
use crate::error::{CoreError, CoreResult};
use crate::events::{Event, EventDispatcher};
use crate::external::{StreamProber, Transcoder};
use crate::tagging::{TagSet, Tagger};
use crate::verification::{ExpectedProfile, Verifier};

use rollback::rollback_after;
use serde::Serialize;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Position of a run in the success path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    BackedUp,
    Transcoded,
    Verified,
    Tagged,
    Committed,
}

impl Stage {
    /// What the transaction is doing while working toward this stage.
    pub fn action(&self) -> &'static str {
        match self {
            Stage::Start => "Starting",
            Stage::BackedUp => "Creating backup",
            Stage::Transcoded => "Re-encoding video",
            Stage::Verified => "Verifying technical parameters",
            Stage::Tagged => "Updating metadata",
            Stage::Committed => "Replacing original file",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::BackedUp => "backed up",
            Stage::Transcoded => "transcoded",
            Stage::Verified => "verified",
            Stage::Tagged => "tagged",
            Stage::Committed => "committed",
        };
        f.write_str(name)
    }
}

/// Result of a committed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub original: PathBuf,
    pub input_size: u64,
    pub output_size: u64,
    pub elapsed: Duration,
    /// The backup could not be deleted after the commit and is still on disk.
    pub backup_retained: bool,
}

/// The re-encode transaction and the collaborators it drives.
pub struct Transaction<T, P, G>
where
    T: Transcoder,
    P: StreamProber,
    G: Tagger,
{
    transcoder: T,
    verifier: Verifier<P>,
    tagger: G,
    profile: EncodingProfile,
    tags: TagSet,
}

impl<T, P, G> Transaction<T, P, G>
where
    T: Transcoder,
    P: StreamProber,
    G: Tagger,
{
    /// Verifies against the profile's own expectations and writes the
    /// default 4:2:2 10-bit tag set.
    pub fn new(transcoder: T, prober: P, tagger: G, profile: EncodingProfile) -> Self {
        let expected = ExpectedProfile::from_profile(&profile);
        Self {
            transcoder,
            verifier: Verifier::new(prober, expected),
            tagger,
            profile,
            tags: TagSet::hevc_422_10bit(),
        }
    }

    #[must_use]
    pub fn with_expected(self, expected: ExpectedProfile) -> Self {
        let Self {
            transcoder,
            verifier,
            tagger,
            profile,
            tags,
        } = self;
        Self {
            transcoder,
            verifier: Verifier::new(verifier.into_prober(), expected),
            tagger,
            profile,
            tags,
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    pub fn profile(&self) -> &EncodingProfile {
        &self.profile
    }

    pub fn expected(&self) -> &ExpectedProfile {
        self.verifier.expected()
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Runs the whole transaction for `paths`, notifying `events` at every
    /// state transition.
    pub fn run(&self, paths: &TransactionPaths, events: &EventDispatcher) -> CoreResult<RunOutcome> {
        let started = Instant::now();

        if paths.has_overlap() {
            return Err(CoreError::Config(format!(
                "original, temp and backup paths must differ: {paths:?}"
            )));
        }

        events.emit(Event::RunStarted {
            original: paths.original.clone(),
            temp: paths.temp.clone(),
            backup: paths.backup.clone(),
        });

        events.emit(Event::StageStarted {
            stage: Stage::BackedUp,
        });
        let input_size = back_up(paths).inspect_err(|e| {
            log::error!("{}", e);
            events.emit(Event::Failed {
                stage: Stage::Start,
                message: e.to_string(),
            });
        })?;
        events.emit(Event::Transition {
            from: Stage::Start,
            to: Stage::BackedUp,
        });

        self.step(paths, events, Stage::BackedUp, Stage::Transcoded, || {
            self.transcoder
                .transcode(&paths.backup, &paths.temp, &self.profile)
        })?;
        self.step(paths, events, Stage::Transcoded, Stage::Verified, || {
            self.verifier.verify(&paths.temp)
        })?;
        self.step(paths, events, Stage::Verified, Stage::Tagged, || {
            self.tagger.tag(&paths.temp, &self.tags)
        })?;

        events.emit(Event::StageStarted {
            stage: Stage::Committed,
        });
        let output_size = fs::metadata(&paths.temp).map(|m| m.len()).unwrap_or(0);
        if let Err(source) = fs::rename(&paths.temp, &paths.original) {
            let err = CoreError::Commit {
                temp: paths.temp.clone(),
                original: paths.original.clone(),
                backup: paths.backup.clone(),
                source,
            };
            log::error!("{}", err);
            events.emit(Event::Failed {
                stage: Stage::Tagged,
                message: err.to_string(),
            });
            return Err(err);
        }

        let backup_retained = match fs::remove_file(&paths.backup) {
            Ok(()) => false,
            Err(e) => {
                let message = format!(
                    "New file is in place but the backup {} could not be removed: {}",
                    paths.backup.display(),
                    e
                );
                log::warn!("{}", message);
                events.emit(Event::Warning { message });
                true
            }
        };
        events.emit(Event::Transition {
            from: Stage::Tagged,
            to: Stage::Committed,
        });

        let elapsed = started.elapsed();
        events.emit(Event::RunCompleted {
            original: paths.original.clone(),
            input_size,
            output_size,
            elapsed_secs: elapsed.as_secs_f64(),
        });
        log::info!("Replaced {} in {:.1}s", paths.original.display(), elapsed.as_secs_f64());

        Ok(RunOutcome {
            original: paths.original.clone(),
            input_size,
            output_size,
            elapsed,
            backup_retained,
        })
    }

    /// Runs one recoverable step; on failure rolls back and returns the
    /// step's error (or the compound rollback error).
    fn step<F>(
        &self,
        paths: &TransactionPaths,
        events: &EventDispatcher,
        from: Stage,
        to: Stage,
        action: F,
    ) -> CoreResult<()>
    where
        F: FnOnce() -> CoreResult<()>,
    {
        events.emit(Event::StageStarted { stage: to });

        let cause = match action() {
            Ok(()) => {
                events.emit(Event::Transition { from, to });
                return Ok(());
            }
            Err(e) => e,
        };

        log::error!("{} failed: {}", to.action(), cause);
        events.emit(Event::Failed {
            stage: from,
            message: cause.to_string(),
        });
        events.emit(Event::RollbackStarted);

        let (err, restored) = rollback_after(paths, cause);
        if restored {
            events.emit(Event::RolledBack);
        } else {
            events.emit(Event::RollbackFailed {
                message: err.to_string(),
            });
        }
        Err(err)
    }
}

/// Moves the original to the backup path. Returns the original's size.
fn back_up(paths: &TransactionPaths) -> CoreResult<u64> {
    let backup_error = |reason: String| CoreError::Backup {
        original: paths.original.clone(),
        reason,
    };

    let metadata = fs::metadata(&paths.original)
        .map_err(|e| backup_error(format!("original is not accessible: {e}")))?;
    if !metadata.is_file() {
        return Err(backup_error("original is not a regular file".to_string()));
    }

    log::info!(
        "Creating backup: {} -> {}",
        paths.original.display(),
        paths.backup.display()
    );
    move_without_replacing(&paths.original, &paths.backup).map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            backup_error(format!(
                "backup path {} is already occupied",
                paths.backup.display()
            ))
        } else {
            backup_error(e.to_string())
        }
    })?;
    Ok(metadata.len())
}

/// Moves `from` to `to`, failing with `AlreadyExists` rather than replacing
/// anything at `to`.
///
/// A hard link claims `to` atomically. Filesystems without hard links
/// (exFAT camera cards, some network shares) fall back to a checked rename.
fn move_without_replacing(from: &Path, to: &Path) -> io::Result<()> {
    match fs::hard_link(from, to) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(from) {
                // Undo the link so the pre-state is unchanged.
                let _ = fs::remove_file(to);
                return Err(e);
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(e),
        Err(e) => {
            log::debug!("Hard link to {} failed ({}), using rename", to.display(), e);
            if fs::symlink_metadata(to).is_ok() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} already exists", to.display()),
                ));
            }
            fs::rename(from, to)
        }
    }
}
