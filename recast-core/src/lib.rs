//! Core library for transactional, verified re-encoding of a single video file.
//!
//! A run renames the original to a backup, transcodes the backup into a temp
//! file with ffmpeg, checks the temp file's stream parameters with ffprobe,
//! writes custom MP4 metadata into it and finally renames it over the
//! original. Any failure before that last rename restores the original.
//!
//! Runs against the same file must not overlap. The library does not lock.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use recast_core::{EncodingProfile, EventDispatcher, TransactionPaths, reencode_in_place};
//!
//! let paths = TransactionPaths::for_original("/media/DJI_0257_D.MP4");
//! let outcome = reencode_in_place(&paths, EncodingProfile::default(), &EventDispatcher::new())?;
//! println!("{} bytes -> {} bytes", outcome.input_size, outcome.output_size);
//! # Ok::<(), recast_core::CoreError>(())
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod external;
pub mod tagging;
pub mod transaction;
pub mod utils;
pub mod verification;

// Re-exports for public API
pub use config::{EncodingProfile, EncodingProfileBuilder};
pub use error::{CoreError, CoreResult};
pub use events::{Event, EventDispatcher, EventHandler, JsonEventHandler};
pub use external::{
    FfmpegTranscoder, FfprobeProber, SidecarSpawner, StreamProber, Transcoder, check_dependency,
};
pub use tagging::{Mp4Tagger, TagKey, TagSet, TagValue, Tagger};
pub use transaction::{RunOutcome, Stage, Transaction, TransactionPaths, rollback};
pub use utils::{format_bytes, format_duration, size_change_percent};
pub use verification::{ExpectedProfile, Verifier};

/// The production transaction: ffmpeg via ffmpeg-sidecar, the `ffprobe`
/// binary and lofty's MP4 writer.
pub type DefaultTransaction = Transaction<FfmpegTranscoder, FfprobeProber, Mp4Tagger>;

/// Builds the production transaction for `profile`.
pub fn default_transaction(profile: EncodingProfile) -> DefaultTransaction {
    Transaction::new(
        FfmpegTranscoder::new(SidecarSpawner),
        FfprobeProber::new(),
        Mp4Tagger,
        profile,
    )
}

/// Re-encodes `paths.original` in place with the production components.
pub fn reencode_in_place(
    paths: &TransactionPaths,
    profile: EncodingProfile,
    events: &EventDispatcher,
) -> CoreResult<RunOutcome> {
    profile.validate()?;
    default_transaction(profile).run(paths, events)
}
