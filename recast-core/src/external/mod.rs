// ============================================================================
// recast-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// This module encapsulates the external processes the transaction delegates
// to. Each one sits behind a trait so the transaction can be driven by mocks
// in tests.
//
// KEY COMPONENTS:
// - FfmpegSpawner / FfmpegProcess / DiagnosticLog: running ffmpeg and
//   keeping the tail of its warnings and errors
// - Transcoder / FfmpegTranscoder: the re-encode step
// - StreamProber / FfprobeProber: reading back stream parameters
// - check_dependency: verifying a tool is installed before a run

use crate::error::{CoreError, CoreResult, command_start_error};

use std::io;
use std::process::{Command, Stdio};

pub mod ffmpeg_process;
pub mod ffprobe_executor;
pub mod transcoder;

pub use ffmpeg_process::{DiagnosticLog, FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};
pub use ffprobe_executor::{FfprobeProber, StreamProber};
pub use transcoder::{FfmpegTranscoder, Transcoder, build_transcode_command};

/// Checks that an external command exists by running it with `-version`.
///
/// # Examples
///
/// ```rust,no_run
/// use recast_core::external::check_dependency;
///
/// match check_dependency("ffmpeg") {
///     Ok(()) => println!("ffmpeg is available"),
///     Err(e) => eprintln!("ffmpeg check failed: {}", e),
/// }
/// ```
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(command_start_error(cmd_name, e))
        }
    }
}
