//! FFprobe integration for reading back stream parameters
//!
//! The verifier only needs a handful of entries from the first video stream,
//! so ffprobe is asked for exactly those in its flat `key=value` output format
//! instead of the full JSON document.

use crate::error::{CoreResult, command_failed_error, command_start_error};
use std::path::Path;
use std::process::Command;

/// Reads named parameters of the first video stream of a file.
pub trait StreamProber {
    /// Returns the raw probe output: one `key=value` line per entry.
    fn probe_video_stream(&self, path: &Path, entries: &[&str]) -> CoreResult<String>;
}

/// [`StreamProber`] backed by the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    program: String,
}

impl FfprobeProber {
    pub fn new() -> Self {
        Self {
            program: "ffprobe".to_string(),
        }
    }

    /// Uses a specific ffprobe binary instead of the one on `PATH`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn build_command(&self, path: &Path, entries: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-v", "error"])
            .args(["-select_streams", "v:0"])
            .arg("-show_entries")
            .arg(format!("stream={}", entries.join(",")))
            .args(["-of", "default=noprint_wrappers=1"])
            .arg(path);
        cmd
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamProber for FfprobeProber {
    fn probe_video_stream(&self, path: &Path, entries: &[&str]) -> CoreResult<String> {
        let mut cmd = self.build_command(path, entries);
        log::debug!("Running ffprobe: {:?}", cmd);

        let output = cmd
            .output()
            .map_err(|e| command_start_error(self.program.as_str(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            log::error!(
                "ffprobe failed for {} with exit code {}: {}",
                path.display(),
                output.status.code().unwrap_or(-1),
                stderr
            );
            return Err(command_failed_error(
                format!("{} ({})", self.program, path.display()),
                output.status,
                stderr,
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
