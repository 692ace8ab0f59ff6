//! The ffmpeg process seam used by the transcoder.
//!
//! A spawned ffmpeg is run to completion in one call: its event stream is
//! drained into a [`DiagnosticLog`] and then its exit status is collected.
//! Only warnings and errors are kept, and only the most recent ones, so a
//! failed re-encode can report why without holding the whole stderr.

use crate::error::{CoreResult, command_failed_error, command_start_error};

use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};

use std::collections::VecDeque;
use std::process::ExitStatus;

/// Number of ffmpeg diagnostic lines kept for the error report.
pub const MAX_DIAGNOSTIC_LINES: usize = 20;

/// Bounded tail of ffmpeg's warning and error output.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    lines: VecDeque<String>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `event` if it carries a warning or an error.
    pub fn observe(&mut self, event: FfmpegEvent) {
        let line = match event {
            FfmpegEvent::Error(message) => message,
            FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal | LogLevel::Warning, message) => {
                message
            }
            _ => return,
        };
        log::debug!("ffmpeg: {line}");
        if self.lines.len() == MAX_DIAGNOSTIC_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The kept lines, oldest first, one per line.
    pub fn into_text(self) -> String {
        Vec::from(self.lines).join("\n")
    }
}

/// A running ffmpeg.
pub trait FfmpegProcess {
    /// Drains every event into `diagnostics`, then waits for exit.
    fn run_to_exit(&mut self, diagnostics: &mut DiagnosticLog) -> CoreResult<ExitStatus>;
}

/// Starts ffmpeg for a built command.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

/// [`FfmpegProcess`] over an ffmpeg-sidecar child.
pub struct SidecarProcess(FfmpegChild);

impl FfmpegProcess for SidecarProcess {
    fn run_to_exit(&mut self, diagnostics: &mut DiagnosticLog) -> CoreResult<ExitStatus> {
        // The event stream must be exhausted before waiting or stderr can block.
        let events = self.0.iter().map_err(|e| {
            command_failed_error("ffmpeg (event stream)", ExitStatus::default(), e.to_string())
        })?;
        for event in events {
            diagnostics.observe(event);
        }
        self.0.wait().map_err(|e| command_start_error("ffmpeg (wait)", e))
    }
}

/// Production [`FfmpegSpawner`] backed by ffmpeg-sidecar.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg", e))
    }
}
