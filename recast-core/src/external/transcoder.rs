//! FFmpeg command building and execution for the re-encode step
//!
//! The command is derived entirely from the [`EncodingProfile`]: video encoder,
//! pixel format, one color standard forced onto primaries/transfer/matrix,
//! CRF, audio re-encode and the fast-start flag. The output is always
//! overwritten.

use crate::config::EncodingProfile;
use crate::error::{CoreError, CoreResult};
use crate::external::ffmpeg_process::{DiagnosticLog, FfmpegProcess, FfmpegSpawner, SidecarSpawner};

use ffmpeg_sidecar::command::FfmpegCommand;
use log::{debug, error, info};

use std::path::Path;

/// Re-encodes `input` into `output` according to a profile.
pub trait Transcoder {
    fn transcode(&self, input: &Path, output: &Path, profile: &EncodingProfile) -> CoreResult<()>;
}

/// Builds the ffmpeg command for a single re-encode.
pub fn build_transcode_command(input: &Path, output: &Path, profile: &EncodingProfile) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.input(input.to_string_lossy().as_ref());

    cmd.args(["-c:v", profile.video_encoder.as_str()]);
    cmd.args(["-pix_fmt", profile.pixel_format.as_str()]);
    cmd.args(["-color_primaries", profile.color_standard.as_str()]);
    cmd.args(["-color_trc", profile.color_standard.as_str()]);
    cmd.args(["-colorspace", profile.color_standard.as_str()]);
    cmd.args(["-crf", &profile.crf.to_string()]);

    cmd.args(["-c:a", profile.audio_codec.as_str()]);
    cmd.args(["-b:a", profile.audio_bitrate.as_str()]);

    if profile.faststart {
        cmd.args(["-movflags", "+faststart"]);
    }

    cmd.arg("-y");
    cmd.output(output.to_string_lossy().as_ref());
    cmd
}

/// Production transcoder driving ffmpeg through an [`FfmpegSpawner`].
#[derive(Debug, Clone, Default)]
pub struct FfmpegTranscoder<S: FfmpegSpawner = SidecarSpawner> {
    spawner: S,
}

impl<S: FfmpegSpawner> FfmpegTranscoder<S> {
    pub fn new(spawner: S) -> Self {
        Self { spawner }
    }
}

impl<S: FfmpegSpawner> Transcoder for FfmpegTranscoder<S> {
    fn transcode(&self, input: &Path, output: &Path, profile: &EncodingProfile) -> CoreResult<()> {
        info!(
            "Starting transcode: {} -> {}",
            input.display(),
            output.display()
        );

        let mut cmd = build_transcode_command(input, output, profile);
        debug!("FFmpeg command: {:?}", cmd.as_inner());

        let mut process = self.spawner.spawn(cmd)?;

        let mut diagnostics = DiagnosticLog::new();
        let status = process.run_to_exit(&mut diagnostics)?;
        if !status.success() {
            let diagnostics = diagnostics.into_text();
            error!("ffmpeg exited with {status}: {diagnostics}");
            return Err(CoreError::Transcode {
                status,
                diagnostics,
            });
        }

        info!("Transcode finished: {}", output.display());
        Ok(())
    }
}
