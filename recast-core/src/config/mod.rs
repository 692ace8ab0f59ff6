//! Encoding profile and defaults for the re-encode transaction.
//!
//! The profile fully determines the ffmpeg command the transcoder builds and
//! the stream parameters the verifier expects back. It is created once by the
//! consumer (usually recast-cli) and shared immutably for the whole run.

mod builder;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

pub use builder::EncodingProfileBuilder;

// Default constants

/// ffmpeg encoder used for the video stream.
pub const DEFAULT_VIDEO_ENCODER: &str = "libx265";

/// Codec name ffprobe reports for streams produced by `DEFAULT_VIDEO_ENCODER`.
pub const DEFAULT_VIDEO_CODEC_NAME: &str = "hevc";

/// 4:2:2 chroma subsampling at 10 bits per component.
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv422p10le";

/// Applied to color primaries, transfer characteristics and matrix alike.
pub const DEFAULT_COLOR_STANDARD: &str = "bt709";

/// Default CRF quality value. Lower values produce higher quality but larger files.
pub const DEFAULT_CRF: u8 = 23;

/// Highest CRF accepted by libx265.
pub const MAX_CRF: u8 = 51;

/// CRF range that gives sensible results for 4:2:2 10-bit HEVC.
pub const RECOMMENDED_CRF_RANGE: std::ops::RangeInclusive<u8> = 18..=28;

pub const DEFAULT_AUDIO_CODEC: &str = "aac";

pub const DEFAULT_AUDIO_BITRATE: &str = "192k";

/// Target output characteristics for a single re-encode.
///
/// # Examples
///
/// ```rust
/// use recast_core::config::EncodingProfile;
///
/// let profile = EncodingProfile::default();
/// assert_eq!(profile.video_encoder, "libx265");
/// assert_eq!(profile.crf, 23);
/// profile.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingProfile {
    /// ffmpeg video encoder (`-c:v`)
    pub video_encoder: String,

    /// Codec name the produced stream must report when probed
    pub video_codec_name: String,

    /// Output pixel format (`-pix_fmt`)
    pub pixel_format: String,

    /// Single standard forced onto primaries, transfer and colorspace.
    /// Source color metadata is normalized to this value, not preserved.
    pub color_standard: String,

    /// Constant rate factor (`-crf`)
    pub crf: u8,

    /// Audio encoder (`-c:a`)
    pub audio_codec: String,

    /// Audio bitrate (`-b:a`), e.g. "192k"
    pub audio_bitrate: String,

    /// Move the moov atom to the front of the file for streaming
    pub faststart: bool,
}

impl Default for EncodingProfile {
    fn default() -> Self {
        Self {
            video_encoder: DEFAULT_VIDEO_ENCODER.to_string(),
            video_codec_name: DEFAULT_VIDEO_CODEC_NAME.to_string(),
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            color_standard: DEFAULT_COLOR_STANDARD.to_string(),
            crf: DEFAULT_CRF,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            faststart: true,
        }
    }
}

impl EncodingProfile {
    /// Checks the profile for values ffmpeg would reject or that make the
    /// transcode/verify pair meaningless.
    pub fn validate(&self) -> CoreResult<()> {
        let required = [
            ("video_encoder", &self.video_encoder),
            ("video_codec_name", &self.video_codec_name),
            ("pixel_format", &self.pixel_format),
            ("color_standard", &self.color_standard),
            ("audio_codec", &self.audio_codec),
            ("audio_bitrate", &self.audio_bitrate),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(CoreError::Config(format!("{name} must not be empty")));
            }
        }

        if self.crf > MAX_CRF {
            return Err(CoreError::Config(format!(
                "crf must be between 0 and {MAX_CRF}, got {}",
                self.crf
            )));
        }
        if !RECOMMENDED_CRF_RANGE.contains(&self.crf) {
            log::warn!(
                "CRF {} is outside the recommended range {}-{}",
                self.crf,
                RECOMMENDED_CRF_RANGE.start(),
                RECOMMENDED_CRF_RANGE.end()
            );
        }

        if !is_valid_bitrate(&self.audio_bitrate) {
            return Err(CoreError::Config(format!(
                "audio_bitrate '{}' is not a bitrate like '192k'",
                self.audio_bitrate
            )));
        }

        Ok(())
    }

    /// Loads a profile from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let profile: Self = serde_json::from_str(json)
            .map_err(|e| CoreError::Config(format!("invalid profile JSON: {e}")))?;
        profile.validate()?;
        Ok(profile)
    }
}

/// Accepts plain digits with an optional k/K/M suffix ("192k", "128000", "1M").
fn is_valid_bitrate(bitrate: &str) -> bool {
    let digits = bitrate.trim_end_matches(['k', 'K', 'm', 'M']);
    let suffix_len = bitrate.len() - digits.len();
    !digits.is_empty() && suffix_len <= 1 && digits.chars().all(|c| c.is_ascii_digit())
}
