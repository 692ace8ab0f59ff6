// ============================================================================
// recast-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for EncodingProfile
//
// Fluent construction of an EncodingProfile starting from the defaults, with
// validation at the end so an invalid profile never reaches the transcoder.

use super::EncodingProfile;
use crate::error::CoreResult;

/// Builder for creating EncodingProfile instances.
///
/// # Examples
///
/// ```rust
/// use recast_core::config::EncodingProfileBuilder;
///
/// let profile = EncodingProfileBuilder::new()
///     .crf(20)
///     .audio_bitrate("256k")
///     .faststart(false)
///     .build()
///     .unwrap();
/// assert_eq!(profile.crf, 20);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EncodingProfileBuilder {
    profile: EncodingProfile,
}

impl EncodingProfileBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing profile, e.g. one loaded from a file.
    #[must_use]
    pub fn from_profile(profile: EncodingProfile) -> Self {
        Self { profile }
    }

    #[must_use]
    pub fn video_encoder(mut self, encoder: impl Into<String>) -> Self {
        self.profile.video_encoder = encoder.into();
        self
    }

    #[must_use]
    pub fn video_codec_name(mut self, codec_name: impl Into<String>) -> Self {
        self.profile.video_codec_name = codec_name.into();
        self
    }

    #[must_use]
    pub fn pixel_format(mut self, pixel_format: impl Into<String>) -> Self {
        self.profile.pixel_format = pixel_format.into();
        self
    }

    #[must_use]
    pub fn color_standard(mut self, standard: impl Into<String>) -> Self {
        self.profile.color_standard = standard.into();
        self
    }

    #[must_use]
    pub fn crf(mut self, crf: u8) -> Self {
        self.profile.crf = crf;
        self
    }

    #[must_use]
    pub fn audio_codec(mut self, codec: impl Into<String>) -> Self {
        self.profile.audio_codec = codec.into();
        self
    }

    #[must_use]
    pub fn audio_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.profile.audio_bitrate = bitrate.into();
        self
    }

    #[must_use]
    pub fn faststart(mut self, enabled: bool) -> Self {
        self.profile.faststart = enabled;
        self
    }

    /// Validates and returns the profile.
    pub fn build(self) -> CoreResult<EncodingProfile> {
        self.profile.validate()?;
        Ok(self.profile)
    }
}
