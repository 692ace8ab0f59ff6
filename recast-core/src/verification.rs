//! Post-transcode verification of stream parameters
//!
//! The produced file is probed for the five technical video parameters that
//! define a compliant output (codec, pixel format and the three color
//! characteristics). The first mismatch in probe output order fails the
//! check; audio and container-level flags are not inspected.

use crate::config::EncodingProfile;
use crate::error::{CoreError, CoreResult, MISSING_VALUE};
use crate::external::StreamProber;

use std::path::Path;

/// Ordered mapping from ffprobe stream entry name to the value it must have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedProfile {
    entries: Vec<(String, String)>,
}

impl ExpectedProfile {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds or replaces the required value for `param`.
    #[must_use]
    pub fn with(mut self, param: impl Into<String>, value: impl Into<String>) -> Self {
        let param = param.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == param) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((param, value)),
        }
        self
    }

    /// The parameters a file produced with `profile` must report.
    pub fn from_profile(profile: &EncodingProfile) -> Self {
        Self::new()
            .with("codec_name", &profile.video_codec_name)
            .with("pix_fmt", &profile.pixel_format)
            .with("color_space", &profile.color_standard)
            .with("color_primaries", &profile.color_standard)
            .with("color_transfer", &profile.color_standard)
    }

    pub fn get(&self, param: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == param)
            .map(|(_, value)| value.as_str())
    }

    pub fn param_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ExpectedProfile {
    fn default() -> Self {
        Self::from_profile(&EncodingProfile::default())
    }
}

/// Checks `key=value` probe output against the expected profile.
///
/// Lines without `=` and keys that are not tracked are ignored. The first
/// tracked key whose value differs is reported. A tracked key that never
/// appears is reported as missing once every line has been scanned.
pub fn check_probe_output(output: &str, expected: &ExpectedProfile) -> CoreResult<()> {
    let mut seen: Vec<&str> = Vec::new();

    for line in output.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        let Some(required) = expected.get(key) else {
            continue;
        };
        if value != required {
            return Err(CoreError::Verification {
                param: key.to_string(),
                actual: value.to_string(),
                expected: required.to_string(),
            });
        }
        seen.push(key);
    }

    if let Some((param, required)) = expected
        .entries
        .iter()
        .find(|(name, _)| !seen.contains(&name.as_str()))
    {
        return Err(CoreError::Verification {
            param: param.clone(),
            actual: MISSING_VALUE.to_string(),
            expected: required.clone(),
        });
    }

    Ok(())
}

/// Probes a file and checks it against an [`ExpectedProfile`].
pub struct Verifier<P: StreamProber> {
    prober: P,
    expected: ExpectedProfile,
}

impl<P: StreamProber> Verifier<P> {
    pub fn new(prober: P, expected: ExpectedProfile) -> Self {
        Self { prober, expected }
    }

    pub fn expected(&self) -> &ExpectedProfile {
        &self.expected
    }

    pub fn into_prober(self) -> P {
        self.prober
    }

    pub fn verify(&self, path: &Path) -> CoreResult<()> {
        log::info!("Verifying technical parameters of {}", path.display());

        let output = self
            .prober
            .probe_video_stream(path, &self.expected.param_names())?;
        log::debug!("Probe report for {}:\n{}", path.display(), output.trim_end());

        check_probe_output(&output, &self.expected)?;

        log::info!("Verification passed for {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const COMPLIANT: &str = "codec_name=hevc\n\
                             pix_fmt=yuv422p10le\n\
                             color_space=bt709\n\
                             color_transfer=bt709\n\
                             color_primaries=bt709\n";

    fn verification_error(result: CoreResult<()>) -> (String, String, String) {
        match result {
            Err(CoreError::Verification {
                param,
                actual,
                expected,
            }) => (param, actual, expected),
            other => panic!("expected verification error, got {other:?}"),
        }
    }

    #[test]
    fn compliant_output_passes() {
        check_probe_output(COMPLIANT, &ExpectedProfile::default()).unwrap();
    }

    #[test]
    fn first_mismatch_in_output_order_is_reported() {
        let output = "codec_name=hevc\n\
                      pix_fmt=yuv420p\n\
                      color_space=bt601\n\
                      color_transfer=bt709\n\
                      color_primaries=bt709\n";

        let (param, actual, expected) =
            verification_error(check_probe_output(output, &ExpectedProfile::default()));
        assert_eq!(param, "pix_fmt");
        assert_eq!(actual, "yuv420p");
        assert_eq!(expected, "yuv422p10le");
    }

    #[test]
    fn output_order_wins_over_expected_order() {
        let output = "color_primaries=bt470bg\ncodec_name=h264\npix_fmt=yuv422p10le\n";
        let (param, actual, _) =
            verification_error(check_probe_output(output, &ExpectedProfile::default()));
        assert_eq!(param, "color_primaries");
        assert_eq!(actual, "bt470bg");
    }

    #[test]
    fn untracked_keys_and_plain_lines_are_ignored() {
        let output = format!("[STREAM]\nwidth=3840\nsome noise\n{COMPLIANT}profile=Main 4:2:2 10\n");
        check_probe_output(&output, &ExpectedProfile::default()).unwrap();
    }

    #[test]
    fn whitespace_and_crlf_are_trimmed() {
        let output = COMPLIANT.replace('\n', "\r\n").replace("pix_fmt=", " pix_fmt = ");
        check_probe_output(&output, &ExpectedProfile::default()).unwrap();
    }

    #[test]
    fn value_may_contain_equals_sign() {
        let expected = ExpectedProfile::new().with("codec_tag_string", "a=b");
        check_probe_output("codec_tag_string=a=b\n", &expected).unwrap();
    }

    #[test]
    fn absent_parameter_is_reported_as_missing() {
        let output = COMPLIANT.replace("color_transfer=bt709\n", "");
        let (param, actual, expected) =
            verification_error(check_probe_output(&output, &ExpectedProfile::default()));
        assert_eq!(param, "color_transfer");
        assert_eq!(actual, MISSING_VALUE);
        assert_eq!(expected, "bt709");
    }

    #[test]
    fn expected_profile_follows_encoding_profile() {
        let profile = EncodingProfile {
            video_codec_name: "h264".to_string(),
            pixel_format: "yuv420p".to_string(),
            color_standard: "bt2020".to_string(),
            ..Default::default()
        };
        let expected = ExpectedProfile::from_profile(&profile);
        assert_eq!(
            expected.param_names(),
            vec!["codec_name", "pix_fmt", "color_space", "color_primaries", "color_transfer"]
        );
        assert_eq!(expected.get("pix_fmt"), Some("yuv420p"));
        assert_eq!(expected.get("color_transfer"), Some("bt2020"));
        assert_eq!(expected.get("width"), None);
    }

    #[test]
    fn with_replaces_existing_entry() {
        let expected = ExpectedProfile::default().with("pix_fmt", "yuv444p10le");
        assert_eq!(expected.param_names().len(), 5);
        assert_eq!(expected.get("pix_fmt"), Some("yuv444p10le"));
    }

    struct CannedProber {
        output: String,
        requested: RefCell<Vec<String>>,
    }

    impl StreamProber for CannedProber {
        fn probe_video_stream(&self, _path: &Path, entries: &[&str]) -> CoreResult<String> {
            self.requested
                .borrow_mut()
                .extend(entries.iter().map(|e| e.to_string()));
            Ok(self.output.clone())
        }
    }

    #[test]
    fn verifier_requests_exactly_the_tracked_entries() {
        let prober = CannedProber {
            output: COMPLIANT.to_string(),
            requested: RefCell::new(Vec::new()),
        };
        let verifier = Verifier::new(prober, ExpectedProfile::default());

        verifier.verify(Path::new("TEMP_REENCODED.mp4")).unwrap();

        assert_eq!(
            *verifier.prober.requested.borrow(),
            vec!["codec_name", "pix_fmt", "color_space", "color_primaries", "color_transfer"]
        );
    }
}
