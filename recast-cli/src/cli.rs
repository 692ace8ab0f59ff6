// recast-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::Parser;
use recast_core::config::MAX_CRF;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Recast: verified in-place video re-encoding",
    long_about = "Re-encodes a single video file to HEVC 4:2:2 10-bit BT.709, verifies the \
                  result with ffprobe, writes MP4 metadata tags and swaps it in for the \
                  original. Any failure before the swap restores the original.\n\n\
                  Do not run two instances against the same file at the same time."
)]
pub struct Cli {
    #[command(flatten)]
    pub reencode: ReencodeArgs,

    /// Print events as JSON lines on stdout instead of styled output
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ReencodeArgs {
    /// Video file to re-encode in place
    #[arg(required = true, value_name = "FILE")]
    pub original: PathBuf,

    /// Optional: Path for the transcoder output (defaults to TEMP_REENCODED.mp4 next to FILE)
    #[arg(long, value_name = "PATH")]
    pub temp: Option<PathBuf>,

    /// Optional: Path for the backup of FILE (defaults to FILE.bak)
    #[arg(long, value_name = "PATH")]
    pub backup: Option<PathBuf>,

    // --- Encoding Profile ---
    /// Optional: JSON file with an encoding profile; flags below override it
    #[arg(long, value_name = "PROFILE_JSON")]
    pub profile: Option<PathBuf>,

    /// Optional: Override the CRF quality factor (0-51, lower is better quality)
    #[arg(
        long,
        value_name = "CRF",
        env = "RECAST_CRF",
        value_parser = clap::value_parser!(u8).range(0..=(MAX_CRF as i64))
    )]
    pub crf: Option<u8>,

    /// Optional: Override the audio bitrate (e.g. 192k)
    #[arg(long, value_name = "BITRATE")]
    pub audio_bitrate: Option<String>,

    /// Do not move the moov atom to the front of the file
    #[arg(long, default_value_t = false)]
    pub no_faststart: bool,
}
