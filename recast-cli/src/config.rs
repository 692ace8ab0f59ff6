// recast-cli/src/config.rs
//
// Turns CLI arguments into the encoding profile and path layout for a run.

use crate::cli::ReencodeArgs;

use anyhow::{Context, Result};
use recast_core::{EncodingProfile, EncodingProfileBuilder, TransactionPaths};

use std::fs;

/// Loads `--profile` (or the defaults) and applies flag/env overrides on top.
pub fn load_profile(args: &ReencodeArgs) -> Result<EncodingProfile> {
    let base = match &args.profile {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read profile '{}'", path.display()))?;
            EncodingProfile::from_json(&json)
                .with_context(|| format!("Invalid profile '{}'", path.display()))?
        }
        None => EncodingProfile::default(),
    };

    let mut builder = EncodingProfileBuilder::from_profile(base);
    if let Some(crf) = args.crf {
        builder = builder.crf(crf);
    }
    if let Some(bitrate) = &args.audio_bitrate {
        builder = builder.audio_bitrate(bitrate.clone());
    }
    if args.no_faststart {
        builder = builder.faststart(false);
    }

    Ok(builder.build()?)
}

pub fn transaction_paths(args: &ReencodeArgs) -> TransactionPaths {
    let mut paths = TransactionPaths::for_original(&args.original);
    if let Some(temp) = &args.temp {
        paths = paths.with_temp(temp);
    }
    if let Some(backup) = &args.backup {
        paths = paths.with_backup(backup);
    }
    paths
}
