//! Implementation of the re-encode run.
//!
//! Checks that ffmpeg and ffprobe are installed, builds the profile and path
//! layout from the arguments, wires up event presentation and hands over to
//! the core transaction.

use crate::cli::Cli;
use crate::config::{load_profile, transaction_paths};
use crate::terminal::TerminalEventHandler;

use anyhow::{Context, Result};
use log::{debug, info};
use recast_core::{
    EventDispatcher, JsonEventHandler, RunOutcome, check_dependency, default_transaction,
};

use std::sync::Arc;

/// External tools a run needs.
const REQUIRED_TOOLS: [&str; 2] = ["ffmpeg", "ffprobe"];

pub fn run_reencode(cli: &Cli) -> Result<RunOutcome> {
    for tool in REQUIRED_TOOLS {
        check_dependency(tool)?;
    }

    let profile = load_profile(&cli.reencode)?;
    let paths = transaction_paths(&cli.reencode);
    debug!("Encoding profile: {:?}", profile);
    debug!("Transaction paths: {:?}", paths);

    let mut events = EventDispatcher::new();
    if cli.json {
        events.add_handler(Arc::new(JsonEventHandler::new()));
    } else {
        events.add_handler(Arc::new(TerminalEventHandler::new()));
    }

    info!("Re-encoding {}", paths.original.display());
    let outcome = default_transaction(profile)
        .run(&paths, &events)
        .with_context(|| format!("Re-encode of '{}' failed", paths.original.display()))?;

    if outcome.backup_retained {
        info!("Backup kept at {}", paths.backup.display());
    }
    Ok(outcome)
}
