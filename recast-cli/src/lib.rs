// recast-cli/src/lib.rs
//
// Library portion of the Recast CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, ReencodeArgs};
pub use commands::reencode::run_reencode;
