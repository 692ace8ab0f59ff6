//! Command implementations for the CLI.

/// Re-encodes one file in place through the core transaction.
pub mod reencode;
