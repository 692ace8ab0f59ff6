// recast-cli/src/main.rs
//
// Entry point for the `recast` binary: parse arguments, set up logging, run
// the re-encode and turn the result into an exit code.

use clap::Parser;
use recast_cli::error::{EXIT_SUCCESS, exit_code_for, recovery_hint};
use recast_cli::logging::init_logging;
use recast_cli::{Cli, run_reencode};

use std::process;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run_reencode(&cli) {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(hint) = recovery_hint(&e) {
                eprintln!("{hint}");
            }
            exit_code_for(&e)
        }
    };
    process::exit(code);
}
