// ============================================================================
// recast-cli/src/logging.rs
// ============================================================================
//
// LOGGING: env_logger setup for the CLI
//
// Log lines go to stderr so that stdout stays free for event output
// (styled lines or JSON). The level comes from `--verbose` or RUST_LOG:
// - RUST_LOG=info (default): stage progress
// - RUST_LOG=debug: ffmpeg/ffprobe command lines and probe reports

use console::style;
use log::{Level, LevelFilter};
use std::io::Write;

/// Returns the current local time formatted for log lines.
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Initializes the global logger. `verbose` forces debug level.
pub fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }

    builder
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => style("ERROR").red().bold(),
                Level::Warn => style("WARN ").yellow(),
                Level::Info => style("INFO ").green(),
                Level::Debug => style("DEBUG").blue(),
                Level::Trace => style("TRACE").magenta(),
            };
            writeln!(
                buf,
                "{} {} {}",
                style(get_timestamp()).dim(),
                level,
                record.args()
            )
        })
        .init();
}
