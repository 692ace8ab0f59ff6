// ============================================================================
// recast-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: Human-readable presentation of transaction events
//
// One styled line per event on stdout. Colors are dropped automatically by
// `console` when stdout is not a terminal.

use console::style;
use recast_core::{Event, EventHandler, Stage, format_bytes, format_duration, size_change_percent};

/// Renders an event, or returns None for events with no terminal line.
pub fn render_event(event: &Event) -> Option<String> {
    let line = match event {
        Event::RunStarted { original, .. } => format!(
            "\n{}\n",
            style(format!("----- RE-ENCODING {} -----", original.display()))
                .cyan()
                .bold()
        ),
        Event::StageStarted { stage } => format!("  {} {}...", style("»").dim(), stage.action()),
        Event::Transition { to, .. } if *to != Stage::Committed => {
            format!("  {} {}", style("✓").green(), stage_done(*to))
        }
        Event::Transition { .. } => return None,
        Event::Failed { message, .. } => {
            format!("  {} {}", style("✗").red().bold(), style(message).red())
        }
        Event::RollbackStarted => format!("  {} Restoring original file...", style("»").dim()),
        Event::RolledBack => format!("  {} Original file restored", style("✓").yellow()),
        Event::RollbackFailed { message } => format!(
            "  {} {}",
            style("✗").red().bold(),
            style(format!("Rollback failed: {message}")).red().bold()
        ),
        Event::Warning { message } => format!("  {} {}", style("!").yellow().bold(), message),
        Event::RunCompleted {
            original,
            input_size,
            output_size,
            elapsed_secs,
        } => {
            let change = size_change_percent(*input_size, *output_size);
            format!(
                "  {} {}\n\n  {:<18} {}\n  {:<18} {}\n  {:<18} {}\n  {:<18} {}",
                style("✓").green().bold(),
                style(format!("Replaced {}", original.display())).bold(),
                "Input size:",
                format_bytes(*input_size),
                "Output size:",
                format_bytes(*output_size),
                "Size change:",
                format_change(change),
                "Time:",
                format_duration(*elapsed_secs),
            )
        }
    };
    Some(line)
}

fn stage_done(stage: Stage) -> &'static str {
    match stage {
        Stage::BackedUp => "Backup created",
        Stage::Transcoded => "Re-encode finished",
        Stage::Verified => "Technical parameters verified",
        Stage::Tagged => "Metadata updated",
        Stage::Start | Stage::Committed => "Done",
    }
}

/// Positive numbers are savings. Growth is shown in yellow.
fn format_change(percent: f64) -> String {
    if percent >= 0.0 {
        style(format!("-{percent:.1}%")).green().to_string()
    } else {
        style(format!("+{:.1}%", -percent)).yellow().to_string()
    }
}

#[derive(Debug, Default)]
pub struct TerminalEventHandler;

impl TerminalEventHandler {
    pub fn new() -> Self {
        Self
    }
}

impl EventHandler for TerminalEventHandler {
    fn handle(&self, event: &Event) {
        if let Some(line) = render_event(event) {
            println!("{line}");
        }
    }
}
