//! JSON event handler for structured output
//!
//! Writes one JSON object per event, one per line, so wrapper scripts can
//! follow a run without parsing human-readable text.

use super::{Event, EventHandler};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Event handler that outputs events as JSON lines to stdout
pub struct JsonEventHandler {
    output: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventHandler {
    pub fn new() -> Self {
        Self {
            output: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a handler with a custom writer
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            output: Mutex::new(writer),
        }
    }

    fn get_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_json(&self, value: serde_json::Value) {
        if let Ok(mut output) = self.output.lock() {
            if let Ok(json_str) = serde_json::to_string(&value) {
                let _ = writeln!(output, "{}", json_str);
                let _ = output.flush();
            }
        }
    }
}

impl Default for JsonEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for JsonEventHandler {
    fn handle(&self, event: &Event) {
        let mut value = match serde_json::to_value(event) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to serialize event {:?}: {}", event, e);
                return;
            }
        };
        if let Some(object) = value.as_object_mut() {
            object.insert("timestamp".to_string(), Self::get_timestamp().into());
        }
        self.write_json(value);
    }
}
