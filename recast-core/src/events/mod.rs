//! Observer interface for the re-encode transaction.
//!
//! The transaction never prints. It emits an [`Event`] at every state
//! transition and consumers decide how to present them (terminal, JSON, tests).

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::transaction::Stage;

pub mod json_handler;

pub use json_handler::JsonEventHandler;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    RunStarted {
        original: PathBuf,
        temp: PathBuf,
        backup: PathBuf,
    },

    /// Work toward `stage` has begun.
    StageStarted { stage: Stage },

    /// The transaction moved from `from` to `to`.
    Transition { from: Stage, to: Stage },

    /// The step leading out of `stage` failed.
    Failed { stage: Stage, message: String },

    RollbackStarted,

    RolledBack,

    RollbackFailed { message: String },

    Warning { message: String },

    RunCompleted {
        original: PathBuf,
        input_size: u64,
        output_size: u64,
        elapsed_secs: f64,
    },
}

pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event);
}

pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn emit(&self, event: Event) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
