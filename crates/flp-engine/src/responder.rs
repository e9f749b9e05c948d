use std::cell::RefCell;
use std::rc::Weak;

use flp_line::Label;
use tracing::debug;

use crate::shared::{self, Core};

/// Handle for emitting lines on an engine's output from outside the
/// dispatch path, typically from inside a command callback.
///
/// Lines written after the engine is dropped are discarded.
#[derive(Clone)]
pub struct Responder {
    core: Weak<RefCell<Core>>,
}

impl Responder {
    pub(crate) fn new(core: Weak<RefCell<Core>>) -> Self {
        Self { core }
    }

    /// Emit one line.
    pub fn respond(&self, label: Label, tag: &str, payload: &str) {
        match self.core.upgrade() {
            Some(core) => shared::emit(&core, label, tag, payload),
            None => debug!(tag, "engine gone, response discarded"),
        }
    }

    /// Emit an `R` line.
    pub fn report(&self, tag: &str, payload: &str) {
        self.respond(Label::Report, tag, payload);
    }

    /// Whether the engine is still alive.
    pub fn is_connected(&self) -> bool {
        self.core.strong_count() > 0
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("connected", &self.is_connected())
            .finish()
    }
}
