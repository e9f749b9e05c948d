use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use flp_line::{Clock, Label, ResponseWriter};
use tracing::warn;

use crate::state::StateTable;

/// Engine state reachable from state cells and responders.
pub(crate) struct Core {
    pub(crate) states: StateTable,
    writer: ResponseWriter<Box<dyn Write>>,
}

pub(crate) type SharedCore = Rc<RefCell<Core>>;

impl Core {
    pub(crate) fn new(output: Box<dyn Write>, clock: Box<dyn Clock>) -> Self {
        Self {
            states: StateTable::default(),
            writer: ResponseWriter::with_clock(output, clock),
        }
    }

    /// Write one line. Sink failures are logged and otherwise ignored.
    pub(crate) fn emit(&mut self, label: Label, tag: &str, payload: &str) {
        if let Err(err) = self.writer.respond(label, tag, payload) {
            warn!(label = label.name(), tag, error = %err, "failed to write response");
        }
    }

    pub(crate) fn set_output(&mut self, output: Box<dyn Write>) {
        if let Err(err) = self.writer.flush() {
            warn!(error = %err, "failed to flush previous output");
        }
        self.writer.replace_inner(output);
    }

    pub(crate) fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.writer.set_clock(clock);
    }
}

/// Emit through a shared core without panicking if it is already borrowed.
pub(crate) fn emit(core: &RefCell<Core>, label: Label, tag: &str, payload: &str) {
    match core.try_borrow_mut() {
        Ok(mut core) => core.emit(label, tag, payload),
        Err(_) => warn!(label = label.name(), tag, "response dropped: output in use"),
    }
}
