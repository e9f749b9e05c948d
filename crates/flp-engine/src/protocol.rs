use std::cell::RefCell;
use std::io::{ErrorKind, Read, Write};
use std::rc::Rc;

use flp_line::{Clock, Label, LineBuffer, ERROR_PREFIX, OK_PAYLOAD};
use flp_registry::{
    tokenize, CommandRegistry, CommandSpec, ProtocolError, Result, StateValue,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::builtin::{Builtin, PROTOCOL_VERSION};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::responder::Responder;
use crate::shared::{self, Core, SharedCore};
use crate::state::StateCell;

const READ_CHUNK_SIZE: usize = 1024;

/// Line protocol engine.
///
/// Owns the input buffer and the command table. Output lines go to a single
/// sink shared with the engine's [`StateCell`]s and [`Responder`]s.
pub struct LineProtocol {
    buffer: LineBuffer,
    registry: CommandRegistry,
    core: SharedCore,
    config: EngineConfig,
    builtins: bool,
}

impl LineProtocol {
    /// Create an engine with default config writing to `output`.
    pub fn new(output: impl Write + 'static) -> Self {
        Self::with_config(output, EngineConfig::default())
    }

    /// Create an engine with explicit config.
    pub fn with_config(output: impl Write + 'static, config: EngineConfig) -> Self {
        let core = Core::new(Box::new(output), config.clock.build());
        Self {
            buffer: LineBuffer::with_config(config.line),
            registry: CommandRegistry::with_config(config.registry),
            core: Rc::new(RefCell::new(core)),
            config,
            builtins: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Append input bytes. Nothing is parsed until [`LineProtocol::process`].
    pub fn feed(&mut self, bytes: impl AsRef<[u8]>) {
        self.buffer.feed(bytes.as_ref());
    }

    /// Unconsumed input.
    pub fn buffer(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Discard unconsumed input, e.g. a partial line left by a closed stream.
    pub fn clear_buffer(&mut self) {
        if !self.buffer.is_empty() {
            debug!(bytes = self.buffer.len(), "discarding buffered input");
        }
        self.buffer.clear();
    }

    /// Replace the output sink. Later lines, including state reports, go to
    /// the new sink.
    pub fn set_output(&mut self, output: impl Write + 'static) {
        self.with_core(|core| core.set_output(Box::new(output)));
    }

    /// Replace the timestamp source.
    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.with_core(|core| core.set_clock(clock));
    }

    /// Dispatch at most one buffered line.
    ///
    /// Returns `Ok(false)` when no complete line is buffered, `Ok(true)` when
    /// a line was dispatched. A rejected line is acknowledged with its error
    /// and returned as `Err`; the engine stays usable.
    pub fn process(&mut self) -> Result<bool> {
        let Some(line) = self.buffer.extract() else {
            return Ok(false);
        };
        self.validate_apply(&line).map(|()| true)
    }

    /// Process buffered lines until none is complete. Returns the number of
    /// lines handled, failures included.
    pub fn drain(&mut self) -> usize {
        let mut handled = 0usize;
        loop {
            match self.process() {
                Ok(true) | Err(_) => handled += 1,
                Ok(false) => return handled,
            }
        }
    }

    /// Feed everything `reader` yields, processing lines as they complete,
    /// until end of input. Returns the number of lines handled.
    pub fn pump<R: Read>(&mut self, mut reader: R) -> crate::error::Result<usize> {
        let mut handled = 0usize;
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            let read = match reader.read(&mut chunk) {
                Ok(0) => return Ok(handled),
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(EngineError::Io(err)),
            };
            self.feed(&chunk[..read]);
            handled += self.drain();
        }
    }

    /// Validate and dispatch one command line, then acknowledge it.
    ///
    /// Nothing is applied unless the whole line validates. Setters run
    /// before the callback; the acknowledgement follows both.
    pub fn validate_apply(&mut self, line: &str) -> Result<()> {
        let Some(parsed) = tokenize(line) else {
            return Err(ProtocolError::InvalidArgument("empty command line".into()));
        };
        let qualifier = parsed.qualifier;

        match self.registry.dispatch(&parsed) {
            Ok(invocation) => {
                debug!(
                    qualifier,
                    matched = invocation.matched.len(),
                    unmatched = invocation.unmatched.len(),
                    "command dispatched"
                );
                match self.builtin(qualifier) {
                    Some(builtin) => {
                        let reply = self.builtin_reply(builtin);
                        self.respond(Label::Ack, qualifier, &reply);
                    }
                    None if self.config.acknowledge => {
                        self.respond(Label::Ack, qualifier, OK_PAYLOAD);
                    }
                    None => {}
                }
                Ok(())
            }
            Err(err) => {
                warn!(qualifier, kind = %err.kind(), error = %err, "command rejected");
                if self.config.acknowledge {
                    self.respond(Label::Ack, qualifier, &format!("{ERROR_PREFIX}{err}"));
                }
                if self.config.error_channel {
                    self.respond(Label::Error, qualifier, &err.to_string());
                }
                Err(err)
            }
        }
    }

    /// Register a command under `qualifier`. Fails if the name is taken.
    pub fn register_command(
        &mut self,
        qualifier: impl Into<String>,
        spec: CommandSpec,
    ) -> Result<()> {
        self.registry.register(qualifier, spec)
    }

    /// Register the `@flp.*` diagnostic commands. Registers none of them if
    /// any name is taken.
    pub fn register_internal_commands(&mut self) -> Result<()> {
        if let Some(taken) = Builtin::ALL
            .iter()
            .find(|builtin| self.registry.contains(builtin.qualifier()))
        {
            return Err(ProtocolError::InvalidArgument(format!(
                "command {} already registered",
                taken.qualifier()
            )));
        }
        for builtin in Builtin::ALL {
            self.registry
                .register(builtin.qualifier(), CommandSpec::new())?;
        }
        self.builtins = true;
        Ok(())
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Register a state starting at its type's default value.
    pub fn state<T: StateValue>(&self, name: &str) -> Result<StateCell<T>> {
        self.state_with(name, T::default())
    }

    /// Register a state with an initial value. Nothing is reported until the
    /// value is set or reported explicitly.
    pub fn state_with<T: StateValue>(&self, name: &str, initial: T) -> Result<StateCell<T>> {
        StateCell::register(&self.core, name, initial)
    }

    /// Remove a state registration. Idempotent; the cell stays usable but
    /// no longer appears in snapshots.
    pub fn unregister_state(&self, name: &str) -> bool {
        self.with_core(|core| core.states.remove(name))
            .unwrap_or(false)
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.with_core(|core| core.states.contains(name))
            .unwrap_or(false)
    }

    pub fn state_count(&self) -> usize {
        self.with_core(|core| core.states.len()).unwrap_or(0)
    }

    /// Handle for emitting lines from callbacks.
    pub fn responder(&self) -> Responder {
        Responder::new(Rc::downgrade(&self.core))
    }

    /// Emit one line on the output sink.
    pub fn respond(&self, label: Label, tag: &str, payload: &str) {
        shared::emit(&self.core, label, tag, payload);
    }

    /// Command table as reported by `@flp.registration`.
    pub fn registration(&self) -> Value {
        self.registry.describe()
    }

    /// State snapshot as reported by `@flp.state`.
    pub fn state_snapshot(&self) -> Value {
        self.with_core(|core| core.states.snapshot())
            .unwrap_or_else(|| Value::Object(Default::default()))
    }

    fn builtin(&self, qualifier: &str) -> Option<Builtin> {
        if !self.builtins {
            return None;
        }
        Builtin::from_qualifier(qualifier)
    }

    fn builtin_reply(&self, builtin: Builtin) -> String {
        match builtin {
            Builtin::Version => PROTOCOL_VERSION.to_string(),
            Builtin::BufferSize => self.buffer.len().to_string(),
            Builtin::Registration => self.registration().to_string(),
            Builtin::State => self.state_snapshot().to_string(),
        }
    }

    fn with_core<R>(&self, f: impl FnOnce(&mut Core) -> R) -> Option<R> {
        match self.core.try_borrow_mut() {
            Ok(mut core) => Some(f(&mut core)),
            Err(_) => {
                warn!("engine core already in use");
                None
            }
        }
    }
}

impl std::fmt::Debug for LineProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineProtocol")
            .field("buffered", &self.buffer.len())
            .field("commands", &self.registry.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
