//! The flp line protocol engine.
//!
//! [`LineProtocol`] buffers incoming bytes, dispatches one command line per
//! [`LineProtocol::process`] call and acknowledges every line on its output
//! sink. [`StateCell`] handles report device state changes on the same sink
//! and unregister themselves when dropped.

pub mod builtin;
pub mod config;
pub mod error;
pub mod protocol;
pub mod responder;
mod shared;
pub mod state;

pub use builtin::{Builtin, PROTOCOL_VERSION};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use protocol::LineProtocol;
pub use responder::Responder;
pub use state::StateCell;

pub use flp_line::{Clock, ClockKind, Label, LineConfig};
pub use flp_registry::{
    ArgumentKind, ArgumentSpec, ArgumentValues, CommandSpec, ErrorKind, Invocation, Numeric,
    NumericKind, ProtocolError, RegistryConfig, Slot, StateValue,
};
