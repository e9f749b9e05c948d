//! Line-oriented command and state synchronization for devices.
//!
//! A host drives a device by sending `qualifier name=value ...` lines over any
//! byte stream. The device validates each line against registered command
//! descriptors, applies it, and answers with one acknowledgement line. State
//! changes are reported on the same stream as they happen.
//!
//! # Crate Structure
//!
//! - [`transport`]: Unix domain socket listener and stream
//! - [`line`]: Line buffering, response line encoding and decoding
//! - [`registry`]: Command and argument descriptors, value validation
//! - [`engine`]: The protocol engine and state cells
//! - [`device`]: A simulated device used by the CLI (behind `device` feature)
//!
//! ```no_run
//! use flp::engine::{ArgumentSpec, CommandSpec, LineProtocol, Slot};
//!
//! let mut protocol = LineProtocol::new(std::io::stdout());
//! protocol.register_internal_commands()?;
//!
//! let speed = Slot::new(0.0f32);
//! protocol.register_command(
//!     "fan.set",
//!     CommandSpec::new().argument("speed", ArgumentSpec::bind(&speed).required()),
//! )?;
//!
//! protocol.feed("fan.set speed=0.5\n");
//! protocol.process()?;
//! # Ok::<(), flp::engine::ProtocolError>(())
//! ```

/// Re-export transport types.
pub mod transport {
    pub use flp_transport::*;
}

/// Re-export line types.
pub mod line {
    pub use flp_line::*;
}

/// Re-export registry types.
pub mod registry {
    pub use flp_registry::*;
}

/// Re-export engine types.
pub mod engine {
    pub use flp_engine::*;
}

/// Simulated device (requires `device` feature).
#[cfg(feature = "device")]
pub mod device;

pub use flp_engine::{EngineConfig, LineProtocol, Responder, StateCell};
