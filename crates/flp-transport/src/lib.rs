//! Byte-stream transports for the flp line protocol.
//!
//! The protocol engine itself never touches I/O: it is fed arbitrary byte
//! chunks and writes complete text lines to a sink. This crate provides the
//! stream plumbing a host or a device simulator uses around it:
//! - Unix domain sockets (Linux/macOS) via [`UnixDomainSocket`]
//! - [`DeviceStream`], a connected `Read + Write` stream with timeouts
//!
//! Serial ports and stdio are plain `Read`/`Write` values and need nothing
//! from this crate.

pub mod error;
pub mod stream;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use stream::DeviceStream;

#[cfg(unix)]
pub use uds::UnixDomainSocket;
