//! Command registry and argument validation for the flp line protocol.
//!
//! A command line is `qualifier [name=value ...]`. This crate turns such a
//! line into a validated invocation: tokens are classified as integer or
//! real values, checked against the command's argument descriptors, and only
//! then written through the descriptors' setters.

pub mod argument;
pub mod command;
pub mod config;
pub mod error;
pub mod numeric;
pub mod parse;
pub mod registry;
pub mod slot;

pub use argument::{ArgumentKind, ArgumentSpec};
pub use command::{ArgumentValues, CommandCallback, CommandSpec, Invocation};
pub use config::RegistryConfig;
pub use error::{ErrorKind, ProtocolError, Result};
pub use numeric::{Numeric, NumericKind, StateValue};
pub use parse::{parse_argument, parse_value, tokenize, ArgumentToken, ParsedLine, ParsedValue};
pub use registry::CommandRegistry;
pub use slot::Slot;
