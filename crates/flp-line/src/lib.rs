//! Line buffering and response encoding for the flp line protocol.
//!
//! Input side: a [`LineBuffer`] accepts arbitrarily fragmented bytes and
//! hands out one complete, non-blank, delimiter-terminated line at a time.
//!
//! Output side: every event is one text line
//!
//! ```text
//! <label>(<timestamp>) <tag>: <payload>\n
//! ```
//!
//! where the label is `_` for a command acknowledgement and `R` for an
//! asynchronous state report.

pub mod buffer;
pub mod clock;
pub mod codec;
pub mod error;
pub mod label;
pub mod reader;
pub mod writer;

pub use buffer::{LineBuffer, LineConfig, DEFAULT_DELIMITER, DEFAULT_INITIAL_CAPACITY};
pub use clock::{Clock, ClockKind, FixedClock, MonotonicClock, SystemClock};
pub use codec::{encode_response, Response, ERROR_PREFIX, OK_PAYLOAD};
pub use error::{LineError, Result};
pub use label::Label;
pub use reader::LineReader;
pub use writer::ResponseWriter;
