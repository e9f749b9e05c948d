use std::io::{ErrorKind, Read};

use crate::buffer::{LineBuffer, LineConfig};
use crate::codec::Response;
use crate::error::{LineError, Result};

const READ_CHUNK_SIZE: usize = 1024;

/// Reads complete lines from any `Read` stream.
///
/// Handles partial reads internally; callers always get whole lines.
/// Blank lines are skipped, as on the device side.
pub struct LineReader<T> {
    inner: T,
    buffer: LineBuffer,
}

impl<T: Read> LineReader<T> {
    /// Create a reader with default line configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, LineConfig::default())
    }

    /// Create a reader with explicit line configuration.
    pub fn with_config(inner: T, config: LineConfig) -> Self {
        Self {
            inner,
            buffer: LineBuffer::with_config(config),
        }
    }

    /// Read the next complete line (blocking).
    ///
    /// Returns `Err(LineError::ConnectionClosed)` on EOF. Read timeouts on
    /// the underlying stream surface as `LineError::Io`; already buffered
    /// bytes are kept for the next call.
    pub fn read_line(&mut self) -> Result<String> {
        loop {
            if let Some(line) = self.buffer.extract() {
                return Ok(line);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(LineError::Io(err)),
            };

            if read == 0 {
                return Err(LineError::ConnectionClosed);
            }

            self.buffer.feed(&chunk[..read]);
        }
    }

    /// Read and decode the next response line.
    pub fn read_response(&mut self) -> Result<Response> {
        let line = self.read_line()?;
        Response::parse(&line)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
