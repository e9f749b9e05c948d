use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tracing::trace;

use crate::clock::{Clock, SystemClock};
use crate::codec::encode_response;
use crate::error::{LineError, Result};
use crate::label::Label;

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Formats and writes response lines to any `Write` sink.
///
/// Each call writes exactly one complete line and flushes, so a host never
/// observes half an event.
pub struct ResponseWriter<T> {
    inner: T,
    buf: BytesMut,
    clock: Box<dyn Clock>,
}

impl<T: Write> ResponseWriter<T> {
    /// Create a writer stamping lines with the wall clock.
    pub fn new(inner: T) -> Self {
        Self::with_clock(inner, Box::new(SystemClock))
    }

    /// Create a writer with an explicit timestamp source.
    pub fn with_clock(inner: T, clock: Box<dyn Clock>) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            clock,
        }
    }

    /// Write one line stamped with the current clock value.
    pub fn respond(&mut self, label: Label, tag: &str, payload: &str) -> Result<()> {
        let timestamp = self.clock.now_millis();
        self.respond_at(label, timestamp, tag, payload)
    }

    /// Write one line with an explicit timestamp.
    pub fn respond_at(&mut self, label: Label, timestamp: u64, tag: &str, payload: &str) -> Result<()> {
        self.buf.clear();
        encode_response(label, timestamp, tag, payload, &mut self.buf);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(LineError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(LineError::Io(err)),
            }
        }

        trace!(label = label.name(), tag, "response written");
        self.flush()
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(LineError::Io(err)),
            }
        }
    }

    /// Replace the timestamp source.
    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.clock = clock;
    }

    /// Current clock reading.
    pub fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying sink.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Swap in a new sink, returning the previous one.
    pub fn replace_inner(&mut self, inner: T) -> T {
        std::mem::replace(&mut self.inner, inner)
    }

    /// Consume the writer and return the inner sink.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::clock::FixedClock;
    use crate::codec::Response;

    fn fixed_writer(now: u64) -> ResponseWriter<Cursor<Vec<u8>>> {
        ResponseWriter::with_clock(Cursor::new(Vec::new()), Box::new(FixedClock::new(now)))
    }

    #[test]
    fn writes_stamped_lines() {
        let mut writer = fixed_writer(1234);
        writer.respond(Label::Ack, "test", "OK").unwrap();
        writer.respond(Label::Report, "bool_state", "0").unwrap();

        let written = String::from_utf8(writer.into_inner().into_inner()).unwrap();
        assert_eq!(written, "_(1234) test: OK\nR(1234) bool_state: 0\n");
    }

    #[test]
    fn explicit_timestamp_wins() {
        let mut writer = fixed_writer(1);
        writer.respond_at(Label::Error, 99, "x", "boom").unwrap();

        let written = String::from_utf8(writer.into_inner().into_inner()).unwrap();
        let response = Response::parse(&written).unwrap();
        assert_eq!(response.timestamp, 99);
        assert_eq!(response.label, Label::Error);
    }

    #[test]
    fn short_writes_are_completed() {
        let sink = OneBytePerWrite { data: Vec::new() };
        let mut writer = ResponseWriter::with_clock(sink, Box::new(FixedClock::new(5)));
        writer.respond(Label::Ack, "cmd", "OK").unwrap();
        assert_eq!(writer.get_ref().data, b"_(5) cmd: OK\n");
    }

    #[test]
    fn zero_write_is_connection_closed() {
        let mut writer = ResponseWriter::new(ClosedSink);
        assert!(matches!(
            writer.respond(Label::Ack, "cmd", "OK"),
            Err(LineError::ConnectionClosed)
        ));
    }

    #[test]
    fn clock_can_be_replaced() {
        let mut writer = fixed_writer(1);
        writer.set_clock(Box::new(FixedClock::new(77)));
        assert_eq!(writer.now_millis(), 77);
    }

    #[test]
    fn sink_can_be_replaced() {
        let mut writer = fixed_writer(3);
        writer.respond(Label::Ack, "a", "OK").unwrap();
        let old = writer.replace_inner(Cursor::new(Vec::new()));
        writer.respond(Label::Ack, "b", "OK").unwrap();

        assert_eq!(old.into_inner(), b"_(3) a: OK\n");
        assert_eq!(writer.into_inner().into_inner(), b"_(3) b: OK\n");
    }

    struct OneBytePerWrite {
        data: Vec<u8>,
    }

    impl Write for OneBytePerWrite {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            match buf.first() {
                Some(&byte) => {
                    self.data.push(byte);
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ClosedSink;

    impl Write for ClosedSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
