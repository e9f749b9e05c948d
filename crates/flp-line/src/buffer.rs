use bytes::{Buf, BytesMut};

/// Default line delimiter.
pub const DEFAULT_DELIMITER: u8 = b'\n';

/// Default initial buffer capacity in bytes.
pub const DEFAULT_INITIAL_CAPACITY: usize = 150;

/// Configuration for line extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineConfig {
    /// Byte that terminates a line. Default: `\n`.
    pub delimiter: u8,
    /// Bytes reserved up front. Default: 150.
    pub initial_capacity: usize,
    /// Remove one trailing `\r` from each extracted line. Default: off, so
    /// qualifiers match exactly what was sent.
    pub strip_carriage_return: bool,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            strip_carriage_return: false,
        }
    }
}

/// Accumulates raw input and hands out complete lines.
///
/// Feeding never inspects line boundaries, so input may arrive in any
/// fragmentation. Blank and space-only lines are swallowed during
/// extraction.
#[derive(Debug)]
pub struct LineBuffer {
    buf: BytesMut,
    config: LineConfig,
}

impl LineBuffer {
    /// Create a buffer with default configuration.
    pub fn new() -> Self {
        Self::with_config(LineConfig::default())
    }

    /// Create a buffer with explicit configuration.
    pub fn with_config(config: LineConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(config.initial_capacity),
            config,
        }
    }

    /// Append raw bytes.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Take the next complete non-blank line, without its delimiter.
    ///
    /// Returns `None` when no delimiter is buffered; any partial line stays
    /// in place for the next feed.
    pub fn extract(&mut self) -> Option<String> {
        loop {
            let end = self
                .buf
                .iter()
                .position(|&byte| byte == self.config.delimiter)?;

            let mut line = self.buf.split_to(end);
            self.buf.advance(1);

            if self.config.strip_carriage_return && line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }

            if line.iter().all(|&byte| byte == b' ') {
                continue;
            }

            return Some(String::from_utf8_lossy(&line).into_owned());
        }
    }

    /// Number of unconsumed bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The unconsumed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Discard everything buffered.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Current configuration.
    pub fn config(&self) -> &LineConfig {
        &self.config
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_one_line_per_call() {
        let mut buffer = LineBuffer::new();
        buffer.feed(b"first\nsecond\n");

        assert_eq!(buffer.extract().as_deref(), Some("first"));
        assert_eq!(buffer.extract().as_deref(), Some("second"));
        assert_eq!(buffer.extract(), None);
        assert!(buffer.is_empty());
    }

    #[test]
    fn partial_line_waits_for_delimiter() {
        let mut buffer = LineBuffer::new();
        buffer.feed(b"tes");
        assert_eq!(buffer.extract(), None);
        assert_eq!(buffer.as_bytes(), b"tes");

        buffer.feed(b"t\n");
        assert_eq!(buffer.extract().as_deref(), Some("test"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn delimiter_runs_collapse_to_nothing() {
        let mut buffer = LineBuffer::new();
        buffer.feed(b"\n\n\n\n\n");
        assert_eq!(buffer.extract(), None);
        assert!(buffer.is_empty());

        buffer.feed(b"  \n  \n  \n \n");
        assert_eq!(buffer.extract(), None);
        assert!(buffer.is_empty());
    }

    #[test]
    fn blank_lines_are_skipped_within_one_call() {
        let mut buffer = LineBuffer::new();
        buffer.feed(b"\n   \ncmd\nrest");

        assert_eq!(buffer.extract().as_deref(), Some("cmd"));
        assert_eq!(buffer.as_bytes(), b"rest");
    }

    #[test]
    fn surrounding_spaces_are_kept_for_the_parser() {
        let mut buffer = LineBuffer::new();
        buffer.feed(b"   test   \n");
        assert_eq!(buffer.extract().as_deref(), Some("   test   "));
    }

    #[test]
    fn tab_only_line_is_not_blank() {
        let mut buffer = LineBuffer::new();
        buffer.feed(b"\t\n");
        assert_eq!(buffer.extract().as_deref(), Some("\t"));
    }

    #[test]
    fn custom_delimiter() {
        let mut buffer = LineBuffer::with_config(LineConfig {
            delimiter: b';',
            ..LineConfig::default()
        });
        buffer.feed(b"a;b\n;");

        assert_eq!(buffer.extract().as_deref(), Some("a"));
        assert_eq!(buffer.extract().as_deref(), Some("b\n"));
        assert_eq!(buffer.extract(), None);
    }

    #[test]
    fn carriage_return_kept_by_default() {
        let mut buffer = LineBuffer::new();
        buffer.feed(b"test\r\n");
        assert_eq!(buffer.extract().as_deref(), Some("test\r"));
    }

    #[test]
    fn carriage_return_stripped_when_configured() {
        let mut buffer = LineBuffer::with_config(LineConfig {
            strip_carriage_return: true,
            ..LineConfig::default()
        });
        buffer.feed(b"test\r\n\r\n \r\n");

        assert_eq!(buffer.extract().as_deref(), Some("test"));
        assert_eq!(buffer.extract(), None);
        assert!(buffer.is_empty());
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut buffer = LineBuffer::new();
        buffer.feed(&[b'a', 0xFF, b'\n']);
        assert_eq!(buffer.extract().as_deref(), Some("a\u{FFFD}"));
    }

    #[test]
    fn clear_drops_pending_bytes() {
        let mut buffer = LineBuffer::new();
        buffer.feed(b"partial");
        assert_eq!(buffer.len(), 7);
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
