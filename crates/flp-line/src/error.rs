/// Errors that can occur while reading or writing protocol lines.
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    /// A response line does not follow `label(timestamp) tag: payload`.
    #[error("malformed response line: {0}")]
    Malformed(String),

    /// An I/O error occurred while reading or writing lines.
    #[error("line I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete line was received.
    #[error("connection closed (incomplete line)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, LineError>;
