/// Errors that can occur while pumping a stream through the engine.
///
/// Per-line protocol failures are not errors here: they are acknowledged on
/// the output and counted as handled lines.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Reading input failed.
    #[error("input error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of [`LineProtocol::pump`](crate::LineProtocol::pump).
pub type Result<T> = std::result::Result<T, EngineError>;
