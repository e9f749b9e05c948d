use std::fmt;

/// Errors raised while dispatching one command line.
///
/// A failure aborts only the line being processed; nothing was applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The first token names no registered command.
    #[error("unknown qualifier: {0}")]
    UnknownQualifier(String),

    /// Malformed token, wrong value class, missing required argument or a
    /// duplicate registration.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An argument's acceptance predicate rejected its value.
    #[error("validation failed: {0}")]
    ValidatorFailure(String),
}

impl ProtocolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProtocolError::UnknownQualifier(_) => ErrorKind::UnknownQualifier,
            ProtocolError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ProtocolError::ValidatorFailure(_) => ErrorKind::ValidatorFailure,
        }
    }

    /// The description without the kind prefix.
    pub fn detail(&self) -> &str {
        match self {
            ProtocolError::UnknownQualifier(detail)
            | ProtocolError::InvalidArgument(detail)
            | ProtocolError::ValidatorFailure(detail) => detail,
        }
    }
}

/// Coarse classification of a [`ProtocolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownQualifier,
    InvalidArgument,
    ValidatorFailure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::UnknownQualifier => "unknown_qualifier",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::ValidatorFailure => "validator_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_kind() {
        let err = ProtocolError::InvalidArgument("arg=x value is not numeric".into());
        assert_eq!(err.to_string(), "invalid argument: arg=x value is not numeric");
        assert_eq!(err.detail(), "arg=x value is not numeric");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = ProtocolError::UnknownQualifier("test".into());
        assert_eq!(err.to_string(), "unknown qualifier: test");
        assert_eq!(err.kind().as_str(), "unknown_qualifier");
    }
}
