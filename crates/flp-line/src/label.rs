//! Response line labels.
//!
//! The label is the first character of every emitted line and tells the host
//! how to correlate it.

use std::fmt;

/// Label of an emitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// Immediate acknowledgement of one processed command line (`_`).
    Ack,
    /// Asynchronous state report (`R`).
    Report,
    /// Optional dedicated error channel (`E`). Only emitted when the engine
    /// is configured for it; acknowledgements carry every failure anyway.
    Error,
}

impl Label {
    /// The wire character for this label.
    pub fn as_char(self) -> char {
        match self {
            Label::Ack => '_',
            Label::Report => 'R',
            Label::Error => 'E',
        }
    }

    /// Parse a wire character back into a label.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '_' => Some(Label::Ack),
            'R' => Some(Label::Report),
            'E' => Some(Label::Error),
            _ => None,
        }
    }

    /// Human-readable name for logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            Label::Ack => "ACK",
            Label::Report => "REPORT",
            Label::Error => "ERROR",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_characters() {
        assert_eq!(Label::Ack.as_char(), '_');
        assert_eq!(Label::Report.as_char(), 'R');
        assert_eq!(Label::Error.as_char(), 'E');
        assert_eq!(Label::from_char('R'), Some(Label::Report));
        assert_eq!(Label::from_char('x'), None);
    }

    #[test]
    fn display_is_the_wire_character() {
        assert_eq!(Label::Ack.to_string(), "_");
        assert_eq!(Label::Report.name(), "REPORT");
    }
}
