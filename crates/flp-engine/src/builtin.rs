//! Diagnostic commands answered by the engine itself.

/// Version reported by `@flp.version`.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Engine-provided introspection commands. Their reply is the payload of the
/// acknowledgement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `@flp.version`: protocol version.
    Version,
    /// `@flp.buffer.size`: unconsumed input bytes.
    BufferSize,
    /// `@flp.registration`: command and argument table as JSON.
    Registration,
    /// `@flp.state`: named state snapshot as JSON.
    State,
}

impl Builtin {
    pub const ALL: [Builtin; 4] = [
        Builtin::Version,
        Builtin::BufferSize,
        Builtin::Registration,
        Builtin::State,
    ];

    pub fn qualifier(self) -> &'static str {
        match self {
            Builtin::Version => "@flp.version",
            Builtin::BufferSize => "@flp.buffer.size",
            Builtin::Registration => "@flp.registration",
            Builtin::State => "@flp.state",
        }
    }

    pub fn from_qualifier(qualifier: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|builtin| builtin.qualifier() == qualifier)
    }
}
