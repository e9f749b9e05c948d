use flp_line::{ClockKind, LineConfig};
use flp_registry::RegistryConfig;

/// Engine behavior configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Line splitting of the input buffer.
    pub line: LineConfig,
    /// Argument validation behavior.
    pub registry: RegistryConfig,
    /// Emit an `_` line for every processed line.
    pub acknowledge: bool,
    /// Additionally emit failures on the `E` label.
    pub error_channel: bool,
    /// Timestamp source for emitted lines.
    pub clock: ClockKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            line: LineConfig::default(),
            registry: RegistryConfig::default(),
            acknowledge: true,
            error_channel: false,
            clock: ClockKind::System,
        }
    }
}
