/// Controls argument validation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// When true, arguments a command does not declare fail the line instead
    /// of being passed to the callback as unmatched.
    pub reject_unknown_arguments: bool,
    /// Maximum number of argument tokens accepted on one line. Unlimited by
    /// default.
    pub max_arguments_per_line: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            reject_unknown_arguments: false,
            max_arguments_per_line: usize::MAX,
        }
    }
}
