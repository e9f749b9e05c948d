use std::collections::BTreeMap;
use std::fmt;

use tracing::trace;

use crate::argument::{ArgumentKind, ArgumentSpec};
use crate::config::RegistryConfig;
use crate::error::{ProtocolError, Result};
use crate::parse::{parse_argument, ParsedValue};

/// Argument values of one invocation, by name.
pub type ArgumentValues = BTreeMap<String, f64>;

/// Callback run with `(matched, unmatched)` after a line validated.
pub type CommandCallback = Box<dyn FnMut(&ArgumentValues, &ArgumentValues)>;

/// The validated arguments of one command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    /// Declared arguments that passed validation.
    pub matched: ArgumentValues,
    /// Arguments the command does not declare.
    pub unmatched: ArgumentValues,
    /// Exact whole-number forms of `matched` values, used when storing into
    /// integer kinds.
    pub whole: BTreeMap<String, i128>,
}

impl Invocation {
    fn record_match(&mut self, name: &str, value: ParsedValue) {
        self.matched.insert(name.to_string(), value.value);
        match value.whole {
            Some(whole) => self.whole.insert(name.to_string(), whole),
            None => self.whole.remove(name),
        };
    }

    /// The matched value of `name` with its exact whole form, if any.
    pub fn parsed(&self, name: &str) -> Option<ParsedValue> {
        let value = *self.matched.get(name)?;
        Some(ParsedValue {
            value,
            whole: self.whole.get(name).copied(),
        })
    }
}

/// Describes one command: its declared arguments and an optional callback.
#[derive(Default)]
pub struct CommandSpec {
    arguments: BTreeMap<String, ArgumentSpec>,
    callback: Option<CommandCallback>,
}

impl CommandSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an argument. A later declaration of the same name replaces
    /// the earlier one.
    pub fn argument(mut self, name: impl Into<String>, spec: ArgumentSpec) -> Self {
        self.arguments.insert(name.into(), spec);
        self
    }

    /// Set the callback run after every successful validation.
    pub fn with_callback(
        mut self,
        callback: impl FnMut(&ArgumentValues, &ArgumentValues) + 'static,
    ) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn arguments(&self) -> impl Iterator<Item = (&str, &ArgumentSpec)> {
        self.arguments.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn get_argument(&self, name: &str) -> Option<&ArgumentSpec> {
        self.arguments.get(name)
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Validate argument tokens without applying anything.
    ///
    /// Tokens are checked left to right, then required arguments in name
    /// order. A repeated name keeps its last value.
    pub fn validate(&self, tokens: &[&str], config: &RegistryConfig) -> Result<Invocation> {
        let mut invocation = Invocation::default();

        for (index, token) in tokens.iter().enumerate() {
            if index == config.max_arguments_per_line {
                return Err(ProtocolError::InvalidArgument(format!(
                    "too many arguments ({} > {})",
                    tokens.len(),
                    config.max_arguments_per_line
                )));
            }

            let parsed = parse_argument(token)?;

            let Some(spec) = self.arguments.get(parsed.name) else {
                if config.reject_unknown_arguments {
                    return Err(ProtocolError::InvalidArgument(format!(
                        "{} is not a declared argument",
                        parsed.token
                    )));
                }
                invocation
                    .unmatched
                    .insert(parsed.name.to_string(), parsed.value.value);
                continue;
            };

            if spec.kind() == ArgumentKind::Integer && !parsed.value.is_integer() {
                return Err(ProtocolError::InvalidArgument(format!(
                    "{} should be int",
                    parsed.token
                )));
            }

            if !spec.accepts_parsed(&parsed.value) {
                return Err(ProtocolError::ValidatorFailure(parsed.token.to_string()));
            }

            invocation.record_match(parsed.name, parsed.value);
        }

        for (name, spec) in &self.arguments {
            if spec.is_required() && !invocation.matched.contains_key(name) {
                return Err(ProtocolError::InvalidArgument(format!("{name} is required")));
            }
        }

        Ok(invocation)
    }

    /// Run the setter of every matched argument.
    pub fn apply(&self, invocation: &Invocation) {
        for (name, spec) in &self.arguments {
            if let Some(value) = invocation.parsed(name) {
                trace!(argument = name.as_str(), value = value.value, "argument applied");
                spec.apply(value);
            }
        }
    }

    /// Apply the invocation, then run the callback.
    pub fn invoke(&mut self, invocation: &Invocation) {
        self.apply(invocation);
        if let Some(callback) = self.callback.as_mut() {
            callback(&invocation.matched, &invocation.unmatched);
        }
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("arguments", &self.arguments)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
