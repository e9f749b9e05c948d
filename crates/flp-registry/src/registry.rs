use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::command::{CommandSpec, Invocation};
use crate::config::RegistryConfig;
use crate::error::{ProtocolError, Result};
use crate::parse::ParsedLine;

/// Qualifier-keyed table of command descriptors.
///
/// Commands can be added but never removed. Iteration is in qualifier order.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandSpec>,
    config: RegistryConfig,
}

impl CommandRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            commands: BTreeMap::new(),
            config,
        }
    }

    /// Register a command. A taken qualifier fails and keeps the first
    /// registration.
    pub fn register(&mut self, qualifier: impl Into<String>, spec: CommandSpec) -> Result<()> {
        let qualifier = qualifier.into();
        if self.commands.contains_key(&qualifier) {
            return Err(ProtocolError::InvalidArgument(format!(
                "command {qualifier} already registered"
            )));
        }

        debug!(
            qualifier = qualifier.as_str(),
            arguments = spec.arguments().count(),
            "command registered"
        );
        self.commands.insert(qualifier, spec);
        Ok(())
    }

    pub fn contains(&self, qualifier: &str) -> bool {
        self.commands.contains_key(qualifier)
    }

    pub fn get(&self, qualifier: &str) -> Option<&CommandSpec> {
        self.commands.get(qualifier)
    }

    pub fn get_mut(&mut self, qualifier: &str) -> Option<&mut CommandSpec> {
        self.commands.get_mut(qualifier)
    }

    /// Registered qualifiers in order.
    pub fn qualifiers(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandSpec)> {
        self.commands.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Resolve and validate a tokenized line without applying it.
    pub fn validate(&self, line: &ParsedLine<'_>) -> Result<Invocation> {
        let command = self
            .commands
            .get(line.qualifier)
            .ok_or_else(|| ProtocolError::UnknownQualifier(line.qualifier.to_string()))?;
        command.validate(&line.arguments, &self.config)
    }

    /// Validate a tokenized line, then apply it and run its callback.
    pub fn dispatch(&mut self, line: &ParsedLine<'_>) -> Result<Invocation> {
        let invocation = self.validate(line)?;
        if let Some(command) = self.commands.get_mut(line.qualifier) {
            command.invoke(&invocation);
        }
        Ok(invocation)
    }

    /// Registration table as JSON: `{qualifier: {argument: "optional,int"}}`.
    pub fn describe(&self) -> Value {
        let commands = self
            .commands
            .iter()
            .map(|(qualifier, spec)| {
                let arguments = spec
                    .arguments()
                    .map(|(name, argument)| (name.to_string(), Value::String(argument.describe())))
                    .collect::<Map<String, Value>>();
                (qualifier.clone(), Value::Object(arguments))
            })
            .collect::<Map<String, Value>>();
        Value::Object(commands)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::argument::ArgumentSpec;
    use crate::parse::tokenize;
    use crate::slot::Slot;

    #[test]
    fn duplicate_registration_keeps_first() {
        let calls = Rc::new(Cell::new(0));
        let first = Rc::clone(&calls);

        let mut registry = CommandRegistry::new();
        registry
            .register(
                "test",
                CommandSpec::new().with_callback(move |_, _| first.set(first.get() + 1)),
            )
            .unwrap();

        let err = registry.register("test", CommandSpec::new()).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidArgument(_)));
        assert_eq!(registry.len(), 1);

        registry.dispatch(&tokenize("test").unwrap()).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn unknown_qualifier() {
        let mut registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.dispatch(&tokenize("test a=1").unwrap()).unwrap_err(),
            ProtocolError::UnknownQualifier("test".into())
        );
    }

    #[test]
    fn dispatch_applies_bindings() {
        let slot = Slot::new(0i32);
        let mut registry = CommandRegistry::new();
        registry
            .register("test", CommandSpec::new().argument("arg", ArgumentSpec::bind(&slot)))
            .unwrap();

        let invocation = registry.validate(&tokenize("test arg=5").unwrap()).unwrap();
        assert_eq!(invocation.matched.get("arg"), Some(&5.0));
        assert_eq!(slot.get(), 0);

        registry.dispatch(&tokenize("test arg=5").unwrap()).unwrap();
        assert_eq!(slot.get(), 5);

        registry.dispatch(&tokenize("test").unwrap()).unwrap();
        assert_eq!(slot.get(), 5);
    }

    #[test]
    fn describe_lists_arguments() {
        let int = Slot::new(0i32);
        let real = Slot::new(0.0f32);
        let mut registry = CommandRegistry::new();
        registry
            .register(
                "test",
                CommandSpec::new()
                    .argument("b", ArgumentSpec::bind(&real).required())
                    .argument("a", ArgumentSpec::bind(&int)),
            )
            .unwrap();
        registry.register("@flp.version", CommandSpec::new()).unwrap();

        assert_eq!(
            registry.describe().to_string(),
            r#"{"@flp.version":{},"test":{"a":"optional,int","b":"required,float"}}"#
        );
        assert_eq!(
            registry.qualifiers().collect::<Vec<_>>(),
            vec!["@flp.version", "test"]
        );
        assert!(registry.contains("test"));
        assert!(registry.get("missing").is_none());
    }
}
