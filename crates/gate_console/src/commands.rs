//! Built-in commands.

use crate::command::{Command, command_instance};
use gate_container::error::ContainerError;
use gate_container::factory::Arguments;
use gate_container::symbol::SymbolTable;
use gate_container::value::Instance;
use std::io::Write;

/// Class path of [`Echo`].
pub const ECHO_SYMBOL: &str = "gate_console.commands:Echo";

/// Writes its `message` parameter to standard output.
///
/// ```yaml
/// services:
///   console.commands.hello:
///     class: gate_console.commands:Echo
///     parameters:
///       message: parameter::greeting
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Echo {
    message: String,
}

impl Echo {
    /// Creates the command.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Factory registered under [`ECHO_SYMBOL`].
    ///
    /// # Errors
    ///
    /// Fails if `message` is missing or not a string.
    pub fn create(args: Arguments) -> Result<Instance, ContainerError> {
        Ok(command_instance(Self::new(args.str("message")?)))
    }

    /// The message to write.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Writes the message and a newline to `out`.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_to(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out, "{}", self.message)
    }
}

impl Command for Echo {
    fn execute(&self) -> anyhow::Result<()> {
        self.write_to(&mut std::io::stdout().lock())?;
        Ok(())
    }
}

/// Symbols of every built-in command.
#[must_use]
pub fn builtin_symbols() -> SymbolTable {
    SymbolTable::new().with(ECHO_SYMBOL, Echo::create)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::as_command;
    use gate_container::symbol::SymbolResolver;
    use gate_container::value::Value;
    use indexmap::IndexMap;

    #[test]
    fn echo_writes_a_line() {
        let mut out = Vec::new();
        Echo::new("hello").write_to(&mut out).unwrap();
        assert_eq!(out, b"hello\n");
    }

    #[test]
    fn echo_is_registered() {
        let factory = builtin_symbols().resolve(ECHO_SYMBOL).unwrap();
        let args = Arguments::new(
            "console.commands.hello",
            IndexMap::from([("message".to_owned(), Value::from("hi"))]),
        );

        let instance = factory.create(args).unwrap();
        assert!(as_command(&instance).is_some());
    }

    #[test]
    fn echo_requires_a_message() {
        let err = Echo::create(Arguments::new("echo", IndexMap::new())).unwrap_err();
        assert!(matches!(err, ContainerError::MissingArgument { argument, .. } if argument == "message"));
    }
}
