//! Console entry point for `gate` applications.
//!
//! - [`Command`] - something the console can run, declared as a service
//!   named `console.commands.<name>`
//! - [`ApplicationCommand`] - loads an application from its settings file and
//!   runs one command in a fresh context
//! - [`commands`] - built-in commands, registered with [`builtin_symbols`]
//! - [`logging`] - subscriber setup
//!
//! # Example
//!
//! ```
//! use clap::Parser;
//! use gate_console::{ApplicationCommand, Command, ConsoleArgs, builtin_symbols};
//!
//! let args = ConsoleArgs::try_parse_from(["gate", "--config", "settings.yml"]).unwrap();
//! let command = ApplicationCommand::new(args).with_symbols(&builtin_symbols());
//!
//! // No `--command`: nothing is loaded and nothing runs.
//! command.execute().unwrap();
//! ```

mod command;

/// Built-in commands.
pub mod commands;

/// Logging setup.
pub mod logging;

pub use command::{
    ApplicationCommand, COMMAND_SERVICE_PREFIX, Command, ConsoleArgs, as_command,
    command_instance, command_service_name,
};
pub use commands::{ECHO_SYMBOL, Echo, builtin_symbols};
