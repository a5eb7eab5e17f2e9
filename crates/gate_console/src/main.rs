//! The `gate` console.
//!
//! # Usage
//!
//! ```bash
//! gate --config app/settings.yml --command hello
//! ```
//!
//! Loads the modules listed in the settings file from `<root>/<module path>/service.yml`
//! and runs the service `console.commands.hello`.

use clap::Parser;
use gate_console::{ApplicationCommand, Command, ConsoleArgs, builtin_symbols};

fn main() -> anyhow::Result<()> {
    let args = ConsoleArgs::parse();
    args.logging().init();

    ApplicationCommand::new(args)
        .with_symbols(&builtin_symbols())
        .execute()
}
