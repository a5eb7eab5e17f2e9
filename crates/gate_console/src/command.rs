//! Console commands and the application entry command.

use crate::logging::{LogFormat, LoggingConfig};
use anyhow::Context as _;
use clap::Parser;
use gate_config::{ModuleFiles, load_settings};
use gate_container::application::ApplicationContainer;
use gate_container::symbol::SymbolTable;
use gate_container::value::Instance;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;

/// Prefix of the services the console can run.
pub const COMMAND_SERVICE_PREFIX: &str = "console.commands.";

/// Something the console can run.
///
/// Commands are declared as services named `console.commands.<name>` whose
/// factory returns [`command_instance`].
pub trait Command: Send + Sync + 'static {
    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Whatever went wrong, with enough context to print to the user.
    fn execute(&self) -> anyhow::Result<()>;
}

/// Wraps a command so a factory can return it as a service instance.
#[must_use]
pub fn command_instance(command: impl Command) -> Instance {
    Instance::new(Arc::new(command) as Arc<dyn Command>)
}

/// Returns the command carried by `instance`, if any.
#[must_use]
pub fn as_command(instance: &Instance) -> Option<Arc<dyn Command>> {
    instance.downcast_ref::<Arc<dyn Command>>().cloned()
}

/// Service name of command `name`.
#[must_use]
pub fn command_service_name(name: &str) -> String {
    format!("{COMMAND_SERVICE_PREFIX}{name}")
}

// ─────────────────────────────────────────────────────────────────────────────
// Arguments
// ─────────────────────────────────────────────────────────────────────────────

/// Command line of the `gate` binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "gate")]
#[command(about = "Run a command declared in a gate application")]
pub struct ConsoleArgs {
    /// Settings file listing the application modules.
    #[arg(long)]
    pub config: PathBuf,

    /// Command to run, looked up as the service `console.commands.<COMMAND>`.
    #[arg(long)]
    pub command: Option<String>,

    /// Directory module files are resolved against. Defaults to the
    /// directory of the settings file.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Maximum log level.
    #[arg(long, default_value_t = Level::WARN)]
    pub log_level: Level,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Target filter, e.g. `gate_container=debug`.
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl ConsoleArgs {
    /// The module root directory.
    #[must_use]
    pub fn module_root(&self) -> PathBuf {
        match &self.root {
            Some(root) => root.clone(),
            None => self
                .config
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        }
    }

    /// The logging configuration these arguments ask for.
    #[must_use]
    pub fn logging(&self) -> LoggingConfig {
        let config = LoggingConfig::default()
            .with_level(self.log_level)
            .with_format(self.log_format);
        match &self.log_filter {
            Some(filter) => config.with_env_filter(filter.clone()),
            None => config,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ApplicationCommand
// ─────────────────────────────────────────────────────────────────────────────

/// Loads an application from its settings file and runs the requested
/// command inside a fresh context.
///
/// Without `--command` nothing is loaded and nothing runs.
#[derive(Debug)]
pub struct ApplicationCommand {
    args: ConsoleArgs,
    symbols: SymbolTable,
}

impl ApplicationCommand {
    /// Creates the command for parsed arguments.
    #[must_use]
    pub fn new(args: ConsoleArgs) -> Self {
        Self {
            args,
            symbols: SymbolTable::new(),
        }
    }

    /// Adds symbols available to `class` declarations.
    #[must_use]
    pub fn with_symbols(mut self, symbols: &SymbolTable) -> Self {
        self.symbols.extend(symbols);
        self
    }

    /// The parsed arguments.
    #[must_use]
    pub fn args(&self) -> &ConsoleArgs {
        &self.args
    }

    /// Builds the application container described by the settings file.
    ///
    /// # Errors
    ///
    /// Fails if the settings file cannot be read.
    pub fn container(&self) -> anyhow::Result<ApplicationContainer> {
        let settings = load_settings(&self.args.config)?;
        let root = self.args.module_root();
        tracing::debug!(root = %root.display(), modules = ?settings.modules, "loading application");

        Ok(ApplicationContainer::builder(settings)
            .source(ModuleFiles::new(root))
            .symbols(self.symbols.clone())
            .build())
    }
}

impl Command for ApplicationCommand {
    fn execute(&self) -> anyhow::Result<()> {
        let Some(name) = &self.args.command else {
            tracing::debug!("no command given");
            return Ok(());
        };

        let service = command_service_name(name);
        let context = self.container()?.context();
        let instance = context
            .get_service(&service)
            .with_context(|| format!("cannot load command \"{name}\""))?;
        let command = as_command(&instance)
            .with_context(|| format!("service \"{service}\" is not a command"))?;

        tracing::info!(command = %name, "running command");
        command.execute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl Command for Noop {
        fn execute(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn commands_round_trip_through_instances() {
        let instance = command_instance(Noop);
        assert!(as_command(&instance).is_some());
        assert!(as_command(&Instance::new(Noop)).is_none());
    }

    #[test]
    fn arguments_parse_with_defaults() {
        let args = ConsoleArgs::try_parse_from(["gate", "--config", "app/settings.yml"]).unwrap();

        assert_eq!(args.command, None);
        assert_eq!(args.module_root(), PathBuf::from("app"));
        assert_eq!(args.log_level, Level::WARN);
        assert_eq!(args.log_format, LogFormat::Pretty);
    }

    #[test]
    fn arguments_override_defaults() {
        let args = ConsoleArgs::try_parse_from([
            "gate",
            "--config",
            "settings.yml",
            "--command",
            "migrate",
            "--root",
            "/srv/app",
            "--log-level",
            "debug",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.command.as_deref(), Some("migrate"));
        assert_eq!(args.module_root(), PathBuf::from("/srv/app"));
        assert_eq!(args.logging().level(), Level::DEBUG);
        assert_eq!(args.logging().format(), LogFormat::Json);
    }

    #[test]
    fn application_command_keeps_its_arguments() {
        let args =
            ConsoleArgs::try_parse_from(["gate", "--config", "settings.yml", "--command", "echo"])
                .unwrap();
        let command = ApplicationCommand::new(args);

        assert_eq!(command.args().command.as_deref(), Some("echo"));
        assert_eq!(command.args().config, PathBuf::from("settings.yml"));
    }

    #[test]
    fn config_is_required() {
        assert!(ConsoleArgs::try_parse_from(["gate", "--command", "migrate"]).is_err());
    }

    #[test]
    fn bare_settings_file_name_uses_the_current_directory() {
        let args = ConsoleArgs::try_parse_from(["gate", "--config", "settings.yml"]).unwrap();
        assert_eq!(args.module_root(), PathBuf::from(""));
    }
}
