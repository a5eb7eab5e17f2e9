//! Configuration sources for `gate_container`.
//!
//! - [`ConfigDocument`] - one YAML file of parameter and service declarations
//! - [`ContainerBuilder`] - merges code and files into a
//!   [`Container`](gate_container::store::Container)
//! - [`ModuleFiles`] - a [`ModuleSource`](gate_container::application::ModuleSource)
//!   that maps module `a.b.c` to `<root>/a/b/c/service.yml`
//! - [`load_settings`] - reads application settings
//!
//! # Example
//!
//! ```
//! use gate_config::{ConfigDocument, ContainerBuilder};
//! use gate_container::store::DeclarationProvider;
//!
//! let document = ConfigDocument::from_yaml_str(
//!     "parameters:\n  db_host: localhost\nservices:\n  db:\n    class: app.db:DbClient\n",
//! )
//! .unwrap();
//!
//! let container = ContainerBuilder::new()
//!     .parameter("db_port", 5432)
//!     .document(document)
//!     .create();
//!
//! assert!(container.has_parameter("db_host"));
//! assert!(container.has_service("db"));
//! ```

/// Declaration stores assembled from code and files.
pub mod builder;

/// YAML declaration documents and settings files.
pub mod document;

/// Error types.
pub mod error;

/// Module declarations on disk.
pub mod files;

pub use builder::ContainerBuilder;
pub use document::{ConfigDocument, load_settings};
pub use error::ConfigError;
pub use files::{DEFAULT_FILE_NAME, ModuleFiles};
