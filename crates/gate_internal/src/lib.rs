//! # Gate Internal Library
//!
//! Re-exports the core gate crates for convenience.

/// Declaration stores, scopes and resolution.
pub use gate_container;

/// Configuration sources.
pub use gate_config;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use gate_config::{ConfigDocument, ContainerBuilder, ModuleFiles, load_settings};
    pub use gate_container::prelude::*;
}
