//! Error types for configuration loading.

use std::path::PathBuf;

/// Errors raised while reading configuration files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML or does not have the expected shape.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// The file being parsed.
        path: PathBuf,
        /// The underlying YAML failure.
        #[source]
        source: serde_yaml::Error,
    },
}

impl ConfigError {
    /// The file this error is about.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}
