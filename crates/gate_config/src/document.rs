//! YAML declaration documents.

use crate::error::ConfigError;
use gate_container::application::Settings;
use gate_container::declaration::ServiceDeclaration;
use gate_container::store::Container;
use gate_container::value::ParamValue;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// The contents of one declaration file.
///
/// ```yaml
/// parameters:
///   db_host: localhost
/// services:
///   db:
///     class: app.db:DbClient
///     parameters:
///       host: parameter::db_host
/// ```
///
/// Both sections are optional; a missing or `null` section is empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigDocument {
    /// Parameter declarations, in file order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub parameters: IndexMap<String, ParamValue>,
    /// Service declarations, in file order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub services: IndexMap<String, ServiceDeclaration>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ConfigDocument {
    /// Parses a document from YAML text. An empty text is an empty document.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if the text is malformed.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str::<Option<Self>>(text).map(Option::unwrap_or_default)
    }

    /// Reads and parses a document file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Parse`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = read(path)?;
        let document = Self::from_yaml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            path = %path.display(),
            parameters = document.parameters.len(),
            services = document.services.len(),
            "loaded declaration file"
        );
        Ok(document)
    }

    /// Returns `true` if the document declares nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.services.is_empty()
    }

    /// Turns the document into a declaration store.
    #[must_use]
    pub fn into_container(self) -> Container {
        Container::new(self.parameters, self.services)
    }
}

/// Reads a YAML settings file.
///
/// An empty file yields default settings (no modules).
///
/// # Errors
///
/// Returns [`ConfigError::Io`] or [`ConfigError::Parse`].
pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let text = read(path)?;
    let settings = serde_yaml::from_str::<Option<Settings>>(&text)
        .map(Option::unwrap_or_default)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), modules = ?settings.modules, "loaded settings");
    Ok(settings)
}

pub(crate) fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
