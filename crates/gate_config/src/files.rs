//! Module declarations read from a directory tree.

use crate::document::ConfigDocument;
use crate::error::ConfigError;
use gate_container::application::ModuleSource;
use gate_container::error::ContainerError;
use gate_container::store::Container;
use std::path::{Path, PathBuf};

/// Default name of a module's declaration file.
pub const DEFAULT_FILE_NAME: &str = "service.yml";

/// Finds module declarations on disk.
///
/// Module `a.b.c` maps to `<root>/a/b/c/service.yml`. A module without that
/// file has no declarations and is skipped by the application container.
///
/// # Example
///
/// ```
/// use gate_config::ModuleFiles;
/// use std::path::Path;
///
/// let files = ModuleFiles::new("/srv/app");
/// assert_eq!(
///     files.path_for("billing.invoices"),
///     Path::new("/srv/app/billing/invoices/service.yml"),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ModuleFiles {
    root: PathBuf,
    file_name: String,
}

impl ModuleFiles {
    /// Looks for module files under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            file_name: DEFAULT_FILE_NAME.to_owned(),
        }
    }

    /// Uses `file_name` instead of `service.yml`.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// The directory module paths are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The declaration file for `module`.
    #[must_use]
    pub fn path_for(&self, module: &str) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(module.split('.').filter(|segment| !segment.is_empty()));
        path.push(&self.file_name);
        path
    }

    /// Reads the declarations of `module`, or `None` if it has no file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
    pub fn read(&self, module: &str) -> Result<Option<ConfigDocument>, ConfigError> {
        let path = self.path_for(module);
        if !path.is_file() {
            tracing::trace!(module, path = %path.display(), "no declaration file");
            return Ok(None);
        }
        ConfigDocument::from_path(&path).map(Some)
    }
}

impl ModuleSource for ModuleFiles {
    fn load(&self, module: &str) -> Result<Option<Container>, ContainerError> {
        self.read(module)
            .map(|document| document.map(ConfigDocument::into_container))
            .map_err(|source| ContainerError::Module {
                module: module.to_owned(),
                source: Box::new(source),
            })
    }
}
