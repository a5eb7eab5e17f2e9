//! Programmatic and file-based assembly of declaration stores.

use crate::document::ConfigDocument;
use crate::error::ConfigError;
use gate_container::declaration::ServiceDeclaration;
use gate_container::factory::Factory;
use gate_container::store::Container;
use gate_container::value::ParamValue;
use indexmap::IndexMap;
use std::path::Path;

/// Accumulates parameter and service declarations into a [`Container`].
///
/// Later additions replace earlier ones under the same name. Merging is
/// shallow: a file that redeclares a parameter replaces its whole value.
///
/// # Example
///
/// ```
/// use gate_config::ContainerBuilder;
/// use gate_container::factory::Arguments;
/// use gate_container::store::DeclarationProvider;
/// use gate_container::value::Instance;
///
/// struct Mailer;
///
/// let container = ContainerBuilder::new()
///     .parameter("sender", "noreply@example.com")
///     .service("mailer", |_: Arguments| Ok(Instance::new(Mailer)))
///     .create();
///
/// assert!(container.has_parameter("sender"));
/// assert!(container.has_service("mailer"));
/// ```
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    parameters: IndexMap<String, ParamValue>,
    services: IndexMap<String, ServiceDeclaration>,
}

impl ContainerBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a service built by `factory` with no constructor parameters.
    pub fn service(&mut self, name: impl Into<String>, factory: impl Factory) -> &mut Self {
        self.declare(name, ServiceDeclaration::factory(factory))
    }

    /// Declares a service built by `factory` with the given constructor
    /// parameters.
    pub fn service_with(
        &mut self,
        name: impl Into<String>,
        factory: impl Factory,
        parameters: IndexMap<String, ParamValue>,
    ) -> &mut Self {
        self.declare(
            name,
            ServiceDeclaration::factory(factory).with_parameters(parameters),
        )
    }

    /// Adds a prepared service declaration.
    pub fn declare(&mut self, name: impl Into<String>, declaration: ServiceDeclaration) -> &mut Self {
        self.services.insert(name.into(), declaration);
        self
    }

    /// Declares a parameter.
    pub fn parameter(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Merges a parsed document.
    pub fn document(&mut self, document: ConfigDocument) -> &mut Self {
        self.parameters.extend(document.parameters);
        self.services.extend(document.services);
        self
    }

    /// Reads a YAML declaration file and merges it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed. The
    /// builder is left unchanged in that case.
    pub fn file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, ConfigError> {
        let document = ConfigDocument::from_path(path)?;
        Ok(self.document(document))
    }

    /// Builds the container and resets the builder.
    pub fn create(&mut self) -> Container {
        let parameters = core::mem::take(&mut self.parameters);
        let services = core::mem::take(&mut self.services);
        Container::new(parameters, services)
    }
}
