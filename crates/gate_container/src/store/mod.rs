//! Declaration stores.
//!
//! - [`DeclarationProvider`] - the lookup contract shared by every layer
//! - [`Container`] - an immutable set of declarations
//! - [`ContainerStack`] - ordered composition of providers, first match wins
//!
//! Providers only answer *which declaration* a name refers to. Nothing here
//! instantiates services or resolves references; that is the job of a
//! [`ContextContainer`](crate::scope::ContextContainer).

mod stack;

pub use stack::ContainerStack;

use crate::declaration::ServiceDeclaration;
use crate::error::ContainerError;
use crate::value::ParamValue;
use hashbrown::HashMap;
use std::sync::Arc;

/// Lookup contract for declarations.
///
/// `has_*` are side-effect free probes. `get_*` fail with
/// [`ContainerError::ServiceNotFound`] / [`ContainerError::ParameterNotDefined`]
/// when the name is not declared.
pub trait DeclarationProvider: Send + Sync {
    /// Returns `true` if a service named `name` is declared.
    fn has_service(&self, name: &str) -> bool;

    /// Returns `true` if a parameter named `name` is declared.
    fn has_parameter(&self, name: &str) -> bool;

    /// Returns the declaration of service `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::ServiceNotFound`] if it is not declared.
    fn get_service(&self, name: &str) -> Result<Arc<ServiceDeclaration>, ContainerError>;

    /// Returns the raw value of parameter `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::ParameterNotDefined`] if it is not declared.
    fn get_parameter(&self, name: &str) -> Result<Arc<ParamValue>, ContainerError>;
}

impl<P: DeclarationProvider + ?Sized> DeclarationProvider for Arc<P> {
    fn has_service(&self, name: &str) -> bool {
        (**self).has_service(name)
    }

    fn has_parameter(&self, name: &str) -> bool {
        (**self).has_parameter(name)
    }

    fn get_service(&self, name: &str) -> Result<Arc<ServiceDeclaration>, ContainerError> {
        (**self).get_service(name)
    }

    fn get_parameter(&self, name: &str) -> Result<Arc<ParamValue>, ContainerError> {
        (**self).get_parameter(name)
    }
}

/// An immutable set of service and parameter declarations.
///
/// A container is assembled once (usually by a configuration source) and
/// never changes afterwards. Rebuilding means creating a new container.
///
/// # Example
///
/// ```
/// use gate_container::declaration::ServiceDeclaration;
/// use gate_container::store::{Container, DeclarationProvider};
/// use serde_json::json;
///
/// let container = Container::new(
///     [("db_host".to_owned(), json!("localhost"))],
///     [("db".to_owned(), ServiceDeclaration::class("app.db:Client"))],
/// );
///
/// assert!(container.has_parameter("db_host"));
/// assert!(container.has_service("db"));
/// assert!(container.get_service("cache").is_err());
/// ```
#[derive(Debug, Default, Clone)]
pub struct Container {
    parameters: HashMap<String, Arc<ParamValue>>,
    services: HashMap<String, Arc<ServiceDeclaration>>,
}

impl Container {
    /// Creates a container from parameter and service declarations.
    #[must_use]
    pub fn new(
        parameters: impl IntoIterator<Item = (String, ParamValue)>,
        services: impl IntoIterator<Item = (String, ServiceDeclaration)>,
    ) -> Self {
        Self {
            parameters: parameters
                .into_iter()
                .map(|(name, value)| (name, Arc::new(value)))
                .collect(),
            services: services
                .into_iter()
                .map(|(name, declaration)| (name, Arc::new(declaration)))
                .collect(),
        }
    }

    /// Creates a container with no declarations.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Iterates over the declared service names.
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Iterates over the declared parameter names.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    /// Returns `true` if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty() && self.parameters.is_empty()
    }
}

impl DeclarationProvider for Container {
    fn has_service(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    fn get_service(&self, name: &str) -> Result<Arc<ServiceDeclaration>, ContainerError> {
        self.services
            .get(name)
            .cloned()
            .ok_or_else(|| ContainerError::ServiceNotFound(name.to_owned()))
    }

    fn get_parameter(&self, name: &str) -> Result<Arc<ParamValue>, ContainerError> {
        self.parameters
            .get(name)
            .cloned()
            .ok_or_else(|| ContainerError::ParameterNotDefined(name.to_owned()))
    }
}
