//! Ordered composition of declaration providers.

use super::DeclarationProvider;
use crate::declaration::ServiceDeclaration;
use crate::error::ContainerError;
use crate::value::ParamValue;
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// An ordered list of declaration providers, first match wins.
///
/// The stack does not own declarations. It holds shared handles to its
/// members (plain [`Container`](super::Container)s or nested stacks) and
/// remembers which declaration won for each name it has been asked about,
/// so later lookups skip the scan.
///
/// Only `get_*` populate that memo; `has_*` never do.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use gate_container::store::{Container, ContainerStack, DeclarationProvider};
/// use serde_json::json;
///
/// let overrides = Container::new([("x".to_owned(), json!(2))], []);
/// let defaults = Container::new([("x".to_owned(), json!(1)), ("y".to_owned(), json!(3))], []);
///
/// let stack = ContainerStack::new()
///     .with(Arc::new(overrides))
///     .with(Arc::new(defaults));
///
/// assert_eq!(*stack.get_parameter("x").unwrap(), json!(2));
/// assert_eq!(*stack.get_parameter("y").unwrap(), json!(3));
/// ```
#[derive(Default)]
pub struct ContainerStack {
    providers: Vec<Arc<dyn DeclarationProvider>>,
    services: RwLock<HashMap<String, Arc<ServiceDeclaration>>>,
    parameters: RwLock<HashMap<String, Arc<ParamValue>>>,
}

impl core::fmt::Debug for ContainerStack {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ContainerStack")
            .field("providers", &self.providers.len())
            .field("cached_services", &self.services.read().len())
            .field("cached_parameters", &self.parameters.read().len())
            .finish()
    }
}

impl ContainerStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stack over `providers`, highest precedence first.
    #[must_use]
    pub fn from_providers(providers: Vec<Arc<dyn DeclarationProvider>>) -> Self {
        Self {
            providers,
            ..Self::default()
        }
    }

    /// Appends a provider with lower precedence than all current members.
    #[must_use]
    pub fn with(mut self, provider: Arc<dyn DeclarationProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Number of member providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns `true` if the stack has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl DeclarationProvider for ContainerStack {
    fn has_service(&self, name: &str) -> bool {
        self.services.read().contains_key(name)
            || self.providers.iter().any(|p| p.has_service(name))
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.parameters.read().contains_key(name)
            || self.providers.iter().any(|p| p.has_parameter(name))
    }

    fn get_service(&self, name: &str) -> Result<Arc<ServiceDeclaration>, ContainerError> {
        if let Some(declaration) = self.services.read().get(name) {
            return Ok(Arc::clone(declaration));
        }

        let Some(provider) = self.providers.iter().find(|p| p.has_service(name)) else {
            return Err(ContainerError::ServiceNotFound(name.to_owned()));
        };
        let declaration = provider.get_service(name)?;

        Ok(Arc::clone(
            self.services
                .write()
                .entry(name.to_owned())
                .or_insert(declaration),
        ))
    }

    fn get_parameter(&self, name: &str) -> Result<Arc<ParamValue>, ContainerError> {
        if let Some(value) = self.parameters.read().get(name) {
            return Ok(Arc::clone(value));
        }

        let Some(provider) = self.providers.iter().find(|p| p.has_parameter(name)) else {
            return Err(ContainerError::ParameterNotDefined(name.to_owned()));
        };
        let value = provider.get_parameter(name)?;

        Ok(Arc::clone(
            self.parameters
                .write()
                .entry(name.to_owned())
                .or_insert(value),
        ))
    }
}
