//! Service instantiation.

use crate::declaration::{FactoryRef, ServiceDeclaration};
use crate::error::ContainerError;
use crate::factory::{Arguments, Factory};
use crate::reference::Reference;
use crate::scope::ContextContainer;
use crate::symbol::split_class_path;
use crate::value::{Instance, ParamValue, Value};
use indexmap::IndexMap;
use std::sync::Arc;

/// Builds a live instance from a service declaration.
///
/// Factory selection, in order:
///
/// 1. `class` - looked up through the scope's symbol resolver
/// 2. a callable factory - used as is
/// 3. a factory service name - that service's instance must be a factory
///
/// Constructor parameters whose value is a reference string are replaced
/// with `scope.get_parameter(<the whole string>)`; other values are passed
/// through literally.
///
/// The resolver does not cache. Calling it twice invokes the factory twice.
pub struct ServiceResolver<'s> {
    scope: &'s ContextContainer,
}

impl<'s> ServiceResolver<'s> {
    /// Creates a resolver that builds services within `scope`.
    #[must_use]
    pub fn new(scope: &'s ContextContainer) -> Self {
        Self { scope }
    }

    /// Instantiates service `name` from `declaration`.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::ServiceConfiguration`] if no usable factory is declared
    /// - [`ContainerError::SymbolNotFound`] if the class path is unknown
    /// - any failure from resolving a parameter or invoking the factory
    pub fn resolve(
        &self,
        name: &str,
        declaration: &ServiceDeclaration,
    ) -> Result<Instance, ContainerError> {
        let factory = self.resolve_factory(name, declaration)?;
        let arguments = self.resolve_arguments(declaration.parameters())?;
        tracing::debug!(service = name, arguments = arguments.len(), "instantiating service");
        factory.create(Arguments::new(name, arguments))
    }

    fn resolve_factory(
        &self,
        name: &str,
        declaration: &ServiceDeclaration,
    ) -> Result<Arc<dyn Factory>, ContainerError> {
        if let Some(path) = declaration.class_path() {
            if split_class_path(path).is_none() {
                return Err(ContainerError::ServiceConfiguration(name.to_owned()));
            }
            return self
                .scope
                .symbols()
                .resolve(path)
                .ok_or_else(|| ContainerError::SymbolNotFound(path.to_owned()));
        }

        match declaration.factory_ref() {
            Some(FactoryRef::Callable(factory)) => Ok(Arc::clone(factory)),
            Some(FactoryRef::Service(factory_service)) => self
                .scope
                .get_service(factory_service)?
                .as_factory()
                .ok_or_else(|| ContainerError::ServiceConfiguration(name.to_owned())),
            None => Err(ContainerError::ServiceConfiguration(name.to_owned())),
        }
    }

    fn resolve_arguments(
        &self,
        parameters: &IndexMap<String, ParamValue>,
    ) -> Result<IndexMap<String, Value>, ContainerError> {
        parameters
            .iter()
            .map(|(key, value)| {
                let resolved = match value {
                    ParamValue::String(raw) if Reference::is_reference(raw) => {
                        self.scope.get_parameter(raw)?
                    }
                    literal => Value::from(literal.clone()),
                };
                Ok((key.clone(), resolved))
            })
            .collect()
    }
}
