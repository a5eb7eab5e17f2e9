//! Recursive reference dispatch over declared values.

use crate::error::ContainerError;
use crate::reference::{Reference, ReferenceKind, resolver_service_name};
use crate::scope::ContextContainer;
use crate::value::{ParamValue, ParameterResponse, Value};

/// Rewrites reference strings inside a declared value, depth first.
///
/// | Declared | Resolved |
/// |----------|----------|
/// | mapping | same keys, values resolved |
/// | sequence | same order, elements resolved |
/// | `parameter::<name>` | `scope.get_parameter(name)` |
/// | `service::<name>` | `scope.get_service(name)` |
/// | `<prefix>::...` | the `container.<prefix>_resolver` service, given the whole string |
/// | anything else | unchanged |
///
/// Only a custom resolver answering the *whole* value can mark the result as
/// persistent; everything else resolves with `persist: false`.
pub struct ParameterResolver<'s> {
    scope: &'s ContextContainer,
}

impl<'s> ParameterResolver<'s> {
    /// Creates a resolver that looks references up in `scope`.
    #[must_use]
    pub fn new(scope: &'s ContextContainer) -> Self {
        Self { scope }
    }

    /// Resolves a declared value.
    ///
    /// # Errors
    ///
    /// Propagates lookup failures from the scope, and fails with
    /// [`ContainerError::ParameterNotDefined`] (carrying the whole reference)
    /// when a custom prefix has no registered resolver.
    pub fn resolve(&self, value: &ParamValue) -> Result<ParameterResponse, ContainerError> {
        match value {
            ParamValue::Object(map) => {
                let mut resolved = indexmap::IndexMap::with_capacity(map.len());
                for (key, item) in map {
                    resolved.insert(key.clone(), self.resolve(item)?.value);
                }
                Ok(ParameterResponse::new(Value::Mapping(resolved)))
            }
            ParamValue::Array(items) => {
                let resolved = items
                    .iter()
                    .map(|item| self.resolve(item).map(|response| response.value))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ParameterResponse::new(Value::Sequence(resolved)))
            }
            ParamValue::String(raw) => self.resolve_str(raw),
            literal => Ok(ParameterResponse::new(Value::from(literal.clone()))),
        }
    }

    /// Resolves a single string, which may or may not be a reference.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve).
    pub fn resolve_str(&self, raw: &str) -> Result<ParameterResponse, ContainerError> {
        let Some(reference) = Reference::parse(raw) else {
            return Ok(ParameterResponse::new(raw));
        };

        match reference.kind() {
            ReferenceKind::Parameter(name) => {
                Ok(ParameterResponse::new(self.scope.get_parameter(name)?))
            }
            ReferenceKind::Service(name) => {
                Ok(ParameterResponse::new(self.scope.get_service(name)?))
            }
            ReferenceKind::Custom { prefix } => self.delegate(prefix, raw),
        }
    }

    fn delegate(&self, prefix: &str, raw: &str) -> Result<ParameterResponse, ContainerError> {
        let service = resolver_service_name(prefix);
        if !self.scope.has_service(&service) {
            return Err(ContainerError::ParameterNotDefined(raw.to_owned()));
        }

        let resolver = self
            .scope
            .get_service(&service)?
            .as_resolver()
            .ok_or(ContainerError::ServiceConfiguration(service))?;

        tracing::trace!(prefix, reference = raw, "delegating reference");
        resolver.resolve(raw, self.scope)
    }
}
