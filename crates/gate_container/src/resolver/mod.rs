//! Resolution of declarations into values and instances.
//!
//! - [`ParameterResolver`] walks a declared value and rewrites reference
//!   strings into what they point at
//! - [`ServiceResolver`] turns a service declaration into a live instance
//! - [`ReferenceResolver`] is the extension point for new reference prefixes
//!
//! Both resolvers are short-lived views over a
//! [`ContextContainer`](crate::scope::ContextContainer); they cache nothing
//! themselves.

mod parameter;
mod service;

pub use parameter::ParameterResolver;
pub use service::ServiceResolver;

use crate::error::ContainerError;
use crate::scope::ContextContainer;
use crate::value::{Instance, ParameterResponse};
use std::sync::Arc;

/// Resolves reference strings with a custom prefix.
///
/// Register an implementation as the service `container.<prefix>_resolver`
/// (see [`resolver_service_name`](crate::reference::resolver_service_name))
/// wrapped with [`Instance::resolver`]. The resolver receives the *whole*
/// reference string, prefix included, and decides through
/// [`ParameterResponse::persist`] whether the scope may cache the result.
///
/// # Example
///
/// ```
/// use gate_container::error::ContainerError;
/// use gate_container::resolver::ReferenceResolver;
/// use gate_container::scope::ContextContainer;
/// use gate_container::value::ParameterResponse;
///
/// /// Resolves `upper::text` to `TEXT`.
/// struct Upper;
///
/// impl ReferenceResolver for Upper {
///     fn resolve(
///         &self,
///         reference: &str,
///         _scope: &ContextContainer,
///     ) -> Result<ParameterResponse, ContainerError> {
///         let text = reference.trim_start_matches("upper::");
///         Ok(ParameterResponse::persistent(text.to_uppercase()))
///     }
/// }
/// ```
pub trait ReferenceResolver: Send + Sync + 'static {
    /// Resolves `reference` within `scope`.
    ///
    /// # Errors
    ///
    /// Implementations report their own failures; the dispatcher propagates
    /// them unchanged.
    fn resolve(
        &self,
        reference: &str,
        scope: &ContextContainer,
    ) -> Result<ParameterResponse, ContainerError>;
}

impl Instance {
    /// Wraps a reference resolver so it can be registered as a service.
    #[must_use]
    pub fn resolver(resolver: impl ReferenceResolver) -> Self {
        Self::new(Arc::new(resolver) as Arc<dyn ReferenceResolver>)
    }

    /// Returns the reference resolver capability if this instance carries one.
    #[must_use]
    pub fn as_resolver(&self) -> Option<Arc<dyn ReferenceResolver>> {
        self.downcast_ref::<Arc<dyn ReferenceResolver>>().cloned()
    }
}
