//! Service declarations.
//!
//! A [`ServiceDeclaration`] describes how to build a service without building
//! it. It comes either from configuration files, where it has the shape
//!
//! ```yaml
//! db:
//!   class: "app.db:Client"        # or: factory: "db_factory"
//!   parameters:
//!     host: "parameter::db_host"
//! ```
//!
//! or from code, where the factory may also be a closure.

use crate::factory::Factory;
use crate::value::ParamValue;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

/// How a declaration names its factory, besides a class path.
#[derive(Clone)]
pub enum FactoryRef {
    /// A factory given directly in code.
    Callable(Arc<dyn Factory>),
    /// The name of another service whose instance is a factory.
    Service(String),
}

impl core::fmt::Debug for FactoryRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Callable(_) => f.write_str("Callable(..)"),
            Self::Service(name) => f.debug_tuple("Service").field(name).finish(),
        }
    }
}

/// The static description of a service.
///
/// Exactly one usable factory form is expected. When both `class` and
/// `factory` are present the class path wins; when neither is usable the
/// service fails with [`ServiceConfiguration`](crate::error::ContainerError::ServiceConfiguration)
/// on first lookup, not at declaration time.
#[derive(Debug, Clone, Default)]
pub struct ServiceDeclaration {
    class: Option<String>,
    factory: Option<FactoryRef>,
    parameters: IndexMap<String, ParamValue>,
}

impl ServiceDeclaration {
    /// A service built by the factory registered under `path`
    /// (`"<module-path>:<symbol>"`).
    #[must_use]
    pub fn class(path: impl Into<String>) -> Self {
        Self {
            class: Some(path.into()),
            ..Self::default()
        }
    }

    /// A service built by `factory`.
    #[must_use]
    pub fn factory(factory: impl Factory) -> Self {
        Self {
            factory: Some(FactoryRef::Callable(Arc::new(factory))),
            ..Self::default()
        }
    }

    /// A service built by the factory instance of another service.
    #[must_use]
    pub fn factory_service(name: impl Into<String>) -> Self {
        Self {
            factory: Some(FactoryRef::Service(name.into())),
            ..Self::default()
        }
    }

    /// Adds one constructor parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Replaces all constructor parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: IndexMap<String, ParamValue>) -> Self {
        self.parameters = parameters;
        self
    }

    /// The class path, if declared.
    #[must_use]
    pub fn class_path(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// The non-class factory form, if declared and usable.
    #[must_use]
    pub fn factory_ref(&self) -> Option<&FactoryRef> {
        self.factory.as_ref()
    }

    /// The declared constructor parameters, in order.
    #[must_use]
    pub fn parameters(&self) -> &IndexMap<String, ParamValue> {
        &self.parameters
    }
}

#[derive(Deserialize)]
struct RawDeclaration {
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    factory: Option<ParamValue>,
    #[serde(default)]
    parameters: Option<IndexMap<String, ParamValue>>,
}

impl<'de> Deserialize<'de> for ServiceDeclaration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawDeclaration::deserialize(deserializer)?;
        // Files can only name factory services; anything else is kept as
        // "no usable factory" and reported when the service is built.
        let factory = match raw.factory {
            Some(ParamValue::String(name)) => Some(FactoryRef::Service(name)),
            _ => None,
        };
        Ok(Self {
            class: raw.class,
            factory,
            parameters: raw.parameters.unwrap_or_default(),
        })
    }
}
