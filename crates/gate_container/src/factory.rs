//! Service factories and their constructor arguments.

use crate::error::{BoxError, ContainerError};
use crate::value::{Instance, Value};
use indexmap::IndexMap;
use std::sync::Arc;

/// Builds a service instance from named constructor arguments.
///
/// Implemented for any `Fn(Arguments) -> Result<Instance, ContainerError>`,
/// so most factories are closures:
///
/// ```
/// use gate_container::error::ContainerError;
/// use gate_container::factory::{Arguments, Factory};
/// use gate_container::value::Instance;
///
/// struct DbClient { host: String }
///
/// let factory = |args: Arguments| -> Result<Instance, ContainerError> {
///     Ok(Instance::new(DbClient { host: args.str("host")?.to_owned() }))
/// };
/// # fn assert_factory<F: Factory>(_: &F) {}
/// # assert_factory(&factory);
/// ```
pub trait Factory: Send + Sync + 'static {
    /// Invokes the factory.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument is missing or malformed, or if
    /// construction itself fails.
    fn create(&self, arguments: Arguments) -> Result<Instance, ContainerError>;
}

impl<F> Factory for F
where
    F: Fn(Arguments) -> Result<Instance, ContainerError> + Send + Sync + 'static,
{
    fn create(&self, arguments: Arguments) -> Result<Instance, ContainerError> {
        self(arguments)
    }
}

impl Instance {
    /// Wraps a factory so it can be registered as a service and used by
    /// other declarations as `factory: "<service-name>"`.
    #[must_use]
    pub fn factory(factory: impl Factory) -> Self {
        Self::new(Arc::new(factory) as Arc<dyn Factory>)
    }

    /// Returns the factory capability if this instance carries one.
    #[must_use]
    pub fn as_factory(&self) -> Option<Arc<dyn Factory>> {
        self.downcast_ref::<Arc<dyn Factory>>().cloned()
    }
}

/// Resolved constructor arguments for one service.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    service: String,
    values: IndexMap<String, Value>,
}

impl Arguments {
    /// Creates the argument set for `service`.
    #[must_use]
    pub fn new(service: impl Into<String>, values: IndexMap<String, Value>) -> Self {
        Self {
            service: service.into(),
            values,
        }
    }

    /// The service these arguments are for.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the argument if it was declared.
    #[must_use]
    pub fn optional(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns the argument.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::MissingArgument`] if it was not declared.
    pub fn value(&self, name: &str) -> Result<&Value, ContainerError> {
        self.values
            .get(name)
            .ok_or_else(|| ContainerError::MissingArgument {
                service: self.service.clone(),
                argument: name.to_owned(),
            })
    }

    /// Returns a string argument.
    ///
    /// # Errors
    ///
    /// Fails if the argument is missing or not a string.
    pub fn str(&self, name: &str) -> Result<&str, ContainerError> {
        self.typed(name, "a string", Value::as_str)
    }

    /// Returns an integer argument.
    ///
    /// # Errors
    ///
    /// Fails if the argument is missing or not an integer.
    pub fn i64(&self, name: &str) -> Result<i64, ContainerError> {
        self.typed(name, "an integer", Value::as_i64)
    }

    /// Returns a numeric argument as a float.
    ///
    /// # Errors
    ///
    /// Fails if the argument is missing or not a number.
    pub fn f64(&self, name: &str) -> Result<f64, ContainerError> {
        self.typed(name, "a number", Value::as_f64)
    }

    /// Returns a boolean argument.
    ///
    /// # Errors
    ///
    /// Fails if the argument is missing or not a boolean.
    pub fn bool(&self, name: &str) -> Result<bool, ContainerError> {
        self.typed(name, "a boolean", Value::as_bool)
    }

    /// Returns a service instance argument of type `T`.
    ///
    /// # Errors
    ///
    /// Fails if the argument is missing, not an instance, or not a `T`.
    pub fn instance<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, ContainerError> {
        self.typed(name, core::any::type_name::<T>(), |value| {
            value.as_instance().and_then(Instance::downcast::<T>)
        })
    }

    /// Wraps a construction failure for this service.
    #[must_use]
    pub fn error(&self, source: impl Into<BoxError>) -> ContainerError {
        ContainerError::Factory {
            service: self.service.clone(),
            source: source.into(),
        }
    }

    /// Iterates over the arguments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no arguments were declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consumes the set, returning the raw map.
    #[must_use]
    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.values
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        expected: &'static str,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, ContainerError> {
        extract(self.value(name)?).ok_or_else(|| ContainerError::InvalidArgument {
            service: self.service.clone(),
            argument: name.to_owned(),
            expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pool {
        size: i64,
    }

    fn arguments() -> Arguments {
        let mut values = IndexMap::new();
        values.insert("host".to_owned(), Value::from("localhost"));
        values.insert("port".to_owned(), Value::from(5432));
        values.insert("pool".to_owned(), Value::from(Instance::new(Pool { size: 4 })));
        Arguments::new("db", values)
    }

    #[test]
    fn typed_accessors() {
        let args = arguments();
        assert_eq!(args.service(), "db");
        assert_eq!(args.str("host").unwrap(), "localhost");
        assert_eq!(args.i64("port").unwrap(), 5432);
        assert_eq!(args.instance::<Pool>("pool").unwrap().size, 4);
        assert_eq!(args.len(), 3);
        assert!(args.optional("tls").is_none());
    }

    #[test]
    fn missing_and_mistyped_arguments() {
        let args = arguments();

        let err = args.str("user").unwrap_err();
        assert!(matches!(
            err,
            ContainerError::MissingArgument { ref argument, .. } if argument == "user"
        ));

        let err = args.bool("host").unwrap_err();
        assert!(matches!(
            err,
            ContainerError::InvalidArgument { expected: "a boolean", .. }
        ));

        assert!(args.instance::<String>("pool").is_err());
    }

    #[test]
    fn closures_are_factories() {
        let factory = |args: Arguments| -> Result<Instance, ContainerError> {
            Ok(Instance::new(Pool { size: args.i64("port")? }))
        };
        let instance = factory.create(arguments()).unwrap();
        assert_eq!(instance.downcast_ref::<Pool>().unwrap().size, 5432);
    }

    #[test]
    fn factory_instances_expose_the_capability() {
        let instance = Instance::factory(|_: Arguments| Ok(Instance::new(Pool { size: 1 })));
        let factory = instance.as_factory().unwrap();
        let pool = factory.create(Arguments::default()).unwrap();
        assert!(pool.is::<Pool>());

        assert!(Instance::new(Pool { size: 1 }).as_factory().is_none());
    }
}
