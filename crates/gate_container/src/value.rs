//! Declared and resolved values.
//!
//! Declarations carry [`ParamValue`]s, plain data as read from configuration.
//! Resolution turns them into [`Value`]s, which may additionally hold live
//! service [`Instance`]s wherever a `service::` reference was found.
//!
//! # Capabilities
//!
//! Instances are type-erased. Services that the container itself needs to
//! call (reference resolvers, factories) are stored as `Arc<dyn Trait>` and
//! recovered with [`Instance::downcast_ref`]:
//!
//! ```
//! use std::sync::Arc;
//! use gate_container::value::Instance;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self) -> String { "hello".into() }
//! }
//!
//! let instance = Instance::new(Arc::new(English) as Arc<dyn Greeter>);
//! let greeter = instance.downcast_ref::<Arc<dyn Greeter>>().unwrap();
//! assert_eq!(greeter.greet(), "hello");
//! ```

use core::any::Any;
use core::fmt;
use indexmap::IndexMap;
use std::sync::Arc;

/// A declared parameter value: literal, mapping, sequence or reference string.
pub type ParamValue = serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Instance
// ─────────────────────────────────────────────────────────────────────────────

/// A live, shared service object.
///
/// Cloning an `Instance` clones the handle, not the object: every clone
/// refers to the same allocation, which is what scope-level identity relies on.
#[derive(Clone)]
pub struct Instance {
    object: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Instance {
    /// Wraps a value as a new instance.
    #[must_use]
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an already shared value without re-allocating it.
    #[must_use]
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            object: value,
            type_name: core::any::type_name::<T>(),
        }
    }

    /// Returns a shared handle to the object if it is a `T`.
    #[must_use]
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.object).downcast::<T>().ok()
    }

    /// Borrows the object if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        (*self.object).downcast_ref::<T>()
    }

    /// Returns `true` if the object is a `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        (*self.object).is::<T>()
    }

    /// Returns `true` if both handles point at the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }

    /// Returns the concrete type name of the object.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Instance").field(&self.type_name).finish()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Value
// ─────────────────────────────────────────────────────────────────────────────

/// A resolved parameter value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// `null` in the declaration.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer or float.
    Number(serde_json::Number),
    /// A string that was not a reference (or was resolved to a string).
    String(String),
    /// An ordered sequence.
    Sequence(Vec<Value>),
    /// A mapping, in declaration order.
    Mapping(IndexMap<String, Value>),
    /// A live service object.
    Instance(Instance),
}

impl Value {
    /// Returns the string if this is a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an integral [`Value::Number`].
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Returns the number as a float if this is a [`Value::Number`].
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Returns the boolean if this is a [`Value::Bool`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the elements if this is a [`Value::Sequence`].
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this is a [`Value::Mapping`].
    #[must_use]
    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the instance if this is a [`Value::Instance`].
    #[must_use]
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Self::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Looks up `key` if this is a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<ParamValue> for Value {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Null => Self::Null,
            ParamValue::Bool(b) => Self::Bool(b),
            ParamValue::Number(n) => Self::Number(n),
            ParamValue::String(s) => Self::String(s),
            ParamValue::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            ParamValue::Object(map) => {
                Self::Mapping(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Self::Instance(instance)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ParameterResponse
// ─────────────────────────────────────────────────────────────────────────────

/// A resolved parameter plus whether the scope should cache it.
///
/// Built-in resolution never persists; reference resolvers decide for
/// themselves by returning [`ParameterResponse::persistent`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterResponse {
    /// The resolved value.
    pub value: Value,
    /// Cache the value for the rest of the scope's lifetime.
    pub persist: bool,
}

impl ParameterResponse {
    /// A response that is recomputed on every lookup.
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            persist: false,
        }
    }

    /// A response the scope caches for the rest of its lifetime.
    #[must_use]
    pub fn persistent(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            persist: true,
        }
    }
}

impl From<Value> for ParameterResponse {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Logger {
        name: String,
    }

    #[test]
    fn converts_declared_values() {
        let value = Value::from(json!({"hosts": ["a", "b"], "port": 5432, "tls": true, "x": null}));

        let map = value.as_mapping().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), ["hosts", "port", "tls", "x"]);
        assert_eq!(value.get("port").and_then(Value::as_i64), Some(5432));
        assert_eq!(value.get("tls").and_then(Value::as_bool), Some(true));
        assert!(value.get("x").unwrap().is_null());
        assert_eq!(
            value.get("hosts"),
            Some(&Value::Sequence(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn instance_downcasts_to_its_type() {
        let instance = Instance::new(Logger { name: "app".into() });

        assert!(instance.is::<Logger>());
        assert!(!instance.is::<String>());
        assert_eq!(instance.downcast_ref::<Logger>().unwrap().name, "app");
        assert!(instance.downcast::<String>().is_none());
        assert!(instance.type_name().ends_with("Logger"));
    }

    #[test]
    fn instance_equality_is_identity() {
        let a = Instance::new(Logger { name: "a".into() });
        let b = Instance::new(Logger { name: "a".into() });

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(Value::from(a.clone()), Value::Instance(a));
    }

    #[test]
    fn from_arc_keeps_the_allocation() {
        let logger = Arc::new(Logger { name: "shared".into() });
        let instance = Instance::from_arc(Arc::clone(&logger));

        assert!(Arc::ptr_eq(&instance.downcast::<Logger>().unwrap(), &logger));
    }

    #[test]
    fn responses_default_to_not_persisting() {
        assert!(!ParameterResponse::new(1).persist);
        assert!(ParameterResponse::persistent(1).persist);
        assert!(!ParameterResponse::from(Value::Null).persist);
    }
}
