//! Layered dependency-resolution container.
//!
//! `gate_container` turns declarative service and parameter definitions into
//! live values, scoped to one execution context at a time:
//!
//! - [`store`] - immutable declaration sets and ordered stacks of them
//! - [`scope`] - per-context caches and the resolution entry points
//! - [`resolver`] - parameter reference dispatch and service instantiation
//! - [`reference`] - parsing of `prefix::payload` reference strings
//! - [`declaration`] - the shape of a service declaration
//! - [`factory`] - constructors and the arguments they receive
//! - [`symbol`] - class-path lookup for `module:Symbol` declarations
//! - [`value`] - resolved values and type-erased instances
//! - [`application`] - module assembly and per-context scopes
//! - [`error`] - the error type shared by all of the above
//!
//! # Layers
//!
//! ```text
//! ApplicationContainer ──▶ ApplicationContext ──▶ ContextContainer
//!                                                   │   (caches)
//!                                                   ▼
//!                                            ContainerStack
//!                                          ┌────┴────┐
//!                                      Container  Container   (declarations)
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gate_container::prelude::*;
//! use serde_json::json;
//!
//! let defaults = Container::new(
//!     [("greeting".to_owned(), json!("hello")), ("name".to_owned(), json!("world"))],
//!     [],
//! );
//! let overrides = Container::new([("name".to_owned(), json!("gate"))], []);
//!
//! let stack = ContainerStack::new()
//!     .with(Arc::new(overrides))
//!     .with(Arc::new(defaults));
//! let scope = ContextContainer::new(Arc::new(stack));
//!
//! assert_eq!(scope.get_parameter("name").unwrap(), Value::from("gate"));
//! assert_eq!(scope.get_parameter("parameter::greeting").unwrap(), Value::from("hello"));
//! ```

/// Module assembly and per-context scopes.
pub mod application;

/// Service declarations.
pub mod declaration;

/// Error types.
pub mod error;

/// Service factories and their arguments.
pub mod factory;

/// Reference string parsing.
pub mod reference;

/// Parameter and service resolution.
pub mod resolver;

/// Per-context resolution scope.
pub mod scope;

/// Declaration stores.
pub mod store;

/// Class-path symbol lookup.
pub mod symbol;

/// Resolved values and instances.
pub mod value;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::application::{
        ApplicationBuilder, ApplicationContainer, ApplicationContext, ModuleSource, Settings,
    };
    pub use crate::declaration::{FactoryRef, ServiceDeclaration};
    pub use crate::error::ContainerError;
    pub use crate::factory::{Arguments, Factory};
    pub use crate::resolver::ReferenceResolver;
    pub use crate::scope::ContextContainer;
    pub use crate::store::{Container, ContainerStack, DeclarationProvider};
    pub use crate::symbol::{SymbolResolver, SymbolTable};
    pub use crate::value::{Instance, ParamValue, ParameterResponse, Value};
}
