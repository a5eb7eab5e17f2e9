//! Per-execution-context resolution scope.
//!
//! A [`ContextContainer`] wraps a backing [`DeclarationProvider`] (normally a
//! [`ContainerStack`](crate::store::ContainerStack)) and owns the caches of
//! everything resolved in one execution context: one request, one task, one
//! command run.
//!
//! # Resolution states
//!
//! ```text
//! services and persisted parameters:  UNRESOLVED → RESOLVING → CACHED
//! other parameters:                   UNRESOLVED → RESOLVING → (returned, not cached)
//! ```
//!
//! Once a name is cached, the cached result is returned verbatim for the rest
//! of the scope's life.
//!
//! # Lookup order
//!
//! 1. the literal service name `"container"` (the scope itself)
//! 2. this scope's caches, including bindings seeded with
//!    [`insert_parameter`](ContextContainer::insert_parameter) and
//!    [`insert_service`](ContextContainer::insert_service)
//! 3. the backing provider
//!
//! # Concurrency
//!
//! Caches are behind `RwLock`s that are never held while a factory or
//! resolver runs. Two threads racing on the same unresolved name may both
//! build it; the first result stored wins and both callers get that one.
//!
//! # Cycles
//!
//! Dependency cycles are not detected. Each thread's resolution depth is
//! bounded instead, so a cycle ends in [`ContainerError::DepthExceeded`]
//! rather than a stack overflow. One level is one service instantiation, one
//! declared parameter or one custom-prefix reference; a `parameter::` or
//! `service::` string passed to
//! [`get_parameter`](ContextContainer::get_parameter) is counted at the
//! lookup it names, so a chain of services costs one level per service.

use crate::error::ContainerError;
use crate::reference::{Reference, ReferenceKind};
use crate::resolver::{ParameterResolver, ServiceResolver};
use crate::store::DeclarationProvider;
use crate::symbol::{SymbolResolver, SymbolTable};
use crate::value::{Instance, ParamValue, Value};
use core::cell::Cell;
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// Service name under which a scope exposes itself.
pub const SELF_SERVICE: &str = "container";

/// Default bound on nested resolutions per thread.
///
/// Counts service instantiations, declared parameters and custom-prefix
/// references; built-in reference strings do not add a level of their own.
pub const DEFAULT_MAX_DEPTH: usize = 128;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Tracks one level of nested resolution on the current thread.
struct DepthGuard;

impl DepthGuard {
    fn enter(name: &str, limit: usize) -> Result<Self, ContainerError> {
        let depth = DEPTH.with(Cell::get);
        if depth >= limit {
            return Err(ContainerError::DepthExceeded {
                name: name.to_owned(),
                limit,
            });
        }
        DEPTH.with(|d| d.set(depth + 1));
        Ok(Self)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// The resolution scope of one execution context.
///
/// Always handled through an `Arc`, so that `get_service("container")` can
/// hand out the scope itself.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use gate_container::declaration::ServiceDeclaration;
/// use gate_container::factory::Arguments;
/// use gate_container::scope::ContextContainer;
/// use gate_container::store::Container;
/// use gate_container::value::Instance;
/// use serde_json::json;
///
/// struct DbClient { host: String }
///
/// let declarations = Container::new(
///     [("db_host".to_owned(), json!("localhost"))],
///     [(
///         "db".to_owned(),
///         ServiceDeclaration::factory(|args: Arguments| {
///             Ok(Instance::new(DbClient { host: args.str("host")?.to_owned() }))
///         })
///         .with_parameter("host", "parameter::db_host"),
///     )],
/// );
///
/// let scope = ContextContainer::new(Arc::new(declarations));
/// let db = scope.get_service("db").unwrap();
/// assert_eq!(db.downcast_ref::<DbClient>().unwrap().host, "localhost");
/// assert!(db.ptr_eq(&scope.get_service("db").unwrap()));
/// ```
pub struct ContextContainer {
    this: Weak<ContextContainer>,
    backing: Arc<dyn DeclarationProvider>,
    symbols: Arc<dyn SymbolResolver>,
    max_depth: usize,
    instances: RwLock<HashMap<String, Instance>>,
    values: RwLock<HashMap<String, Value>>,
}

impl core::fmt::Debug for ContextContainer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ContextContainer")
            .field("instances", &self.instances.read().len())
            .field("values", &self.values.read().len())
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl ContextContainer {
    /// Creates a scope over `backing` with an empty symbol table.
    #[must_use]
    pub fn new(backing: Arc<dyn DeclarationProvider>) -> Arc<Self> {
        Self::with_symbols(backing, Arc::new(SymbolTable::new()))
    }

    /// Creates a scope over `backing` that resolves class paths with `symbols`.
    #[must_use]
    pub fn with_symbols(
        backing: Arc<dyn DeclarationProvider>,
        symbols: Arc<dyn SymbolResolver>,
    ) -> Arc<Self> {
        Self::build(backing, symbols, DEFAULT_MAX_DEPTH)
    }

    /// Creates a scope with an explicit resolution depth bound.
    #[must_use]
    pub fn build(
        backing: Arc<dyn DeclarationProvider>,
        symbols: Arc<dyn SymbolResolver>,
        max_depth: usize,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            backing,
            symbols,
            max_depth,
            instances: RwLock::new(HashMap::new()),
            values: RwLock::new(HashMap::new()),
        })
    }

    /// The symbol resolver used for class-path declarations.
    #[must_use]
    pub fn symbols(&self) -> &dyn SymbolResolver {
        &*self.symbols
    }

    /// The backing declaration provider.
    #[must_use]
    pub fn backing(&self) -> &Arc<dyn DeclarationProvider> {
        &self.backing
    }

    /// Seeds a parameter value. It shadows any backing declaration.
    pub fn insert_parameter(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.write().insert(name.into(), value.into());
    }

    /// Seeds a service instance. It shadows any backing declaration.
    pub fn insert_service(&self, name: impl Into<String>, instance: Instance) {
        self.instances.write().insert(name.into(), instance);
    }

    /// Returns `true` if `name` can be looked up as a service.
    #[must_use]
    pub fn has_service(&self, name: &str) -> bool {
        name == SELF_SERVICE
            || self.instances.read().contains_key(name)
            || self.backing.has_service(name)
    }

    /// Returns `true` if `name` can be looked up as a parameter.
    #[must_use]
    pub fn has_parameter(&self, name: &str) -> bool {
        self.values.read().contains_key(name) || self.backing.has_parameter(name)
    }

    /// Returns `true` if service `name` has already been instantiated here.
    #[must_use]
    pub fn is_instantiated(&self, name: &str) -> bool {
        self.instances.read().contains_key(name)
    }

    /// Returns the instance of service `name`, building it on first use.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::ServiceNotFound`] if no declaration exists
    /// - any failure from instantiating the service
    pub fn get_service(&self, name: &str) -> Result<Instance, ContainerError> {
        if name == SELF_SERVICE {
            return self.handle();
        }
        if let Some(instance) = self.instances.read().get(name) {
            tracing::trace!(service = name, "service cache hit");
            return Ok(instance.clone());
        }

        let _depth = DepthGuard::enter(name, self.max_depth)?;
        let declaration = self.backing.get_service(name)?;
        let instance = ServiceResolver::new(self).resolve(name, &declaration)?;

        Ok(self
            .instances
            .write()
            .entry(name.to_owned())
            .or_insert(instance)
            .clone())
    }

    /// Returns the value of parameter `name`.
    ///
    /// A declared parameter is always looked up by its name, even when the
    /// name contains `::`. Otherwise `name` may itself be a reference string
    /// such as `"parameter::db_host"`, which is resolved directly. The result
    /// is cached only if resolution asked for it.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::ParameterNotDefined`] if no declaration exists
    /// - any failure from resolving references inside the value
    pub fn get_parameter(&self, name: &str) -> Result<Value, ContainerError> {
        if let Some(value) = self.values.read().get(name) {
            tracing::trace!(parameter = name, "parameter cache hit");
            return Ok(value.clone());
        }

        let resolver = ParameterResolver::new(self);
        let response = if self.backing.has_parameter(name) {
            let _depth = DepthGuard::enter(name, self.max_depth)?;
            let declared: Arc<ParamValue> = self.backing.get_parameter(name)?;
            resolver.resolve(&declared)?
        } else if let Some(reference) = Reference::parse(name) {
            let _depth = match reference.kind() {
                ReferenceKind::Custom { .. } => Some(DepthGuard::enter(name, self.max_depth)?),
                ReferenceKind::Parameter(_) | ReferenceKind::Service(_) => None,
            };
            resolver.resolve_str(name)?
        } else {
            return Err(ContainerError::ParameterNotDefined(name.to_owned()));
        };
        tracing::debug!(parameter = name, persist = response.persist, "resolved parameter");

        if !response.persist {
            return Ok(response.value);
        }
        Ok(self
            .values
            .write()
            .entry(name.to_owned())
            .or_insert(response.value)
            .clone())
    }

    fn handle(&self) -> Result<Instance, ContainerError> {
        self.this
            .upgrade()
            .map(Instance::from_arc)
            .ok_or_else(|| ContainerError::ServiceNotFound(SELF_SERVICE.to_owned()))
    }
}
