//! Application-level container.
//!
//! An [`ApplicationContainer`] knows how to assemble declarations from a list
//! of configured modules, and hands out one [`ApplicationContext`] per
//! execution context. Each context builds its own scope lazily on first
//! lookup, so concurrently running contexts never share cached instances.
//!
//! ```text
//! ApplicationContainer (settings, module stores, module sources, symbols)
//!    │
//!    ├── ApplicationContext (request 1) ── ContextContainer ── ContainerStack
//!    │
//!    └── ApplicationContext (request 2) ── ContextContainer ── ContainerStack
//! ```
//!
//! The context is passed explicitly: whoever handles a request creates a
//! context, threads it through the calls that need services, and drops it
//! when the request ends.

use crate::error::ContainerError;
use crate::scope::{ContextContainer, DEFAULT_MAX_DEPTH, SELF_SERVICE};
use crate::store::{Container, ContainerStack, DeclarationProvider};
use crate::symbol::{SymbolResolver, SymbolTable};
use crate::value::{Instance, Value};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

/// Name of the bootstrap parameter holding the application settings.
pub const SETTINGS_PARAMETER: &str = "settings";

/// Application settings.
///
/// `modules` lists module identifiers in configuration order; a module
/// listed later overrides declarations of the modules before it. Any other
/// keys are kept and exposed through the `settings` parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Module identifiers, e.g. `"app.billing"`.
    #[serde(default)]
    pub modules: Vec<String>,
    /// Everything else in the settings document.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Settings {
    /// Settings with the given modules and nothing else.
    #[must_use]
    pub fn with_modules<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modules: modules.into_iter().map(Into::into).collect(),
            extra: serde_json::Map::new(),
        }
    }
}

impl From<&Settings> for Value {
    fn from(settings: &Settings) -> Self {
        let mut map = indexmap::IndexMap::with_capacity(settings.extra.len() + 1);
        map.insert(
            "modules".to_owned(),
            Value::Sequence(settings.modules.iter().map(|m| Value::from(m.as_str())).collect()),
        );
        for (key, value) in &settings.extra {
            map.insert(key.clone(), Value::from(value.clone()));
        }
        Value::Mapping(map)
    }
}

/// Produces the declarations of a module.
///
/// Returns `Ok(None)` when the source has nothing for the module, so the
/// next source (if any) is tried.
pub trait ModuleSource: Send + Sync + 'static {
    /// Loads the declarations of `module`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Module`] if the module exists but cannot be read.
    fn load(&self, module: &str) -> Result<Option<Container>, ContainerError>;
}

struct ApplicationInner {
    settings: Settings,
    stores: HashMap<String, Arc<Container>>,
    sources: Vec<Box<dyn ModuleSource>>,
    symbols: Arc<dyn SymbolResolver>,
    max_depth: usize,
}

/// Configures an [`ApplicationContainer`].
pub struct ApplicationBuilder {
    inner: ApplicationInner,
}

impl ApplicationBuilder {
    /// Registers pre-built declarations for `module`.
    ///
    /// These take precedence over module sources for that module.
    #[must_use]
    pub fn module(mut self, module: impl Into<String>, container: Container) -> Self {
        self.inner.stores.insert(module.into(), Arc::new(container));
        self
    }

    /// Adds a module source, tried after the ones already added.
    #[must_use]
    pub fn source(mut self, source: impl ModuleSource) -> Self {
        self.inner.sources.push(Box::new(source));
        self
    }

    /// Sets the symbol resolver used for class-path declarations.
    #[must_use]
    pub fn symbols(mut self, symbols: impl SymbolResolver) -> Self {
        self.inner.symbols = Arc::new(symbols);
        self
    }

    /// Sets the per-thread resolution depth bound of every scope.
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.inner.max_depth = max_depth;
        self
    }

    /// Finishes configuration.
    #[must_use]
    pub fn build(self) -> ApplicationContainer {
        ApplicationContainer {
            inner: Arc::new(self.inner),
        }
    }
}

/// Assembles module declarations and creates per-context scopes.
///
/// Cheap to clone; clones share the same configuration.
///
/// # Example
///
/// ```
/// use gate_container::application::{ApplicationContainer, Settings};
/// use gate_container::store::Container;
/// use serde_json::json;
///
/// let app = ApplicationContainer::builder(Settings::with_modules(["base", "local"]))
///     .module("base", Container::new([("debug".to_owned(), json!(false))], []))
///     .module("local", Container::new([("debug".to_owned(), json!(true))], []))
///     .build();
///
/// let context = app.context();
/// assert_eq!(context.get_parameter("debug").unwrap().as_bool(), Some(true));
/// ```
#[derive(Clone)]
pub struct ApplicationContainer {
    inner: Arc<ApplicationInner>,
}

impl core::fmt::Debug for ApplicationContainer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApplicationContainer")
            .field("settings", &self.inner.settings)
            .field("stores", &self.inner.stores.keys().collect::<Vec<_>>())
            .field("sources", &self.inner.sources.len())
            .finish_non_exhaustive()
    }
}

impl ApplicationContainer {
    /// Starts configuring an application container for `settings`.
    #[must_use]
    pub fn builder(settings: Settings) -> ApplicationBuilder {
        ApplicationBuilder {
            inner: ApplicationInner {
                settings,
                stores: HashMap::new(),
                sources: Vec::new(),
                symbols: Arc::new(SymbolTable::new()),
                max_depth: DEFAULT_MAX_DEPTH,
            },
        }
    }

    /// The application settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Opens a new execution context.
    #[must_use]
    pub fn context(&self) -> ApplicationContext {
        ApplicationContext {
            app: self.clone(),
            scope: OnceLock::new(),
        }
    }

    /// Assembles the declaration stack for a new context.
    ///
    /// Modules nothing can provide are skipped. The result lists the last
    /// configured module first, so later modules override earlier ones.
    ///
    /// # Errors
    ///
    /// Propagates module source failures.
    pub fn build_stack(&self) -> Result<ContainerStack, ContainerError> {
        let mut providers: Vec<Arc<dyn DeclarationProvider>> = Vec::new();
        for module in &self.inner.settings.modules {
            match self.load_module(module)? {
                Some(container) => providers.push(container),
                None => tracing::debug!(module = %module, "module has no declarations, skipping"),
            }
        }
        providers.reverse();
        Ok(ContainerStack::from_providers(providers))
    }

    fn load_module(
        &self,
        module: &str,
    ) -> Result<Option<Arc<dyn DeclarationProvider>>, ContainerError> {
        if let Some(store) = self.inner.stores.get(module) {
            return Ok(Some(Arc::clone(store) as Arc<dyn DeclarationProvider>));
        }
        for source in &self.inner.sources {
            if let Some(container) = source.load(module)? {
                return Ok(Some(Arc::new(container)));
            }
        }
        Ok(None)
    }

    fn build_scope(&self) -> Result<Arc<ContextContainer>, ContainerError> {
        let stack = self.build_stack()?;
        tracing::debug!(providers = stack.len(), "building context scope");
        let scope = ContextContainer::build(
            Arc::new(stack),
            Arc::clone(&self.inner.symbols),
            self.inner.max_depth,
        );
        scope.insert_parameter(SETTINGS_PARAMETER, Value::from(&self.inner.settings));
        Ok(scope)
    }
}

/// One execution context of an [`ApplicationContainer`].
///
/// The scope behind it is created on the first lookup and lives exactly as
/// long as the context. Contexts are independent: instances resolved in one
/// are never visible in another.
pub struct ApplicationContext {
    app: ApplicationContainer,
    scope: OnceLock<Arc<ContextContainer>>,
}

impl core::fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("initialized", &self.scope.get().is_some())
            .finish_non_exhaustive()
    }
}

impl ApplicationContext {
    /// Returns this context's scope, building it on first access.
    ///
    /// # Errors
    ///
    /// Propagates module source failures while assembling the stack.
    pub fn scope(&self) -> Result<&Arc<ContextContainer>, ContainerError> {
        if let Some(scope) = self.scope.get() {
            return Ok(scope);
        }
        let scope = self.app.build_scope()?;
        Ok(self.scope.get_or_init(|| scope))
    }

    /// The application this context belongs to.
    #[must_use]
    pub fn application(&self) -> &ApplicationContainer {
        &self.app
    }

    /// Returns `true` if `name` can be looked up as a service.
    ///
    /// `"container"` is always available. A context whose stack cannot be
    /// built reports `false` for everything else.
    #[must_use]
    pub fn has_service(&self, name: &str) -> bool {
        name == SELF_SERVICE || self.scope().is_ok_and(|scope| scope.has_service(name))
    }

    /// Returns `true` if `name` can be looked up as a parameter.
    #[must_use]
    pub fn has_parameter(&self, name: &str) -> bool {
        self.scope().is_ok_and(|scope| scope.has_parameter(name))
    }

    /// See [`ContextContainer::get_service`].
    ///
    /// # Errors
    ///
    /// Fails if the scope cannot be built or the service cannot be resolved.
    pub fn get_service(&self, name: &str) -> Result<Instance, ContainerError> {
        self.scope()?.get_service(name)
    }

    /// See [`ContextContainer::get_parameter`].
    ///
    /// # Errors
    ///
    /// Fails if the scope cannot be built or the parameter cannot be resolved.
    pub fn get_parameter(&self, name: &str) -> Result<Value, ContainerError> {
        self.scope()?.get_parameter(name)
    }
}
