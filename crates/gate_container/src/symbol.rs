//! Class-path symbol resolution.
//!
//! Declarations written as `class: "<module-path>:<symbol>"` name their
//! factory indirectly. A [`SymbolResolver`] turns that path into a
//! [`Factory`]; the default [`SymbolTable`] is a registry the host fills in
//! at startup.

use crate::factory::Factory;
use hashbrown::HashMap;
use std::sync::Arc;

/// Turns a class path into a factory.
pub trait SymbolResolver: Send + Sync + 'static {
    /// Looks up `path`, returning `None` if it is unknown.
    fn resolve(&self, path: &str) -> Option<Arc<dyn Factory>>;
}

/// Splits a class path into its module path and symbol.
///
/// Returns `None` unless both halves are non-empty.
#[must_use]
pub fn split_class_path(path: &str) -> Option<(&str, &str)> {
    let (module, symbol) = path.split_once(':')?;
    if module.is_empty() || symbol.is_empty() || symbol.contains(':') {
        return None;
    }
    Some((module, symbol))
}

/// Registry of factories keyed by class path.
///
/// # Example
///
/// ```
/// use gate_container::factory::Arguments;
/// use gate_container::symbol::{SymbolResolver, SymbolTable};
/// use gate_container::value::Instance;
///
/// struct Mailer;
///
/// let symbols = SymbolTable::new()
///     .with("app.mail:Mailer", |_: Arguments| Ok(Instance::new(Mailer)));
///
/// assert!(symbols.resolve("app.mail:Mailer").is_some());
/// assert!(symbols.resolve("app.mail:Other").is_none());
/// ```
#[derive(Default, Clone)]
pub struct SymbolTable {
    symbols: HashMap<String, Arc<dyn Factory>>,
}

impl core::fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SymbolTable")
            .field("symbols", &self.paths().collect::<Vec<_>>())
            .finish()
    }
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `path`, replacing any previous one.
    pub fn register(&mut self, path: impl Into<String>, factory: impl Factory) -> &mut Self {
        self.symbols.insert(path.into(), Arc::new(factory));
        self
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, factory: impl Factory) -> Self {
        self.register(path, factory);
        self
    }

    /// Copies every symbol of `other` into this table.
    pub fn extend(&mut self, other: &SymbolTable) {
        for (path, factory) in &other.symbols {
            self.symbols.insert(path.clone(), Arc::clone(factory));
        }
    }

    /// Returns `true` if `path` is registered.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.symbols.contains_key(path)
    }

    /// Iterates over the registered class paths.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }
}

impl SymbolResolver for SymbolTable {
    fn resolve(&self, path: &str) -> Option<Arc<dyn Factory>> {
        self.symbols.get(path).cloned()
    }
}
