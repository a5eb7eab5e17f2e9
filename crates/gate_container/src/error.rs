//! Error types for declaration lookup and resolution.

/// Boxed error produced by user code (factories, module sources).
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

/// Errors raised while looking up or resolving services and parameters.
///
/// Every variant carries the name it failed on, so callers can tell
/// failures apart by kind and report the offending declaration.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// No declaration store in the active stack defines the service.
    #[error("the service \"{0}\" not found")]
    ServiceNotFound(String),

    /// No declaration store defines the parameter, or a reference uses a
    /// prefix that has no registered resolver.
    #[error("the parameter \"{0}\" is not defined")]
    ParameterNotDefined(String),

    /// The service declaration has no usable class path or factory.
    #[error("invalid configuration to service \"{0}\"")]
    ServiceConfiguration(String),

    /// A well-formed class path that the symbol resolver does not know.
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    /// A factory asked for a constructor argument that was not declared.
    #[error("missing argument '{argument}' for service \"{service}\"")]
    MissingArgument {
        /// The service being constructed.
        service: String,
        /// The argument name.
        argument: String,
    },

    /// A constructor argument has the wrong shape for the factory.
    #[error("argument '{argument}' for service \"{service}\" is not {expected}")]
    InvalidArgument {
        /// The service being constructed.
        service: String,
        /// The argument name.
        argument: String,
        /// What the factory expected.
        expected: &'static str,
    },

    /// The factory itself failed.
    #[error("failed to create service \"{service}\": {source}")]
    Factory {
        /// The service being constructed.
        service: String,
        /// The underlying failure.
        #[source]
        source: BoxError,
    },

    /// Nested resolution went deeper than the scope allows. This is how a
    /// dependency cycle ends.
    #[error("resolution depth limit ({limit}) exceeded while resolving \"{name}\"")]
    DepthExceeded {
        /// The name being resolved when the limit was hit.
        name: String,
        /// The configured limit.
        limit: usize,
    },

    /// A module source failed to produce its declarations.
    #[error("failed to load module \"{module}\": {source}")]
    Module {
        /// The module identifier.
        module: String,
        /// The underlying failure.
        #[source]
        source: BoxError,
    },
}

impl ContainerError {
    /// Returns the service, parameter, symbol or module name this error is about.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ServiceNotFound(name)
            | Self::ParameterNotDefined(name)
            | Self::ServiceConfiguration(name)
            | Self::SymbolNotFound(name)
            | Self::DepthExceeded { name, .. } => name,
            Self::MissingArgument { service, .. }
            | Self::InvalidArgument { service, .. }
            | Self::Factory { service, .. } => service,
            Self::Module { module, .. } => module,
        }
    }

    /// Returns `true` for the two "nothing declared under this name" kinds.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ServiceNotFound(_) | Self::ParameterNotDefined(_))
    }
}
