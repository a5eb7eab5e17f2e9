//! Reference strings.
//!
//! A string of the form `"<prefix>::<payload>"` is a reference rather than a
//! literal. `parameter::` and `service::` are built in; any other word prefix
//! is handled by a service named `container.<prefix>_resolver`.

use regex::Regex;
use std::sync::LazyLock;

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)::").expect("reference pattern is valid"));

/// Prefix of references to other parameters.
pub const PARAMETER_PREFIX: &str = "parameter";

/// Prefix of references to services.
pub const SERVICE_PREFIX: &str = "service";

/// What a reference string points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind<'a> {
    /// `parameter::<name>`.
    Parameter(&'a str),
    /// `service::<name>`.
    Service(&'a str),
    /// Any other prefix, delegated to a resolver service.
    Custom {
        /// The word before `::`.
        prefix: &'a str,
    },
}

/// A parsed reference string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    raw: &'a str,
    prefix: &'a str,
    payload: &'a str,
}

impl<'a> Reference<'a> {
    /// Parses `raw`, returning `None` if it is a plain literal.
    #[must_use]
    pub fn parse(raw: &'a str) -> Option<Self> {
        let captures = REFERENCE.captures(raw)?;
        let prefix = captures.get(1)?.as_str();
        let end = captures.get(0)?.end();
        Some(Self {
            raw,
            prefix,
            payload: &raw[end..],
        })
    }

    /// Returns `true` if `raw` is a reference string.
    #[must_use]
    pub fn is_reference(raw: &str) -> bool {
        REFERENCE.is_match(raw)
    }

    /// The whole original string.
    #[must_use]
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// The word before `::`.
    #[must_use]
    pub fn prefix(&self) -> &'a str {
        self.prefix
    }

    /// Everything after the first `::`.
    #[must_use]
    pub fn payload(&self) -> &'a str {
        self.payload
    }

    /// Classifies the reference.
    ///
    /// Built-in prefixes need a non-empty payload; `"parameter::"` on its own
    /// is treated like any other custom prefix.
    #[must_use]
    pub fn kind(&self) -> ReferenceKind<'a> {
        match self.prefix {
            PARAMETER_PREFIX if !self.payload.is_empty() => ReferenceKind::Parameter(self.payload),
            SERVICE_PREFIX if !self.payload.is_empty() => ReferenceKind::Service(self.payload),
            prefix => ReferenceKind::Custom { prefix },
        }
    }
}

/// Name of the service that resolves references with the given prefix.
#[must_use]
pub fn resolver_service_name(prefix: &str) -> String {
    format!("container.{prefix}_resolver")
}
