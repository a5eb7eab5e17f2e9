//! A layered dependency-resolution container.
//!

pub use gate_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use gate_internal::prelude::*;
}
