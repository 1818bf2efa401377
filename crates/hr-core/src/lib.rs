//! hr-core: shared types, IDs, errors, and configuration.
//!
//! This crate is the foundational dependency for all other hr-* crates,
//! providing type-safe identifiers, a unified error type, the row and
//! item-kind enums, and the configuration that drives the row engine.

pub mod config;
pub mod error;
pub mod ids;
pub mod rows;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::*;
pub use rows::*;
