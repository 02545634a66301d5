//! Cross-module tests for the session pipeline.
//!
//! - `determinism.rs`: same seed and inputs give identical runs
//! - `integration.rs`: full wave cycles through a [`Session`](crate::session::Session)
//! - `properties.rs`: proptest properties of quota, population and spawning
//! - `helpers.rs`: test setup utilities and factory functions

mod helpers;

// Re-export for convenience
pub use helpers::*;
