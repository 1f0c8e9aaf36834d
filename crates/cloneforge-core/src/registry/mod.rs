//! Registries owned by the engine.
//!
//! - `dependency`: upstream/downstream edges between metadata identifiers.
//! - `trigger`: which provider produces units for which trigger annotation.

pub mod dependency;
pub mod trigger;

pub use dependency::DependencyRegistry;
pub use trigger::TriggerRegistry;
