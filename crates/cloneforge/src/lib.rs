//! ## Crate layout
//! - `core`: classification, synthesis, identifiers and the incremental engine.
//! - `schema`: type, field and method descriptors plus the host-owned schema.
//! - `error`: public error type with a stable kind taxonomy.
//!
//! `#[derive(Copyable)]` generates the same copy method for Rust structs that
//! the engine renders for schema types.

pub use cloneforge_core as core;
pub use cloneforge_schema as schema;

pub mod error;

pub use cloneforge_derive::Copyable;
pub use error::{Error, ErrorKind};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Copyable,
        core::prelude::*,
        error::{Error, ErrorKind},
        schema::prelude::*,
    };
}
