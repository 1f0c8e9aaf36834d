//! ## Crate layout
//! - `build`: the host-owned `Schema`, its immutable snapshots, and JSON loading.
//! - `error`: schema construction and resolution errors.
//! - `node`: type, field, method, and annotation descriptors.
//! - `types`: names, source paths, primitives, and declared field types.
//! - `validate`: identifier checks shared by the descriptor builders.

pub mod build;
pub mod error;
pub mod node;
pub mod types;
pub mod validate;

/// Maximum length for type and field identifiers.
pub const MAX_NAME_LEN: usize = 256;

/// Source path assigned to types that do not declare one.
pub const DEFAULT_SOURCE_PATH: &str = "src/main/java";

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        build::{Schema, SchemaSnapshot},
        error::SchemaError,
        node::*,
        types::{AnnotationName, FieldType, Primitive, SourcePath, TypeKey, TypeName},
    };
}

pub use build::{Schema, SchemaSnapshot};
pub use error::SchemaError;
