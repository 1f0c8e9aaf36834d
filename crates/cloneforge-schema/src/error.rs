use crate::types::{SourcePath, TypeName};
use thiserror::Error as ThisError;

///
/// SchemaError
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("schema document is malformed: {0}")]
    Document(String),

    #[error("duplicate field '{field}' on type '{type_name}'")]
    DuplicateField { type_name: TypeName, field: String },

    #[error("duplicate type '{0}' in schema document")]
    DuplicateType(TypeName),

    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("invalid declared type '{text}': {reason}")]
    InvalidType { text: String, reason: String },

    #[error("type '{type_name}' is already declared at '{existing}', not '{requested}'")]
    PathConflict {
        type_name: TypeName,
        existing: SourcePath,
        requested: SourcePath,
    },

    #[error("type '{type_name}' could not be resolved at source path '{path}'")]
    UnresolvedType { type_name: TypeName, path: SourcePath },
}

impl SchemaError {
    pub(crate) fn invalid_name(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_type(text: &str, reason: impl Into<String>) -> Self {
        Self::InvalidType {
            text: text.to_string(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn is_unresolved(&self) -> bool {
        matches!(self, Self::UnresolvedType { .. })
    }
}
