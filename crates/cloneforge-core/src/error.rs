use crate::{
    config::ConfigError,
    identity::{IdentityError, MetadataId, ProducedKind},
};
use cloneforge_schema::{
    SchemaError,
    types::{TypeKey, TypeName},
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// EngineError
///
/// Failures raised while computing or storing generated units. A failure
/// affects only the unit being computed.
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum EngineError {
    #[error("'{type_name}' already declares conflicting method '{existing}'")]
    AmbiguousMethodConflict { type_name: TypeName, existing: String },

    #[error("unit '{0}' is already being computed")]
    ComputationInFlight(MetadataId),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unit '{id}' is bound to {existing}, refusing to bind it to {requested}")]
    DuplicateUnit {
        id: MetadataId,
        existing: TypeKey,
        requested: TypeKey,
    },

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("a provider for kind '{0}' is already registered")]
    ProviderAlreadyRegistered(ProducedKind),

    #[error(transparent)]
    Schema(SchemaError),

    #[error("type {0} could not be resolved")]
    UnresolvedType(TypeKey),
}

impl EngineError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::AmbiguousMethodConflict { .. }
            | Self::ComputationInFlight(_)
            | Self::ProviderAlreadyRegistered(_) => ErrorClass::Conflict,
            Self::Config(_) | Self::Identity(_) | Self::Schema(_) => ErrorClass::Invalid,
            Self::DuplicateUnit { .. } => ErrorClass::InvariantViolation,
            Self::UnresolvedType(_) => ErrorClass::NotFound,
        }
    }
}

impl From<SchemaError> for EngineError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::UnresolvedType { type_name, path } => {
                Self::UnresolvedType(TypeKey::new(type_name, path))
            }
            err => Self::Schema(err),
        }
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Conflict,
    Invalid,
    InvariantViolation,
    NotFound,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Conflict => "conflict",
            Self::Invalid => "invalid",
            Self::InvariantViolation => "invariant_violation",
            Self::NotFound => "not_found",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_schema_errors_become_not_found() {
        let err = EngineError::from(SchemaError::UnresolvedType {
            type_name: TypeName::new("com.example.Person"),
            path: "src/main/java".into(),
        });

        assert!(matches!(err, EngineError::UnresolvedType(_)));
        assert_eq!(err.class(), ErrorClass::NotFound);
        assert_eq!(err.class().to_string(), "not_found");
    }

    #[test]
    fn other_schema_errors_stay_invalid() {
        let err = EngineError::from(SchemaError::DuplicateType(TypeName::new("A")));

        assert!(matches!(err, EngineError::Schema(_)));
        assert_eq!(err.class(), ErrorClass::Invalid);
    }
}
