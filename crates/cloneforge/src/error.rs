use cloneforge_core::{
    EngineError,
    config::ConfigError,
    error::ErrorClass,
    identity::IdentityError,
};
use cloneforge_schema::SchemaError;
use derive_more::Display;
use serde::Serialize;
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind taxonomy.
///

#[derive(Debug, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

///
/// ErrorKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    #[display("config")]
    Config,
    #[display("conflict")]
    Conflict,
    #[display("invalid")]
    Invalid,
    #[display("invariant_violation")]
    InvariantViolation,
    #[display("not_found")]
    NotFound,
}

impl From<ErrorClass> for ErrorKind {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::Conflict => Self::Conflict,
            ErrorClass::Invalid => Self::Invalid,
            ErrorClass::InvariantViolation => Self::InvariantViolation,
            ErrorClass::NotFound => Self::NotFound,
        }
    }
}

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        let kind = match &err {
            EngineError::Config(_) => ErrorKind::Config,
            err => err.class().into(),
        };

        Self::new(kind, err.to_string())
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        EngineError::from(err).into()
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, err.to_string())
    }
}

impl From<IdentityError> for Error {
    fn from(err: IdentityError) -> Self {
        Self::new(ErrorKind::Invalid, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloneforge_schema::types::{TypeKey, TypeName};

    #[test]
    fn engine_errors_keep_their_class() {
        let err = Error::from(EngineError::UnresolvedType(TypeKey::new("A", "src")));
        assert_eq!(err.kind, ErrorKind::NotFound);

        let err = Error::from(SchemaError::DuplicateType(TypeName::new("A")));
        assert_eq!(err.kind, ErrorKind::Invalid);
        assert_eq!(err.kind.to_string(), "invalid");
    }
}
