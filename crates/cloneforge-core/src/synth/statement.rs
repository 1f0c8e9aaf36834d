use cloneforge_schema::types::{FieldType, TypeName};
use serde::Serialize;

///
/// ValueCopy
///
/// How one value reaches the new instance.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum ValueCopy {
    /// Primitive value copy.
    Value,

    /// The reference itself is shared with the new instance.
    Alias,

    /// The referenced value is copied through its own copy method.
    Deep,
}

///
/// Statement
///
/// One step of a generated copy method, independent of any host syntax.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Statement {
    /// Construct the new instance with its default constructor.
    NewInstance { ty: TypeName },

    /// Add every element of a collection field to the new instance's
    /// collection, which the default constructor has already created.
    CopyElements {
        field: String,
        element: FieldType,
        copy: ValueCopy,
    },

    /// Assign one field of the new instance.
    Assign { field: String, copy: ValueCopy },

    Return,
}

impl Statement {
    /// Field written by this statement, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::CopyElements { field, .. } | Self::Assign { field, .. } => Some(field),
            Self::NewInstance { .. } | Self::Return => None,
        }
    }
}
