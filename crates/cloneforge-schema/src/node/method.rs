use crate::types::FieldType;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// MethodSignature
///
/// A method already declared on a type by the user.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MethodSignature {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<FieldType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<FieldType>,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type: None,
        }
    }

    #[must_use]
    pub fn with_param(mut self, param: FieldType) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn returning(mut self, ty: FieldType) -> Self {
        self.return_type = Some(ty);
        self
    }

    #[must_use]
    pub const fn is_zero_arg(&self) -> bool {
        self.params.is_empty()
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "{}({params})", self.name)
    }
}
