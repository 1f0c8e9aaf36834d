use crate::types::{AnnotationName, FieldType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

///
/// FieldFlags
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct FieldFlags {
    pub is_static: bool,
    pub is_transient: bool,
    pub is_array: bool,
    pub is_version: bool,
}

///
/// FieldDescriptor
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldDescriptor {
    name: String,
    ty: FieldType,
    flags: FieldFlags,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    annotations: BTreeSet<AnnotationName>,
}

impl FieldDescriptor {
    /// Create a field; the array flag follows the declared type.
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        let flags = FieldFlags {
            is_array: ty.is_array(),
            ..FieldFlags::default()
        };

        Self {
            name: name.into(),
            ty,
            flags,
            annotations: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags = FieldFlags {
            is_array: flags.is_array || self.ty.is_array(),
            ..flags
        };
        self
    }

    #[must_use]
    pub fn set_static(mut self) -> Self {
        self.flags.is_static = true;
        self
    }

    #[must_use]
    pub fn set_transient(mut self) -> Self {
        self.flags.is_transient = true;
        self
    }

    #[must_use]
    pub fn set_version(mut self) -> Self {
        self.flags.is_version = true;
        self
    }

    #[must_use]
    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.insert(AnnotationName::new(annotation));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn ty(&self) -> &FieldType {
        &self.ty
    }

    #[must_use]
    pub const fn flags(&self) -> FieldFlags {
        self.flags
    }

    pub fn annotations(&self) -> impl Iterator<Item = &AnnotationName> {
        self.annotations.iter()
    }

    #[must_use]
    pub fn has_annotation(&self, name: &AnnotationName) -> bool {
        self.annotations.iter().any(|a| a.matches(name))
    }
}
