use crate::types::AnnotationName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Annotation
///
/// A marker on a type, optionally carrying list-valued attributes
/// (`excludeFields = {"a", "b"}`).
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Annotation {
    pub name: AnnotationName,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, Vec<String>>,
}

impl Annotation {
    /// Create an attribute-free marker annotation.
    pub fn marker(name: impl Into<String>) -> Self {
        Self {
            name: AnnotationName::new(name),
            values: BTreeMap::new(),
        }
    }

    /// Set a list-valued attribute, replacing any previous value.
    #[must_use]
    pub fn with_values<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values
            .insert(key.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Values of an attribute, empty when unset.
    #[must_use]
    pub fn values(&self, key: &str) -> &[String] {
        self.values.get(key).map_or(&[], Vec::as_slice)
    }
}
