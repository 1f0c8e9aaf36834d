use crate::{
    EngineError,
    identity::{MetadataId, field_id, type_id},
};
use cloneforge_schema::{build::SchemaSnapshot, types::TypeKey};

///
/// ChangeNotice
///
/// Tells the engine that one piece of upstream metadata changed, carrying
/// the schema snapshot the change is visible in.
///

#[derive(Clone, Debug)]
pub struct ChangeNotice {
    pub upstream: MetadataId,
    pub snapshot: SchemaSnapshot,
}

impl ChangeNotice {
    #[must_use]
    pub const fn new(upstream: MetadataId, snapshot: SchemaSnapshot) -> Self {
        Self { upstream, snapshot }
    }

    pub fn type_changed(key: &TypeKey, snapshot: SchemaSnapshot) -> Result<Self, EngineError> {
        Ok(Self::new(type_id(key)?, snapshot))
    }

    pub fn field_changed(
        key: &TypeKey,
        field: &str,
        snapshot: SchemaSnapshot,
    ) -> Result<Self, EngineError> {
        Ok(Self::new(field_id(key, field)?, snapshot))
    }
}
