use crate::{
    EngineError,
    engine::UnitOutput,
    identity::{IdScheme, MetadataId, ProducedKind},
};
use cloneforge_schema::{build::SchemaSnapshot, node::TypeDescriptor, types::AnnotationName};
use std::collections::BTreeSet;

///
/// Computation
///
/// Result of computing one unit: its output and every piece of metadata that
/// was read to produce it.
///

#[derive(Clone, Debug, Default)]
pub struct Computation {
    pub output: Option<UnitOutput>,
    pub reads: BTreeSet<MetadataId>,
}

///
/// UnitProvider
///
/// Produces the units of one kind for every type carrying its trigger.
///

pub trait UnitProvider: Send + Sync {
    fn kind(&self) -> &ProducedKind;

    fn trigger(&self) -> &AnnotationName;

    fn scheme(&self) -> IdScheme {
        IdScheme::new(self.kind().clone())
    }

    /// Compute the unit governed by `descriptor`. Reads may be left out of
    /// the returned set for the governing type itself; the engine always
    /// records it.
    fn compute(
        &self,
        descriptor: &TypeDescriptor,
        snapshot: &SchemaSnapshot,
    ) -> Result<Computation, EngineError>;
}
