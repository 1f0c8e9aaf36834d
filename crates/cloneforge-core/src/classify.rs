//! Field classification.
//!
//! Decides how each field of a type takes part in a copy. Rules are applied
//! in order and the first match wins:
//!
//! 1. names in the exclusion set are `Excluded`
//! 2. static, transient and array fields are `Excluded` (and every collection
//!    under the legacy collection filter)
//! 3. the version field is `Excluded`
//! 4. collections split by element type into primitive, copyable and plain
//! 5. primitive scalars are `Primitive`
//! 6. references whose type carries the trigger, or whose field does, are
//!    `CopyableReference`
//! 7. everything else is a `PlainReference`

use cloneforge_schema::{
    build::SchemaSnapshot,
    node::{FieldDescriptor, TypeDescriptor},
    types::{AnnotationName, FieldType, TypeName},
};
use serde::Serialize;
use std::collections::BTreeSet;

///
/// FieldKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum FieldKind {
    Excluded,
    CollectionOfPrimitive,
    CollectionOfCopyable,
    CollectionOfPlain,
    Primitive,
    CopyableReference,
    PlainReference,
}

impl FieldKind {
    #[must_use]
    pub const fn participates(self) -> bool {
        !matches!(self, Self::Excluded)
    }

    #[must_use]
    pub const fn is_collection(self) -> bool {
        matches!(
            self,
            Self::CollectionOfPrimitive | Self::CollectionOfCopyable | Self::CollectionOfPlain
        )
    }
}

///
/// TriggerLookup
///
/// Answers whether a referenced type carries the trigger annotation.
///

pub trait TriggerLookup {
    fn carries_trigger(&self, ty: &TypeName, trigger: &AnnotationName) -> bool;
}

impl TriggerLookup for SchemaSnapshot {
    fn carries_trigger(&self, ty: &TypeName, trigger: &AnnotationName) -> bool {
        self.carries_annotation(ty, trigger)
    }
}

// an explicit set of copyable type names, for hosts without a schema
impl TriggerLookup for BTreeSet<TypeName> {
    fn carries_trigger(&self, ty: &TypeName, _: &AnnotationName) -> bool {
        self.contains(ty)
    }
}

///
/// ClassifyContext
///

pub struct ClassifyContext<'a> {
    pub exclude: &'a BTreeSet<String>,
    pub version_field: Option<&'a str>,
    pub trigger: &'a AnnotationName,
    pub types: &'a dyn TriggerLookup,
    pub legacy_collection_filter: bool,
}

impl ClassifyContext<'_> {
    fn is_copyable(&self, field: &FieldDescriptor, ty: &TypeName) -> bool {
        field.has_annotation(self.trigger) || self.types.carries_trigger(ty, self.trigger)
    }
}

///
/// ClassifiedField
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClassifiedField<'a> {
    pub field: &'a FieldDescriptor,
    pub kind: FieldKind,
}

/// Classify a single field.
#[must_use]
pub fn classify(field: &FieldDescriptor, ctx: &ClassifyContext<'_>) -> FieldKind {
    let flags = field.flags();
    let ty = field.ty();

    if ctx.exclude.contains(field.name()) {
        return FieldKind::Excluded;
    }
    if flags.is_static || flags.is_transient || flags.is_array || ty.is_array() {
        return FieldKind::Excluded;
    }
    if ctx.legacy_collection_filter && ty.is_collection() {
        return FieldKind::Excluded;
    }
    if flags.is_version || ctx.version_field == Some(field.name()) {
        return FieldKind::Excluded;
    }

    match ty {
        FieldType::Collection { element, .. } => match element.as_ref() {
            FieldType::Primitive(_) => FieldKind::CollectionOfPrimitive,
            FieldType::Named(name) if ctx.is_copyable(field, name) => {
                FieldKind::CollectionOfCopyable
            }
            _ => FieldKind::CollectionOfPlain,
        },
        FieldType::Primitive(_) => FieldKind::Primitive,
        FieldType::Named(name) if ctx.is_copyable(field, name) => FieldKind::CopyableReference,
        _ => FieldKind::PlainReference,
    }
}

/// Classify every field of a type, in the descriptor's field order.
#[must_use]
pub fn classify_fields<'a>(
    descriptor: &'a TypeDescriptor,
    ctx: &ClassifyContext<'_>,
) -> Vec<ClassifiedField<'a>> {
    descriptor
        .fields()
        .iter()
        .map(|field| ClassifiedField {
            field,
            kind: classify(field, ctx),
        })
        .collect()
}
