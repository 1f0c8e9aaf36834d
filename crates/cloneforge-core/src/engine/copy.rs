use crate::{
    EngineError,
    classify::{ClassifiedField, ClassifyContext, classify_fields},
    config::CopyConfig,
    engine::{ChangeNotice, Computation, UnitOutput, UnitProvider},
    identity::{MetadataId, ProducedKind, field_id, type_id, type_name_id},
    synth::{SynthOptions, Synthesis, synthesize},
};
use cloneforge_schema::{
    build::{Schema, SchemaSnapshot},
    node::{Annotation, TypeDescriptor},
    types::{AnnotationName, FieldType, TypeName},
};
use std::collections::BTreeSet;

///
/// CopyProvider
///
/// Produces a copy method for every type carrying the configured trigger.
///

#[derive(Clone, Debug)]
pub struct CopyProvider {
    config: CopyConfig,
    kind: ProducedKind,
    trigger: AnnotationName,
}

impl CopyProvider {
    #[must_use]
    pub fn new(config: CopyConfig) -> Self {
        let trigger = config.trigger_name();

        Self {
            config,
            kind: ProducedKind::COPY,
            trigger,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &CopyConfig {
        &self.config
    }

    /// Configured exclusions plus those listed on the type's trigger.
    /// Names that match no field are kept and simply never apply.
    #[must_use]
    pub fn exclusions(&self, descriptor: &TypeDescriptor) -> BTreeSet<String> {
        let mut exclude = self.config.exclude.clone();

        if let Some(annotation) = descriptor.annotation(&self.trigger) {
            exclude.extend(
                annotation
                    .values(&self.config.exclude_attribute)
                    .iter()
                    .flat_map(|v| split_names(v))
                    .map(str::to_string),
            );
        }

        exclude
    }

    /// Mark a type with the trigger, listing the given exclusions, and
    /// describe the change for the engine.
    pub fn annotate_type(
        &self,
        schema: &mut Schema,
        name: &TypeName,
        exclude: &BTreeSet<String>,
    ) -> Result<ChangeNotice, EngineError> {
        let mut annotation = Annotation::marker(self.config.trigger.as_str());
        if !exclude.is_empty() {
            annotation =
                annotation.with_values(&self.config.exclude_attribute, exclude.iter().cloned());
        }

        let descriptor = schema.update(name, |builder| builder.annotation(annotation))?;

        ChangeNotice::type_changed(descriptor.key(), schema.snapshot())
    }

    /// Remove the trigger from a type and describe the change for the engine.
    pub fn remove_trigger(
        &self,
        schema: &mut Schema,
        name: &TypeName,
    ) -> Result<ChangeNotice, EngineError> {
        let descriptor = schema.update(name, |builder| builder.remove_annotation(&self.trigger))?;

        ChangeNotice::type_changed(descriptor.key(), schema.snapshot())
    }

    fn reads(
        descriptor: &TypeDescriptor,
        fields: &[ClassifiedField<'_>],
        snapshot: &SchemaSnapshot,
    ) -> Result<BTreeSet<MetadataId>, EngineError> {
        let key = descriptor.key();
        let mut reads = BTreeSet::new();
        reads.insert(type_id(key)?);

        for classified in fields {
            reads.insert(field_id(key, classified.field.name())?);

            if !classified.kind.participates() {
                continue;
            }
            let Some(name) = referenced_type(classified.field.ty()) else {
                continue;
            };
            // the name is read even when nothing resolves yet
            reads.insert(type_name_id(name)?);
            if let Some(consulted) = snapshot.lookup(name) {
                reads.insert(type_id(consulted.key())?);
            }
        }

        Ok(reads)
    }
}

impl UnitProvider for CopyProvider {
    fn kind(&self) -> &ProducedKind {
        &self.kind
    }

    fn trigger(&self) -> &AnnotationName {
        &self.trigger
    }

    fn compute(
        &self,
        descriptor: &TypeDescriptor,
        snapshot: &SchemaSnapshot,
    ) -> Result<Computation, EngineError> {
        let exclude = self.exclusions(descriptor);
        let ctx = ClassifyContext {
            exclude: &exclude,
            version_field: self.config.version_field.as_deref(),
            trigger: &self.trigger,
            types: snapshot,
            legacy_collection_filter: self.config.legacy_collection_filter,
        };
        let fields = classify_fields(descriptor, &ctx);
        let reads = Self::reads(descriptor, &fields, snapshot)?;

        let output = match synthesize(descriptor, &fields, &SynthOptions::from(&self.config))? {
            Synthesis::Empty => None,
            Synthesis::Existing { method, exact } => Some(UnitOutput::Existing { method, exact }),
            Synthesis::Generated(method) => Some(UnitOutput::Generated(method)),
        };

        Ok(Computation { output, reads })
    }
}

// type whose trigger a field's classification depends on
fn referenced_type(ty: &FieldType) -> Option<&TypeName> {
    match ty {
        FieldType::Named(name) => Some(name),
        FieldType::Collection { element, .. } => element.type_name(),
        _ => None,
    }
}

fn split_names(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
}
