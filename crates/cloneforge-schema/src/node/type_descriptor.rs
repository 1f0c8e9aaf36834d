use crate::{
    SchemaError,
    node::{Annotation, FieldDescriptor, MethodSignature},
    types::{AnnotationName, SourcePath, TypeKey, TypeName},
    validate::{validate_field_name, validate_source_path, validate_type_name},
};
use serde::Serialize;
use std::collections::BTreeMap;

///
/// TypeDescriptor
///
/// Immutable description of one type. Fields and annotations are always held
/// in name order so that anything derived from a descriptor is reproducible
/// regardless of the order members were discovered in.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TypeDescriptor {
    key: TypeKey,
    annotations: Vec<Annotation>,
    fields: Vec<FieldDescriptor>,
    methods: Vec<MethodSignature>,
}

impl TypeDescriptor {
    #[must_use]
    pub fn builder(key: TypeKey) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder::new(key)
    }

    /// Reopen this descriptor for modification; the original is untouched.
    #[must_use]
    pub fn to_builder(&self) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            key: self.key.clone(),
            annotations: self
                .annotations
                .iter()
                .map(|a| (a.name.clone(), a.clone()))
                .collect(),
            fields: self.fields.clone(),
            methods: self.methods.clone(),
        }
    }

    #[must_use]
    pub const fn key(&self) -> &TypeKey {
        &self.key
    }

    #[must_use]
    pub const fn name(&self) -> &TypeName {
        &self.key.name
    }

    #[must_use]
    pub const fn path(&self) -> &SourcePath {
        &self.key.path
    }

    /// Declared fields, sorted by name.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .binary_search_by(|f| f.name().cmp(name))
            .ok()
            .map(|i| &self.fields[i])
    }

    /// Methods declared directly on this type, in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }

    pub fn methods_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a MethodSignature> + 'a {
        self.methods.iter().filter(move |m| m.name == name)
    }

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    #[must_use]
    pub fn annotation(&self, name: &AnnotationName) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name.matches(name))
    }

    #[must_use]
    pub fn has_annotation(&self, name: &AnnotationName) -> bool {
        self.annotation(name).is_some()
    }

    /// The field flagged as the optimistic-locking version, if any.
    #[must_use]
    pub fn version_field(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.flags().is_version)
    }
}

///
/// TypeDescriptorBuilder
///

#[derive(Clone, Debug)]
pub struct TypeDescriptorBuilder {
    key: TypeKey,
    annotations: BTreeMap<AnnotationName, Annotation>,
    fields: Vec<FieldDescriptor>,
    methods: Vec<MethodSignature>,
}

impl TypeDescriptorBuilder {
    #[must_use]
    pub fn new(key: TypeKey) -> Self {
        Self {
            key,
            annotations: BTreeMap::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn fields<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        self.fields.extend(fields);
        self
    }

    /// Drop a field by name; unknown names are ignored.
    #[must_use]
    pub fn remove_field(mut self, name: &str) -> Self {
        self.fields.retain(|f| f.name() != name);
        self
    }

    #[must_use]
    pub fn method(mut self, method: MethodSignature) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn remove_methods_named(mut self, name: &str) -> Self {
        self.methods.retain(|m| m.name != name);
        self
    }

    /// Add an annotation, replacing any annotation with the same name.
    #[must_use]
    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations
            .retain(|name, _| !name.matches(&annotation.name));
        self.annotations.insert(annotation.name.clone(), annotation);
        self
    }

    #[must_use]
    pub fn remove_annotation(mut self, name: &AnnotationName) -> Self {
        self.annotations.retain(|existing, _| !existing.matches(name));
        self
    }

    /// Validate names and freeze the descriptor with fields in name order.
    pub fn build(self) -> Result<TypeDescriptor, SchemaError> {
        validate_type_name(&self.key.name)?;
        validate_source_path(&self.key.path)?;

        let mut fields = self.fields;
        for field in &fields {
            validate_field_name(field.name())?;
        }
        fields.sort_by(|a, b| a.name().cmp(b.name()));

        if let Some(pair) = fields.windows(2).find(|w| w[0].name() == w[1].name()) {
            return Err(SchemaError::DuplicateField {
                type_name: self.key.name.clone(),
                field: pair[0].name().to_string(),
            });
        }

        Ok(TypeDescriptor {
            key: self.key,
            annotations: self.annotations.into_values().collect(),
            fields,
            methods: self.methods,
        })
    }
}
