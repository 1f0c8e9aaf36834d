mod load;

use crate::{
    SchemaError,
    node::{TypeDescriptor, TypeDescriptorBuilder},
    types::{AnnotationName, TypeKey, TypeName},
};
use std::{collections::BTreeMap, sync::Arc};

type TypeMap = BTreeMap<TypeName, Arc<TypeDescriptor>>;

///
/// Schema
///
/// Host-owned, mutable model of every known type. Each change bumps the
/// revision; snapshots share the descriptors and never observe later changes.
///

#[derive(Clone, Debug, Default)]
pub struct Schema {
    revision: u64,
    types: Arc<TypeMap>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &TypeName) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.types.values()
    }

    /// Insert or replace a type, returning the previous descriptor. A type
    /// already known at another source path must be removed first.
    pub fn insert(
        &mut self,
        descriptor: TypeDescriptor,
    ) -> Result<Option<Arc<TypeDescriptor>>, SchemaError> {
        if let Some(existing) = self.types.get(descriptor.name())
            && existing.path() != descriptor.path()
        {
            return Err(SchemaError::PathConflict {
                type_name: descriptor.name().clone(),
                existing: existing.path().clone(),
                requested: descriptor.path().clone(),
            });
        }
        self.revision += 1;

        Ok(Arc::make_mut(&mut self.types).insert(descriptor.name().clone(), Arc::new(descriptor)))
    }

    pub fn remove(&mut self, name: &TypeName) -> Option<Arc<TypeDescriptor>> {
        if !self.types.contains_key(name) {
            return None;
        }
        self.revision += 1;

        Arc::make_mut(&mut self.types).remove(name)
    }

    /// Rebuild one type through its builder and store the result.
    pub fn update<F>(&mut self, name: &TypeName, f: F) -> Result<Arc<TypeDescriptor>, SchemaError>
    where
        F: FnOnce(TypeDescriptorBuilder) -> TypeDescriptorBuilder,
    {
        let current = self.types.get(name).ok_or_else(|| SchemaError::UnresolvedType {
            type_name: name.clone(),
            path: Default::default(),
        })?;

        let descriptor = Arc::new(f(current.to_builder()).build()?);
        self.revision += 1;
        Arc::make_mut(&mut self.types).insert(name.clone(), Arc::clone(&descriptor));

        Ok(descriptor)
    }

    #[must_use]
    pub fn snapshot(&self) -> SchemaSnapshot {
        SchemaSnapshot {
            revision: self.revision,
            types: Arc::clone(&self.types),
        }
    }
}

///
/// SchemaSnapshot
///
/// Immutable, revisioned view of a `Schema`.
///

#[derive(Clone, Debug, Default)]
pub struct SchemaSnapshot {
    revision: u64,
    types: Arc<TypeMap>,
}

impl SchemaSnapshot {
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &TypeName) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.types.values()
    }

    /// Resolve a type at its source path.
    pub fn describe(&self, key: &TypeKey) -> Result<Arc<TypeDescriptor>, SchemaError> {
        match self.types.get(&key.name) {
            Some(descriptor) if descriptor.path() == &key.path => Ok(Arc::clone(descriptor)),
            _ => Err(SchemaError::UnresolvedType {
                type_name: key.name.clone(),
                path: key.path.clone(),
            }),
        }
    }

    /// Whether a known type carries an annotation. Unknown types never do.
    #[must_use]
    pub fn carries_annotation(&self, name: &TypeName, annotation: &AnnotationName) -> bool {
        self.lookup(name)
            .is_some_and(|descriptor| descriptor.has_annotation(annotation))
    }

    /// Find a type by exact name, falling back to a unique simple-name match
    /// so that field declarations may use unqualified names.
    #[must_use]
    pub fn lookup(&self, name: &TypeName) -> Option<&Arc<TypeDescriptor>> {
        if let Some(descriptor) = self.types.get(name) {
            return Some(descriptor);
        }
        if name.is_qualified() {
            return None;
        }

        let mut matches = self
            .types
            .values()
            .filter(|d| d.name().simple_name() == name.as_str());
        let first = matches.next()?;

        matches.next().is_none().then_some(first)
    }
}
