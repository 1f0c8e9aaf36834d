//! Copy-method synthesis.
//!
//! Turns classified fields into a host-independent statement list, or keeps
//! a method the user already wrote.

mod render;
mod statement;

pub use render::*;
pub use statement::*;

use crate::{
    EngineError,
    classify::{ClassifiedField, FieldKind},
    config::{ConflictPolicy, CopyConfig},
};
use cloneforge_schema::{
    node::{FieldDescriptor, MethodSignature, TypeDescriptor},
    types::{FieldType, TypeName},
};
use serde::Serialize;

///
/// SynthOptions
///

#[derive(Clone, Copy, Debug)]
pub struct SynthOptions<'a> {
    pub method_name: &'a str,
    pub policy: ConflictPolicy,
}

impl<'a> From<&'a CopyConfig> for SynthOptions<'a> {
    fn from(config: &'a CopyConfig) -> Self {
        Self {
            method_name: &config.method_name,
            policy: config.conflict_policy,
        }
    }
}

///
/// Visibility
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum Visibility {
    #[default]
    Public,
}

///
/// GeneratedMethod
///
/// A public, parameterless method returning a new instance of its type.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GeneratedMethod {
    pub name: String,
    pub visibility: Visibility,
    pub return_type: TypeName,
    pub params: Vec<FieldType>,
    pub statements: Vec<Statement>,
}

impl GeneratedMethod {
    /// Fields written by the method, in statement order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().filter_map(Statement::field)
    }
}

///
/// Synthesis
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Synthesis {
    /// No field participates; nothing is produced.
    Empty,

    /// The type already declares the method. `exact` is false when the kept
    /// method takes parameters.
    Existing { method: MethodSignature, exact: bool },

    Generated(GeneratedMethod),
}

/// Produce the copy method for a type from its classified fields.
pub fn synthesize(
    descriptor: &TypeDescriptor,
    fields: &[ClassifiedField<'_>],
    options: &SynthOptions<'_>,
) -> Result<Synthesis, EngineError> {
    if !fields.iter().any(|f| f.kind.participates()) {
        return Ok(Synthesis::Empty);
    }
    if let Some(existing) = existing_method(descriptor, options)? {
        return Ok(existing);
    }

    let mut statements = Vec::with_capacity(fields.len() + 2);
    statements.push(Statement::NewInstance {
        ty: descriptor.name().clone(),
    });
    statements.extend(
        fields
            .iter()
            .filter_map(|f| statement_for(f.field, f.kind)),
    );
    statements.push(Statement::Return);

    Ok(Synthesis::Generated(GeneratedMethod {
        name: options.method_name.to_string(),
        visibility: Visibility::Public,
        return_type: descriptor.name().clone(),
        params: Vec::new(),
        statements,
    }))
}

fn existing_method(
    descriptor: &TypeDescriptor,
    options: &SynthOptions<'_>,
) -> Result<Option<Synthesis>, EngineError> {
    let exact = descriptor
        .methods_named(options.method_name)
        .find(|m| m.is_zero_arg());
    if let Some(method) = exact {
        return Ok(Some(Synthesis::Existing {
            method: method.clone(),
            exact: true,
        }));
    }

    let Some(overload) = descriptor.methods_named(options.method_name).next() else {
        return Ok(None);
    };

    match options.policy {
        ConflictPolicy::NameOnly => Ok(Some(Synthesis::Existing {
            method: overload.clone(),
            exact: false,
        })),
        ConflictPolicy::ExactSignature => Err(EngineError::AmbiguousMethodConflict {
            type_name: descriptor.name().clone(),
            existing: overload.to_string(),
        }),
    }
}

fn statement_for(field: &FieldDescriptor, kind: FieldKind) -> Option<Statement> {
    let copy = match kind {
        FieldKind::Excluded => return None,
        FieldKind::CollectionOfPrimitive | FieldKind::Primitive => ValueCopy::Value,
        FieldKind::CollectionOfCopyable | FieldKind::CopyableReference => ValueCopy::Deep,
        FieldKind::CollectionOfPlain | FieldKind::PlainReference => ValueCopy::Alias,
    };
    let name = field.name().to_string();

    if kind.is_collection() {
        Some(Statement::CopyElements {
            field: name,
            element: field.ty().element().unwrap_or(field.ty()).clone(),
            copy,
        })
    } else {
        Some(Statement::Assign { field: name, copy })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloneforge_schema::{
        node::FieldDescriptor,
        types::{Primitive, TypeKey},
    };

    fn person(methods: Vec<MethodSignature>) -> TypeDescriptor {
        let mut builder =
            TypeDescriptor::builder(TypeKey::new("com.example.Person", "src/main/java"))
                .field(FieldDescriptor::new("age", FieldType::Primitive(Primitive::Int)))
                .field(FieldDescriptor::new("nickname", FieldType::named("String")));
        for method in methods {
            builder = builder.method(method);
        }

        builder.build().expect("descriptor should build")
    }

    fn classified(descriptor: &TypeDescriptor) -> Vec<ClassifiedField<'_>> {
        descriptor
            .fields()
            .iter()
            .map(|field| ClassifiedField {
                field,
                kind: if field.ty().is_primitive() {
                    FieldKind::Primitive
                } else {
                    FieldKind::PlainReference
                },
            })
            .collect()
    }

    fn options(policy: ConflictPolicy) -> SynthOptions<'static> {
        SynthOptions {
            method_name: "copy",
            policy,
        }
    }

    #[test]
    fn generates_statements_in_field_order() {
        let descriptor = person(Vec::new());
        let synthesis = synthesize(
            &descriptor,
            &classified(&descriptor),
            &options(ConflictPolicy::NameOnly),
        )
        .expect("synthesis should succeed");

        let Synthesis::Generated(method) = synthesis else {
            panic!("expected a generated method, got {synthesis:?}");
        };
        assert_eq!(method.name, "copy");
        assert!(method.params.is_empty());
        assert_eq!(method.fields().collect::<Vec<_>>(), ["age", "nickname"]);
        assert_eq!(
            method.statements.first(),
            Some(&Statement::NewInstance {
                ty: TypeName::new("com.example.Person")
            })
        );
        assert_eq!(method.statements.last(), Some(&Statement::Return));
    }

    #[test]
    fn nothing_is_produced_without_participating_fields() {
        let descriptor = person(Vec::new());
        let excluded = descriptor
            .fields()
            .iter()
            .map(|field| ClassifiedField {
                field,
                kind: FieldKind::Excluded,
            })
            .collect::<Vec<_>>();

        let synthesis = synthesize(&descriptor, &excluded, &options(ConflictPolicy::NameOnly))
            .expect("synthesis should succeed");
        assert_eq!(synthesis, Synthesis::Empty);
    }

    #[test]
    fn keeps_a_user_written_method() {
        let descriptor = person(vec![
            MethodSignature::new("copy").returning(FieldType::named("com.example.Person")),
        ]);

        for policy in [ConflictPolicy::NameOnly, ConflictPolicy::ExactSignature] {
            let synthesis = synthesize(&descriptor, &classified(&descriptor), &options(policy))
                .expect("synthesis should succeed");
            assert!(
                matches!(synthesis, Synthesis::Existing { exact: true, .. }),
                "zero-argument method must be kept under {policy:?}"
            );
        }
    }

    #[test]
    fn overloads_follow_the_conflict_policy() {
        let descriptor = person(vec![
            MethodSignature::new("copy").with_param(FieldType::Primitive(Primitive::Boolean)),
        ]);
        let fields = classified(&descriptor);

        let kept = synthesize(&descriptor, &fields, &options(ConflictPolicy::NameOnly))
            .expect("name-only policy keeps the overload");
        assert!(matches!(kept, Synthesis::Existing { exact: false, .. }));

        let err = synthesize(&descriptor, &fields, &options(ConflictPolicy::ExactSignature))
            .expect_err("exact-signature policy reports the overload");
        assert!(matches!(err, EngineError::AmbiguousMethodConflict { .. }));
    }
}
