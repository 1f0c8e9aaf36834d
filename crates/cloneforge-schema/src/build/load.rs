//! JSON schema documents.
//!
//! ```json
//! { "types": [{
//!     "name": "com.example.Person",
//!     "annotations": ["Copyable"],
//!     "fields": [{ "name": "age", "type": "int" }],
//!     "methods": [{ "name": "toString", "returns": "String" }]
//! }]}
//! ```

use super::Schema;
use crate::{
    SchemaError,
    node::{Annotation, FieldDescriptor, FieldFlags, MethodSignature, TypeDescriptor},
    types::{FieldType, SourcePath, TypeKey, TypeName},
};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDef {
    #[serde(default)]
    types: Vec<TypeDef>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeDef {
    name: String,

    #[serde(default)]
    path: Option<String>,

    #[serde(default)]
    annotations: Vec<AnnotationDef>,

    #[serde(default)]
    fields: Vec<FieldDef>,

    #[serde(default)]
    methods: Vec<MethodDef>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnnotationDef {
    Marker(String),
    Full {
        name: String,
        #[serde(default)]
        values: BTreeMap<String, Vec<String>>,
    },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDef {
    name: String,

    #[serde(rename = "type")]
    ty: FieldType,

    #[serde(default, rename = "static")]
    is_static: bool,

    #[serde(default)]
    transient: bool,

    #[serde(default)]
    version: bool,

    #[serde(default)]
    annotations: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MethodDef {
    name: String,

    #[serde(default)]
    params: Vec<FieldType>,

    #[serde(default)]
    returns: Option<FieldType>,
}

impl Schema {
    /// Build a schema from a JSON document; every type is validated.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let def: SchemaDef =
            serde_json::from_str(json).map_err(|e| SchemaError::Document(e.to_string()))?;

        let mut schema = Self::new();
        for ty in def.types {
            let descriptor = ty.into_descriptor()?;
            if schema.get(descriptor.name()).is_some() {
                return Err(SchemaError::DuplicateType(descriptor.name().clone()));
            }
            schema.insert(descriptor)?;
        }

        Ok(schema)
    }
}

impl TypeDef {
    fn into_descriptor(self) -> Result<TypeDescriptor, SchemaError> {
        let path = self.path.map_or_else(SourcePath::default, SourcePath::new);
        let mut builder = TypeDescriptor::builder(TypeKey::new(TypeName::new(self.name), path));

        for annotation in self.annotations {
            builder = builder.annotation(match annotation {
                AnnotationDef::Marker(name) => Annotation::marker(name),
                AnnotationDef::Full { name, values } => Annotation {
                    name: name.as_str().into(),
                    values,
                },
            });
        }

        for field in self.fields {
            let flags = FieldFlags {
                is_static: field.is_static,
                is_transient: field.transient,
                is_array: false,
                is_version: field.version,
            };
            let descriptor = field
                .annotations
                .into_iter()
                .fold(FieldDescriptor::new(field.name, field.ty).with_flags(flags), |f, a| {
                    f.annotated(a)
                });
            builder = builder.field(descriptor);
        }

        for method in self.methods {
            builder = builder.method(MethodSignature {
                name: method.name,
                params: method.params,
                return_type: method.returns,
            });
        }

        builder.build()
    }
}
