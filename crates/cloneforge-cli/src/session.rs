use cloneforge::{
    Error, ErrorKind,
    core::{
        config::CopyConfig,
        engine::{CopyProvider, Engine, UnitProvider},
    },
    schema::{
        Schema, SchemaError,
        types::{SourcePath, TypeName},
    },
};
use serde::Serialize;
use std::{collections::BTreeSet, fs, path::Path, sync::Arc};

///
/// Session
///
/// A loaded schema with the copy provider registered and an initial scan done.
///

pub struct Session {
    schema: Schema,
    provider: Arc<CopyProvider>,
    engine: Engine,
}

///
/// RenderedUnit
///

#[derive(Debug, Serialize)]
pub struct RenderedUnit {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub content: Option<String>,
}

impl Session {
    pub fn open(schema: &Path, config: Option<&Path>) -> Result<Self, Error> {
        let text = fs::read_to_string(schema).map_err(|err| {
            Error::new(ErrorKind::NotFound, format!("{}: {err}", schema.display()))
        })?;
        let config = match config {
            Some(path) => CopyConfig::load(path)?,
            None => CopyConfig::default(),
        };

        Self::new(Schema::from_json(&text)?, config)
    }

    pub fn new(schema: Schema, config: CopyConfig) -> Result<Self, Error> {
        config.validate()?;

        let provider = Arc::new(CopyProvider::new(config));
        let engine = Engine::new();
        engine.register_provider(Arc::clone(&provider) as Arc<dyn UnitProvider>)?;

        let report = engine.scan(&schema.snapshot());
        tracing::debug!(
            types = schema.len(),
            units = report.created.len(),
            failed = report.failed.len(),
            "initial scan complete"
        );

        Ok(Self {
            schema,
            provider,
            engine,
        })
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.engine.is_available(&self.schema.snapshot())
    }

    /// Mark a type with the trigger and return its rendered copy method, or
    /// `None` when no field of the type takes part in a copy.
    pub fn copy(
        &mut self,
        type_name: &str,
        exclude: &BTreeSet<String>,
    ) -> Result<Option<String>, Error> {
        let name = TypeName::new(type_name);
        let descriptor = self
            .schema
            .snapshot()
            .lookup(&name)
            .cloned()
            .ok_or_else(|| SchemaError::UnresolvedType {
                type_name: name.clone(),
                path: SourcePath::default(),
            })?;

        let notice = self
            .provider
            .annotate_type(&mut self.schema, descriptor.name(), exclude)?;
        let id = self.provider.scheme().create(descriptor.key())?;

        let mut report = self.engine.process(&notice);
        if let Some(pos) = report.failed.iter().position(|(failed, _)| failed == &id) {
            let (_, err) = report.failed.swap_remove(pos);
            return Err(err.into());
        }

        Ok(self.engine.unit(&id).and_then(|unit| unit.content()))
    }

    /// Rescan the schema and render every live unit in identifier order.
    pub fn generate(&self) -> Result<Vec<RenderedUnit>, Error> {
        let report = self.engine.scan(&self.schema.snapshot());
        for (id, err) in &report.failed {
            tracing::warn!(%id, error = %err, "unit could not be generated");
        }

        Ok(self
            .engine
            .units_snapshot()
            .into_iter()
            .map(|unit| RenderedUnit {
                id: unit.id().to_string(),
                type_name: unit.governor().name.to_string(),
                content: unit.content(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "types": [
            {
                "name": "com.example.Person",
                "fields": [
                    { "name": "age", "type": "int" },
                    { "name": "cache", "type": "String" },
                    { "name": "home", "type": "com.example.Address" },
                    { "name": "nickname", "type": "String" }
                ]
            },
            {
                "name": "com.example.Address",
                "annotations": ["Copyable"],
                "fields": [{ "name": "street", "type": "String" }]
            }
        ]
    }"#;

    fn session() -> Session {
        let schema = Schema::from_json(DOCUMENT).expect("document should load");

        Session::new(schema, CopyConfig::default()).expect("session should open")
    }

    #[test]
    fn initial_scan_covers_annotated_types() {
        let session = session();
        assert!(session.is_available());

        let units = session.generate().expect("generation should succeed");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].type_name, "com.example.Address");
        assert!(
            units[0]
                .content
                .as_deref()
                .is_some_and(|c| c.contains("p.setStreet(this.getStreet());")),
            "address copy should assign the street"
        );
    }

    #[test]
    fn copy_annotates_and_renders_the_type() {
        let mut session = session();
        let exclude = BTreeSet::from(["cache".to_string()]);

        let content = session
            .copy("Person", &exclude)
            .expect("copy should succeed")
            .expect("person has fields to copy");

        assert!(content.starts_with("public Person copy() {"));
        assert!(content.contains("p.setAge(this.getAge());"));
        assert!(content.contains("p.setHome(this.getHome().copy());"));
        assert!(!content.contains("Cache"), "excluded field must not be copied");

        let units = session.generate().expect("generation should succeed");
        assert_eq!(units.len(), 2, "person should now have a unit");
    }

    #[test]
    fn unknown_types_are_not_found() {
        let mut session = session();

        let err = session
            .copy("Missing", &BTreeSet::new())
            .expect_err("unknown type should fail");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn empty_schema_is_unavailable() {
        let session =
            Session::new(Schema::new(), CopyConfig::default()).expect("session should open");

        assert!(!session.is_available());
        assert!(session.generate().expect("generation should succeed").is_empty());
    }
}
