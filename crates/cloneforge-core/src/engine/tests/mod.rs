mod concurrency;

use super::InFlightGuard;
use crate::{
    EngineError,
    config::CopyConfig,
    engine::{CopyProvider, Engine},
    identity::{IdScheme, MetadataId, ProducedKind},
    obs::RecordingSink,
};
use cloneforge_schema::{
    build::Schema,
    node::{Annotation, FieldDescriptor, TypeDescriptor},
    types::{FieldType, Primitive, TypeKey},
};
use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex},
};

const SOURCE: &str = "src/main/java";

fn key(name: &str) -> TypeKey {
    TypeKey::new(name, SOURCE)
}

fn copy_id(name: &str) -> MetadataId {
    IdScheme::new(ProducedKind::COPY)
        .create(&key(name))
        .expect("test identifiers should be valid")
}

fn person() -> TypeDescriptor {
    TypeDescriptor::builder(key("com.example.Person"))
        .annotation(Annotation::marker("Copyable"))
        .field(FieldDescriptor::new("nickname", FieldType::named("String")))
        .field(FieldDescriptor::new("version", FieldType::Primitive(Primitive::Long)))
        .field(FieldDescriptor::new("home", FieldType::named("Address")))
        .field(FieldDescriptor::new("age", FieldType::Primitive(Primitive::Int)))
        .field(FieldDescriptor::new(
            "addresses",
            FieldType::collection("List", FieldType::named("Address")),
        ))
        .build()
        .expect("person should build")
}

fn address() -> TypeDescriptor {
    TypeDescriptor::builder(key("com.example.Address"))
        .annotation(Annotation::marker("Copyable"))
        .field(FieldDescriptor::new("street", FieldType::named("String")))
        .build()
        .expect("address should build")
}

fn order() -> TypeDescriptor {
    TypeDescriptor::builder(key("com.example.Order"))
        .annotation(Annotation::marker("Copyable"))
        .field(FieldDescriptor::new("total", FieldType::Primitive(Primitive::Int)))
        .build()
        .expect("order should build")
}

fn plain() -> TypeDescriptor {
    TypeDescriptor::builder(key("com.example.Plain"))
        .field(FieldDescriptor::new("label", FieldType::named("String")))
        .build()
        .expect("plain should build")
}

fn fixture_schema() -> Schema {
    let mut schema = Schema::new();
    for descriptor in [person(), address(), order(), plain()] {
        schema.insert(descriptor).expect("type should insert");
    }
    schema
}

fn config() -> CopyConfig {
    CopyConfig {
        version_field: Some("version".to_string()),
        ..CopyConfig::default()
    }
}

struct Harness {
    engine: Engine,
    provider: Arc<CopyProvider>,
    sink: Arc<RecordingSink>,
}

fn harness(config: CopyConfig) -> Harness {
    let sink = Arc::new(RecordingSink::new());
    let engine = Engine::with_sink(sink.clone());
    let provider = Arc::new(CopyProvider::new(config));
    engine
        .register_provider(provider.clone())
        .expect("provider registration should succeed");

    Harness {
        engine,
        provider,
        sink,
    }
}

#[test]
fn in_flight_guard_rejects_reentry() {
    let set = Mutex::new(BTreeSet::new());
    let id = copy_id("com.example.Person");

    let guard = InFlightGuard::enter(&set, &id).expect("first entry should succeed");
    assert!(matches!(
        InFlightGuard::enter(&set, &id),
        Err(EngineError::ComputationInFlight(_))
    ));

    drop(guard);
    assert!(
        InFlightGuard::enter(&set, &id).is_ok(),
        "guard must release the identifier on drop"
    );
}
