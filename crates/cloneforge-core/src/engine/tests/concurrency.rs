use super::*;
use crate::{
    engine::{ChangeNotice, ProcessReport, UnitState},
    identity::{field_id, type_id},
};
use cloneforge_schema::types::TypeName;
use std::thread;

const fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn engine_is_shareable_across_threads() {
    assert_send_sync::<Engine>();
}

#[test]
fn different_units_recompute_in_parallel() {
    let h = harness(config());
    let mut schema = fixture_schema();
    h.engine.scan(&schema.snapshot());

    let person_key = key("com.example.Person");
    let order_key = key("com.example.Order");
    schema
        .update(&TypeName::new("com.example.Person"), |b| {
            b.remove_field("age").field(
                FieldDescriptor::new("age", FieldType::Primitive(Primitive::Int)).set_transient(),
            )
        })
        .expect("update should succeed");
    schema
        .update(&TypeName::new("com.example.Order"), |b| {
            b.field(FieldDescriptor::new("count", FieldType::Primitive(Primitive::Int)))
        })
        .expect("update should succeed");
    let snapshot = schema.snapshot();

    let person_notice = ChangeNotice::field_changed(&person_key, "age", snapshot.clone())
        .expect("notice should be created");
    let order_notice =
        ChangeNotice::type_changed(&order_key, snapshot).expect("notice should be created");

    let (person_report, order_report) = thread::scope(|s| {
        let person = s.spawn(|| h.engine.process(&person_notice));
        let order = s.spawn(|| h.engine.process(&order_notice));

        (
            person.join().expect("person thread should finish"),
            order.join().expect("order thread should finish"),
        )
    });

    let person_id = copy_id("com.example.Person");
    let order_id = copy_id("com.example.Order");
    assert_eq!(person_report.updated, [person_id.clone()]);
    assert_eq!(order_report.updated, [order_id.clone()]);
    assert!(person_report.is_clean() && order_report.is_clean());

    for id in [&person_id, &order_id] {
        assert_eq!(h.engine.unit_state(id), UnitState::Registered);
    }
    let person_method = h
        .engine
        .unit(&person_id)
        .and_then(|u| u.content())
        .expect("person should have a method");
    assert!(!person_method.contains("setAge"), "transient field must be dropped");

    let order_reads = h.engine.upstreams_of(&order_id);
    assert!(order_reads.contains(&type_id(&order_key).expect("identifier")));
    assert!(order_reads.contains(&field_id(&order_key, "count").expect("identifier")));
    assert!(
        !h.engine.upstreams_of(&person_id).contains(&field_id(&order_key, "count").expect("id")),
        "edges of one unit must not leak into another"
    );
}

#[test]
fn one_unit_is_never_computed_twice_at_once() {
    let h = harness(config());
    let schema = fixture_schema();
    h.engine.scan(&schema.snapshot());

    let person_id = copy_id("com.example.Person");
    let before = h.engine.unit(&person_id).expect("person unit should exist");
    let notice = ChangeNotice::type_changed(&key("com.example.Person"), schema.snapshot())
        .expect("notice should be created");

    let reports: Vec<ProcessReport> = thread::scope(|s| {
        let handles = (0..4)
            .map(|_| s.spawn(|| h.engine.process(&notice)))
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread should finish"))
            .collect()
    });

    for report in &reports {
        let recomputed = report.recomputed().any(|id| id == &person_id);
        let rejected = report.failed.iter().any(|(id, err)| {
            id == &person_id && matches!(err, EngineError::ComputationInFlight(_))
        });
        assert!(
            recomputed ^ rejected,
            "each pass either computes the unit or is turned away: {report:?}"
        );
    }
    assert_eq!(h.engine.unit_state(&person_id), UnitState::Registered);
    assert_eq!(h.engine.unit(&person_id), Some(before));
}
