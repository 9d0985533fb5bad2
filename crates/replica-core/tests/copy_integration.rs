//! Integration tests for field copying and conversion
//!
//! Tests cover:
//! - Shallow copy sharing references
//! - Deep copy producing independent nested objects
//! - Include/exclude filters and null handling
//! - Primitive/boxed compatibility and width mismatches
//! - Single and batch conversion

mod common;

use common::{copier, init_test_logging, instance, object_field};
use replica_core::{CopyEngine, CopyOptions, ObjRef, Value};
use replica_types::TypeId;

#[test]
fn test_shallow_copy_shares_references() {
    init_test_logging();
    let (copier, model) = copier();
    let lines = copier.new_collection(TypeId::ARRAY_LIST, vec![Value::from("1 Main St")]).unwrap();
    let address = instance(&copier, model.address, &[("city", "Oslo".into()), ("lines", (&lines).into())]);
    let person = instance(&copier, model.person, &[("name", "Kari".into()), ("address", (&address).into())]);
    let other = copier.allocate(model.person).unwrap();

    copier.copy(&Value::from(&person), &Value::from(&other)).unwrap();

    assert!(ObjRef::ptr_eq(&object_field(&copier, &other, "address"), &address));
    assert_eq!(copier.get(&other, "name").unwrap(), Value::from("Kari"));
}

#[test]
fn test_deep_copy_produces_independent_objects() {
    init_test_logging();
    let (copier, model) = copier();
    let lines = copier.new_collection(TypeId::ARRAY_LIST, vec![Value::from("1 Main St")]).unwrap();
    let address = instance(&copier, model.address, &[("city", "Oslo".into()), ("lines", (&lines).into())]);
    let scores = copier
        .new_map(TypeId::HASH_MAP, vec![(Value::from("math"), Value::I32(90))])
        .unwrap();
    let person = instance(
        &copier,
        model.person,
        &[("name", "Kari".into()), ("address", (&address).into()), ("scores", (&scores).into())],
    );
    let other = copier.allocate(model.person).unwrap();

    copier.deep_copy(&Value::from(&person), &Value::from(&other)).unwrap();

    let address_copy = object_field(&copier, &other, "address");
    assert!(!ObjRef::ptr_eq(&address_copy, &address));
    assert_eq!(copier.get(&address_copy, "city").unwrap(), Value::from("Oslo"));

    let lines_copy = object_field(&copier, &address_copy, "lines");
    assert!(!ObjRef::ptr_eq(&lines_copy, &lines));
    assert_eq!(lines_copy.type_id(), TypeId::ARRAY_LIST);
    assert_eq!(lines_copy.read().as_collection().unwrap().to_vec(), vec![Value::from("1 Main St")]);

    let scores_copy = object_field(&copier, &other, "scores");
    assert!(!ObjRef::ptr_eq(&scores_copy, &scores));
    assert_eq!(scores_copy.read().as_map().unwrap().get(&Value::from("math")), Some(&Value::I32(90)));

    // Mutating the copy leaves the source untouched
    lines_copy.write().as_collection_mut().unwrap().add(Value::from("extra")).unwrap();
    assert_eq!(lines.read().as_collection().unwrap().len(), 1);
}

#[test]
fn test_deep_copy_back_reference_resolves_to_destination() {
    let (copier, model) = copier();
    let a = instance(&copier, model.node, &[("label", "a".into())]);
    let b = instance(&copier, model.node, &[("label", "b".into()), ("next", (&a).into())]);
    copier.set(&a, "next", &b).unwrap();
    let dest = copier.allocate(model.node).unwrap();

    copier.deep_copy(&Value::from(&a), &Value::from(&dest)).unwrap();

    let b_copy = object_field(&copier, &dest, "next");
    assert!(!ObjRef::ptr_eq(&b_copy, &b));
    assert!(ObjRef::ptr_eq(&object_field(&copier, &b_copy, "next"), &dest));
}

#[test]
fn test_exclude_leaves_field_unset() {
    let (copier, model) = copier();
    let src = instance(
        &copier,
        model.profile,
        &[("name", "Ada".into()), ("email", "ada@example.com".into()), ("age", 36.into())],
    );
    let dst = copier.allocate(model.profile_view).unwrap();

    let options = CopyOptions::builder().exclude_fields(["name"]).build();
    copier.copy_with(&Value::from(&src), &Value::from(&dst), &options).unwrap();

    assert_eq!(copier.get(&dst, "name").unwrap(), Value::Null);
    assert_eq!(copier.get(&dst, "email").unwrap(), Value::from("ada@example.com"));
    assert_eq!(copier.get(&dst, "age").unwrap(), Value::I32(36));
}

#[test]
fn test_include_copies_only_listed_fields() {
    let (copier, model) = copier();
    let src = instance(
        &copier,
        model.profile,
        &[("name", "Ada".into()), ("email", "ada@example.com".into()), ("age", 36.into())],
    );
    let dst = copier.allocate(model.profile_view).unwrap();

    let options = CopyOptions::builder().include_fields(["name", "unknown"]).build();
    copier.copy_with(&Value::from(&src), &Value::from(&dst), &options).unwrap();

    assert_eq!(copier.get(&dst, "name").unwrap(), Value::from("Ada"));
    assert_eq!(copier.get(&dst, "email").unwrap(), Value::Null);
    assert_eq!(copier.get(&dst, "age").unwrap(), Value::Null);
}

#[test]
fn test_exclude_wins_over_include() {
    let (copier, model) = copier();
    let src = instance(&copier, model.profile, &[("name", "Ada".into()), ("email", "ada@example.com".into())]);
    let dst = copier.allocate(model.profile_view).unwrap();

    let options = CopyOptions::builder()
        .include_fields(["name", "email"])
        .exclude_fields(["name"])
        .build();
    copier.copy_with(&Value::from(&src), &Value::from(&dst), &options).unwrap();

    assert_eq!(copier.get(&dst, "name").unwrap(), Value::Null);
    assert_eq!(copier.get(&dst, "email").unwrap(), Value::from("ada@example.com"));
}

#[test]
fn test_ignore_nulls_keeps_destination_values() {
    let (copier, model) = copier();
    let src = instance(&copier, model.profile, &[("name", "Ada".into())]);
    let dst = instance(&copier, model.profile_view, &[("email", "old@example.com".into())]);

    let keep = CopyOptions::builder().ignore_nulls(true).build();
    copier.copy_with(&Value::from(&src), &Value::from(&dst), &keep).unwrap();
    assert_eq!(copier.get(&dst, "email").unwrap(), Value::from("old@example.com"));
    assert_eq!(copier.get(&dst, "name").unwrap(), Value::from("Ada"));

    copier.copy(&Value::from(&src), &Value::from(&dst)).unwrap();
    assert_eq!(copier.get(&dst, "email").unwrap(), Value::Null);
}

#[test]
fn test_boxed_and_primitive_interchange() {
    let (copier, model) = copier();

    let boxed = instance(&copier, model.boxed_holder, &[("value", 100.into())]);
    let raw = copier.allocate(model.int_holder).unwrap();
    copier.copy(&Value::from(&boxed), &Value::from(&raw)).unwrap();
    assert_eq!(copier.get(&raw, "value").unwrap(), Value::I32(100));

    let raw = instance(&copier, model.int_holder, &[("value", 7.into())]);
    let boxed = copier.allocate(model.boxed_holder).unwrap();
    copier.copy(&Value::from(&raw), &Value::from(&boxed)).unwrap();
    assert_eq!(copier.get(&boxed, "value").unwrap(), Value::I32(7));
}

#[test]
fn test_width_mismatch_is_not_copied() {
    let (copier, model) = copier();
    let long = instance(&copier, model.long_holder, &[("value", Value::I64(1 << 40))]);
    let int = instance(&copier, model.int_holder, &[("value", 5.into())]);

    copier.copy(&Value::from(&long), &Value::from(&int)).unwrap();

    assert_eq!(copier.get(&int, "value").unwrap(), Value::I32(5));
    assert!(copier.resolve(model.long_holder, model.int_holder).unwrap().is_empty());
}

#[test]
fn test_unrelated_types_copy_vacuously() {
    let (copier, model) = copier();
    let tree = copier.allocate(model.tree).unwrap();
    let profile = instance(&copier, model.profile, &[("name", "Ada".into())]);

    copier.copy(&Value::from(&profile), &Value::from(&tree)).unwrap();

    assert_eq!(copier.get(&tree, "left").unwrap(), Value::Null);
    assert!(copier.resolve(model.profile, model.tree).unwrap().is_empty());
}

#[test]
fn test_convert_single() {
    init_test_logging();
    let (copier, model) = copier();
    let src = instance(&copier, model.source, &[("name", "张三".into()), ("age", 25.into())]);

    let converted = copier.convert(&Value::from(&src), model.target).unwrap();

    let target = converted.as_object().unwrap();
    assert_eq!(target.type_id(), model.target);
    assert_eq!(copier.get(target, "name").unwrap(), Value::from("张三"));
    assert_eq!(copier.get(target, "age").unwrap(), Value::I32(25));
}

#[test]
fn test_converts_preserves_order() {
    let (copier, model) = copier();
    let sources = vec![
        Value::from(instance(&copier, model.source, &[("name", "A".into()), ("age", 1.into())])),
        Value::Null,
        Value::from(instance(&copier, model.source, &[("name", "B".into()), ("age", 2.into())])),
    ];

    let targets = copier.converts(&sources, model.target).unwrap();

    assert_eq!(targets.len(), 3);
    assert!(targets[1].is_null());
    let summary: Vec<(Value, Value)> = [&targets[0], &targets[2]]
        .iter()
        .map(|t| {
            let obj = t.as_object().unwrap();
            (copier.get(obj, "name").unwrap(), copier.get(obj, "age").unwrap())
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (Value::from("A"), Value::I32(1)),
            (Value::from("B"), Value::I32(2)),
        ]
    );
}

#[test]
fn test_convert_with_deep_options() {
    let (copier, model) = copier();
    let address = instance(&copier, model.address, &[("city", "Oslo".into())]);
    let person = instance(&copier, model.person, &[("address", (&address).into())]);

    let shallow = copier.convert(&Value::from(&person), model.person).unwrap();
    let deep = copier.convert_with(&Value::from(&person), model.person, &CopyOptions::DEEP).unwrap();

    assert!(ObjRef::ptr_eq(&object_field(&copier, shallow.as_object().unwrap(), "address"), &address));
    assert!(!ObjRef::ptr_eq(&object_field(&copier, deep.as_object().unwrap(), "address"), &address));
}

#[test]
fn test_plans_are_cached_per_direction() {
    let (copier, model) = copier();
    let src = instance(&copier, model.source, &[("name", "A".into())]);
    let dst = copier.allocate(model.target).unwrap();

    copier.copy(&Value::from(&src), &Value::from(&dst)).unwrap();
    copier.copy(&Value::from(&src), &Value::from(&dst)).unwrap();
    assert_eq!(copier.cached_plan_count(), 1);

    copier.copy(&Value::from(&dst), &Value::from(&src)).unwrap();
    assert_eq!(copier.cached_plan_count(), 2);
    assert_eq!(copier.cached_descriptor_count(), 2);
}
