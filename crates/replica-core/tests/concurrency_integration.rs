//! Integration tests for sharing one copier across threads
//!
//! Tests cover:
//! - Concurrent first-time plan resolution converging on one plan
//! - Concurrent deep clones with independent visited maps

mod common;

use std::sync::Arc;
use std::thread;

use common::{copier, init_test_logging, instance, object_field};
use replica_core::{CopyEngine, ObjRef, Value};

const THREADS: usize = 8;

#[test]
fn test_concurrent_resolution_is_idempotent() {
    init_test_logging();
    let (copier, model) = copier();

    let plans = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| s.spawn(|| copier.resolve(model.source, model.target).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    });

    let first = &plans[0];
    for plan in &plans {
        assert_eq!(**plan, **first);
        assert!(Arc::ptr_eq(plan, first));
    }
    assert_eq!(copier.cached_plan_count(), 1);
    assert_eq!(copier.cached_descriptor_count(), 2);

    let again = copier.resolve(model.source, model.target).unwrap();
    assert!(Arc::ptr_eq(&again, first));
}

#[test]
fn test_concurrent_conversions() {
    let (copier, model) = copier();
    let sources: Vec<Value> = (0..THREADS as i32)
        .map(|i| Value::from(instance(&copier, model.source, &[("name", format!("user-{}", i).into()), ("age", i.into())])))
        .collect();

    thread::scope(|s| {
        for (i, source) in sources.iter().enumerate() {
            let copier = &copier;
            s.spawn(move || {
                for _ in 0..50 {
                    let target = copier.convert(source, model.target).unwrap();
                    let obj = target.as_object().unwrap();
                    assert_eq!(copier.get(obj, "name").unwrap(), Value::from(format!("user-{}", i)));
                    assert_eq!(copier.get(obj, "age").unwrap(), Value::I32(i as i32));
                }
            });
        }
    });

    assert_eq!(copier.cached_plan_count(), 1);
}

#[test]
fn test_concurrent_deep_clones_of_shared_graph() {
    let (copier, model) = copier();
    let a = instance(&copier, model.node, &[("label", "A".into())]);
    let b = instance(&copier, model.node, &[("label", "B".into()), ("next", (&a).into())]);
    copier.set(&a, "next", &b).unwrap();
    let root = Value::from(&a);

    let clones = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| s.spawn(|| copier.deep_clone(&root).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    });

    for clone in &clones {
        let a2 = clone.as_object().unwrap();
        let b2 = object_field(&copier, a2, "next");
        assert!(!ObjRef::ptr_eq(a2, &a));
        assert!(ObjRef::ptr_eq(&object_field(&copier, &b2, "next"), a2));
    }
    // Every thread built its own graph
    assert!(!clones[0].same_ref(&clones[1]));
}
