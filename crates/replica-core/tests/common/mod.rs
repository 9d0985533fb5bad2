//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use replica_core::{Copier, ObjRef, Value};
use replica_types::{ClassDef, FieldDecl, RecordDef, TypeContext, TypeId};

/// Initialize tracing output for a test (idempotent)
pub fn init_test_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// Type ids of the fixture model
#[derive(Debug, Clone, Copy)]
pub struct Model {
    pub source: TypeId,
    pub target: TypeId,
    pub profile: TypeId,
    pub profile_view: TypeId,
    pub node: TypeId,
    pub tree: TypeId,
    pub address: TypeId,
    pub person: TypeId,
    pub user_record: TypeId,
    pub int_holder: TypeId,
    pub boxed_holder: TypeId,
    pub long_holder: TypeId,
    pub strings: TypeId,
}

/// Register the fixture model and build a copier over it
pub fn copier() -> (Copier, Model) {
    let mut ctx = TypeContext::new();

    let source = ctx
        .define_class(ClassDef::new("Source").field("name", TypeId::STRING).field("age", TypeId::I32))
        .unwrap();
    let target = ctx
        .define_class(ClassDef::new("Target").field("name", TypeId::STRING).field("age", TypeId::BOXED_I32))
        .unwrap();

    let profile = ctx
        .define_class(
            ClassDef::new("Profile")
                .field("name", TypeId::STRING)
                .field("email", TypeId::STRING)
                .field("age", TypeId::BOXED_I32),
        )
        .unwrap();
    let profile_view = ctx
        .define_class(
            ClassDef::new("ProfileView")
                .field("name", TypeId::STRING)
                .field("email", TypeId::STRING)
                .field("age", TypeId::BOXED_I32),
        )
        .unwrap();

    let node = ctx.declare_class("Node", None).unwrap();
    ctx.add_field(node, FieldDecl::new("label", TypeId::STRING)).unwrap();
    ctx.add_field(node, FieldDecl::new("next", node)).unwrap();

    let tree = ctx
        .define_class(ClassDef::new("Tree").field("left", node).field("right", node))
        .unwrap();

    let address = ctx
        .define_class(ClassDef::new("Address").field("city", TypeId::STRING).field("lines", TypeId::LIST))
        .unwrap();
    let person = ctx
        .define_class(
            ClassDef::new("Person")
                .field("name", TypeId::STRING)
                .field("address", address)
                .field("scores", TypeId::MAP),
        )
        .unwrap();

    let user_record = ctx
        .define_record(RecordDef::new("UserRecord").component("name", TypeId::STRING).component("roles", TypeId::LIST))
        .unwrap();

    let int_holder = ctx.define_class(ClassDef::new("IntHolder").field("value", TypeId::I32)).unwrap();
    let boxed_holder = ctx.define_class(ClassDef::new("BoxedHolder").field("value", TypeId::BOXED_I32)).unwrap();
    let long_holder = ctx.define_class(ClassDef::new("LongHolder").field("value", TypeId::I64)).unwrap();

    let strings = ctx.array_of(TypeId::STRING).unwrap();

    let model = Model {
        source,
        target,
        profile,
        profile_view,
        node,
        tree,
        address,
        person,
        user_record,
        int_holder,
        boxed_holder,
        long_holder,
        strings,
    };
    (Copier::new(Arc::new(ctx)), model)
}

/// Allocate an instance and set the given fields
pub fn instance(copier: &Copier, ty: TypeId, fields: &[(&str, Value)]) -> ObjRef {
    let obj = copier.allocate(ty).unwrap();
    for (name, value) in fields {
        copier.set(&obj, name, value.clone()).unwrap();
    }
    obj
}

/// Read a field that holds an object reference
pub fn object_field(copier: &Copier, obj: &ObjRef, name: &str) -> ObjRef {
    copier
        .get(obj, name)
        .unwrap()
        .as_object()
        .cloned()
        .unwrap_or_else(|| panic!("field '{}' is not an object", name))
}
