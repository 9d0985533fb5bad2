//! Copy plans
//!
//! A plan is the resolved list of (source field, destination field) pairs
//! for one ordered pair of types. Fields pair up by name, and only when the
//! destination is writable and accepts the source's declared type.

use std::sync::Arc;

use dashmap::DashMap;
use replica_types::{TypeContext, TypeId};
use tracing::{debug, trace};

use crate::introspect::{FieldDescriptor, TypeDescriptors};

/// One matched field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Field read from the source
    pub source: FieldDescriptor,
    /// Field written on the destination
    pub dest: FieldDescriptor,
}

impl Binding {
    /// Shared field name
    pub fn name(&self) -> &str {
        self.source.name()
    }
}

/// Resolved field mapping between two types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyPlan {
    source_type: TypeId,
    dest_type: TypeId,
    bindings: Vec<Binding>,
}

impl CopyPlan {
    /// Source type
    pub fn source_type(&self) -> TypeId {
        self.source_type
    }

    /// Destination type
    pub fn dest_type(&self) -> TypeId {
        self.dest_type
    }

    /// Bindings in source declaration order
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Whether no field matched
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Resolve a plan without consulting any cache
pub fn resolve(types: &TypeContext, source: &TypeDescriptors, dest: &TypeDescriptors) -> CopyPlan {
    let mut bindings = Vec::new();
    for field in source.visible() {
        let Some(target) = dest.find(field.name()) else {
            continue;
        };
        if target.setter().is_none() {
            continue;
        }
        if !types.is_compatible(field.declared_type(), target.declared_type()) {
            trace!(
                field = field.name(),
                source = %types.name_of(field.declared_type()),
                dest = %types.name_of(target.declared_type()),
                "binding rejected"
            );
            continue;
        }
        bindings.push(Binding {
            source: field.clone(),
            dest: target.clone(),
        });
    }
    CopyPlan {
        source_type: source.type_id(),
        dest_type: dest.type_id(),
        bindings,
    }
}

/// Per-type-pair plan cache
#[derive(Debug, Default)]
pub struct PlanCache {
    entries: DashMap<(TypeId, TypeId), Arc<CopyPlan>>,
}

impl PlanCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached plan
    pub fn get(&self, source: TypeId, dest: TypeId) -> Option<Arc<CopyPlan>> {
        self.entries.get(&(source, dest)).map(|entry| entry.value().clone())
    }

    /// Install a freshly resolved plan, keeping any plan installed first
    pub fn install(&self, plan: CopyPlan) -> Arc<CopyPlan> {
        let key = (plan.source_type, plan.dest_type);
        debug!(source = %key.0, dest = %key.1, bindings = plan.bindings.len(), "resolved copy plan");
        let installed = self.entries.entry(key).or_insert_with(|| Arc::new(plan));
        installed.value().clone()
    }

    /// Number of cached plans
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
