//! Deep copy engine
//!
//! Walks an object graph and produces an independent copy of every mutable
//! object in it. Immutable values are shared. Every copy is registered in the
//! [`VisitedMap`] before its children are copied, so a child that refers
//! back to an ancestor resolves to the ancestor's copy and a node reachable
//! along two paths is copied once.
//!
//! Records are the exception: their components must exist before the record
//! can be constructed, so a record is only registered after construction. A
//! record reached again while its own components are still being copied
//! cannot be rebuilt and fails with [`ConstructionError::CyclicRecord`].

use replica_types::{TypeContext, TypeId, ValueShape};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::factory;
use crate::introspect::DescriptorCache;
use crate::object::ObjRef;
use crate::reconstruct;
use crate::value::Value;
use crate::{ConstructionError, CopyError, CopyResult};

/// Identity map from source objects to their copies
///
/// Scoped to one top-level deep copy.
#[derive(Debug, Default)]
pub struct VisitedMap {
    copies: FxHashMap<usize, ObjRef>,
    building: FxHashSet<usize>,
}

impl VisitedMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the copy of `source`
    pub fn insert(&mut self, source: &ObjRef, copy: ObjRef) {
        self.copies.insert(source.addr(), copy);
    }

    /// Copy already produced for `source`
    pub fn get(&self, source: &ObjRef) -> Option<&ObjRef> {
        self.copies.get(&source.addr())
    }

    /// Number of copied objects
    pub fn len(&self) -> usize {
        self.copies.len()
    }

    /// Whether nothing has been copied
    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }
}

/// One deep copy in progress
pub struct DeepCopier<'a> {
    types: &'a TypeContext,
    descriptors: &'a DescriptorCache,
    max_depth: Option<usize>,
    visited: VisitedMap,
    depth: usize,
}

impl<'a> DeepCopier<'a> {
    /// Start a deep copy with an empty visited map
    pub fn new(types: &'a TypeContext, descriptors: &'a DescriptorCache, max_depth: Option<usize>) -> Self {
        Self {
            types,
            descriptors,
            max_depth,
            visited: VisitedMap::new(),
            depth: 0,
        }
    }

    /// Treat `copy` as the copy of `source` from the start
    pub fn seed(&mut self, source: &ObjRef, copy: ObjRef) {
        self.visited.insert(source, copy);
    }

    /// Objects copied so far
    pub fn visited(&self) -> &VisitedMap {
        &self.visited
    }

    /// Deep copy a value
    pub fn copy_value(&mut self, value: &Value) -> CopyResult<Value> {
        match value {
            Value::Ref(obj) => Ok(Value::Ref(self.copy_object(obj)?)),
            other => Ok(other.clone()),
        }
    }

    /// Deep copy an object
    pub fn copy_object(&mut self, obj: &ObjRef) -> CopyResult<ObjRef> {
        let ty = obj.type_id();
        let copy_shape: fn(&mut Self, &ObjRef, TypeId) -> CopyResult<ObjRef> =
            match self.types.shape(ty).ok_or(CopyError::UnknownType(ty))? {
                ValueShape::Immutable => return Ok(obj.clone()),
                ValueShape::Array => |this, obj, _| this.copy_array(obj),
                ValueShape::Record => |this, obj, ty| this.copy_record(obj, ty),
                ValueShape::Collection => |this, obj, _| this.copy_collection(obj),
                ValueShape::Map => |this, obj, _| this.copy_map(obj),
                ValueShape::PlainObject => |this, obj, ty| this.copy_plain(obj, ty),
            };
        if let Some(copy) = self.visited.get(obj) {
            return Ok(copy.clone());
        }

        self.enter()?;
        let result = copy_shape(self, obj, ty);
        self.depth -= 1;
        result
    }

    fn enter(&mut self) -> CopyResult<()> {
        if let Some(limit) = self.max_depth {
            if self.depth >= limit {
                return Err(CopyError::DepthLimitExceeded { limit });
            }
        }
        self.depth += 1;
        Ok(())
    }

    fn copy_array(&mut self, obj: &ObjRef) -> CopyResult<ObjRef> {
        let elements = obj.read().elements()?.to_vec();
        let copy = reconstruct::rebuild(self.types, obj, elements.len())?;
        self.visited.insert(obj, copy.clone());
        for (index, element) in elements.iter().enumerate() {
            let value = self.copy_value(element)?;
            copy.write().set_element(index, value)?;
        }
        Ok(copy)
    }

    fn copy_record(&mut self, obj: &ObjRef, ty: TypeId) -> CopyResult<ObjRef> {
        let components = obj.read().components()?.to_vec();
        if !self.visited.building.insert(obj.addr()) {
            return Err(CopyError::UnsupportedAggregateConstruction {
                type_name: self.types.name_of(ty),
                cause: ConstructionError::CyclicRecord,
            });
        }
        let args: CopyResult<Vec<Value>> = components.iter().map(|c| self.copy_value(c)).collect();
        self.visited.building.remove(&obj.addr());

        let copy = factory::construct_record(self.types, ty, args?)?;
        self.visited.insert(obj, copy.clone());
        Ok(copy)
    }

    fn copy_collection(&mut self, obj: &ObjRef) -> CopyResult<ObjRef> {
        let elements = obj.read().as_collection()?.to_vec();
        let copy = reconstruct::rebuild(self.types, obj, elements.len())?;
        self.visited.insert(obj, copy.clone());
        for element in &elements {
            let value = self.copy_value(element)?;
            copy.write().as_collection_mut()?.add(value)?;
        }
        Ok(copy)
    }

    fn copy_map(&mut self, obj: &ObjRef) -> CopyResult<ObjRef> {
        let entries = obj.read().as_map()?.entries();
        let copy = reconstruct::rebuild(self.types, obj, entries.len())?;
        self.visited.insert(obj, copy.clone());
        for (key, value) in &entries {
            let key = self.copy_value(key)?;
            let value = self.copy_value(value)?;
            copy.write().as_map_mut()?.put(key, value)?;
        }
        Ok(copy)
    }

    fn copy_plain(&mut self, obj: &ObjRef, ty: TypeId) -> CopyResult<ObjRef> {
        let descriptors = self.descriptors.get_or_introspect(self.types, ty)?;
        let copy = factory::allocate(self.types, ty)?;
        self.visited.insert(obj, copy.clone());
        for field in descriptors.fields() {
            let value = field.get(obj)?;
            if value.is_null() {
                continue;
            }
            let value = self.copy_value(&value)?;
            field.set(&copy, value)?;
        }
        Ok(copy)
    }
}
