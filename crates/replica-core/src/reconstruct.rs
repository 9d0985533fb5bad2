//! Container reconstruction
//!
//! Produces an empty, mutable container shaped like a source container so
//! deep copy can fill it. The source's own concrete type is used when it can
//! be freshly instantiated; otherwise a canonical mutable fallback is used.

use replica_types::{CollectionFlavor, MapFlavor, Type, TypeContext, TypeId};
use tracing::trace;

use crate::factory;
use crate::object::{Collection, HeapData, MapObject, ObjRef, ObjectError};
use crate::{CopyError, CopyResult};

/// Create an empty container matching `source`, sized for `hint_size`
///
/// Arrays come back with `hint_size` default elements.
pub fn rebuild(types: &TypeContext, source: &ObjRef, hint_size: usize) -> CopyResult<ObjRef> {
    let source_ty = source.type_id();
    match types.get(source_ty).ok_or(CopyError::UnknownType(source_ty))? {
        Type::Array(_) => factory::allocate_array(types, source_ty, hint_size),
        Type::Collection(c) => {
            let flavor = c.flavor;
            Ok(preferred(types, source_ty, hint_size).unwrap_or_else(|| {
                let (ty, flavor) = collection_fallback(flavor);
                ObjRef::new(ty, HeapData::Collection(Collection::with_capacity(flavor, hint_size)))
            }))
        }
        Type::Map(m) => {
            let flavor = m.flavor;
            Ok(preferred(types, source_ty, hint_size).unwrap_or_else(|| {
                let (ty, flavor) = map_fallback(flavor);
                ObjRef::new(ty, HeapData::Map(MapObject::with_capacity(flavor, hint_size)))
            }))
        }
        _ => Err(ObjectError::ShapeMismatch {
            expected: "container",
            found: source.read().kind(),
        }
        .into()),
    }
}

/// The source's own type, if a fresh instance can be made
fn preferred(types: &TypeContext, ty: TypeId, hint_size: usize) -> Option<ObjRef> {
    match factory::allocate_with_capacity(types, ty, hint_size) {
        Ok(obj) => Some(obj),
        Err(err) => {
            trace!(type_name = %types.name_of(ty), error = %err, "using fallback container");
            None
        }
    }
}

fn collection_fallback(flavor: CollectionFlavor) -> (TypeId, CollectionFlavor) {
    match flavor {
        CollectionFlavor::Set | CollectionFlavor::SortedSet => (TypeId::LINKED_HASH_SET, CollectionFlavor::Set),
        CollectionFlavor::Deque => (TypeId::ARRAY_DEQUE, CollectionFlavor::Deque),
        CollectionFlavor::List => (TypeId::ARRAY_LIST, CollectionFlavor::List),
    }
}

fn map_fallback(flavor: MapFlavor) -> (TypeId, MapFlavor) {
    match flavor {
        MapFlavor::Sorted => (TypeId::TREE_MAP, MapFlavor::Sorted),
        MapFlavor::Hash | MapFlavor::Linked => (TypeId::LINKED_HASH_MAP, MapFlavor::Linked),
    }
}
