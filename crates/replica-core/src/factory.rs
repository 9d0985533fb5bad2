//! Instance factory
//!
//! Allocates blank instances (every slot zero or `Null`, no user logic) and
//! builds records through their canonical positional constructor.

use replica_types::{CollectionType, MapType, Type, TypeContext, TypeId};

use crate::object::{Collection, HeapData, MapObject, ObjRef};
use crate::value::Value;
use crate::{ConstructionError, CopyError, CopyResult};

/// Default value of a declared type: zero for raw primitives, else `Null`
pub fn default_value(types: &TypeContext, ty: TypeId) -> Value {
    match types.get(ty) {
        Some(Type::Primitive(p)) => Value::zero_of(*p),
        _ => Value::Null,
    }
}

/// Whether `value` may be stored in a slot declared as `declared`
pub fn value_fits(types: &TypeContext, value: &Value, declared: TypeId) -> bool {
    if value.is_null() {
        return !types.is_primitive(declared);
    }
    types.is_compatible(value.runtime_type(), declared)
}

/// Allocate a blank instance of `ty`
pub fn allocate(types: &TypeContext, ty: TypeId) -> CopyResult<ObjRef> {
    allocate_with_capacity(types, ty, 0)
}

/// Allocate a blank instance, reserving room for `capacity` container elements
pub fn allocate_with_capacity(types: &TypeContext, ty: TypeId, capacity: usize) -> CopyResult<ObjRef> {
    let data = match types.get(ty).ok_or(CopyError::UnknownType(ty))? {
        Type::Class(class) if class.is_abstract => return Err(not_instantiable(types, ty, "class is abstract")),
        Type::Class(_) => {
            let mut slots = vec![Value::Null; types.slot_count(ty)];
            for field in types.field_slots(ty) {
                slots[field.slot] = default_value(types, field.decl.ty);
            }
            HeapData::Instance(slots)
        }
        Type::Collection(c) => HeapData::Collection(blank_collection(types, ty, c, capacity)?),
        Type::Map(m) => HeapData::Map(blank_map(types, ty, m, capacity)?),
        Type::Record(_) => {
            return Err(not_instantiable(
                types,
                ty,
                "records are built through their canonical constructor",
            ))
        }
        Type::Array(_) => return allocate_array(types, ty, 0),
        Type::Interface(_) | Type::Any => {
            return Err(not_instantiable(types, ty, "abstract types have no instances"))
        }
        Type::Primitive(_) | Type::Boxed(_) | Type::Scalar(_) | Type::Enum(_) => {
            return Err(not_instantiable(types, ty, "immutable values are not allocated"))
        }
    };
    Ok(ObjRef::new(ty, data))
}

fn blank_collection(types: &TypeContext, ty: TypeId, c: &CollectionType, capacity: usize) -> CopyResult<Collection> {
    if !c.constructible {
        return Err(not_instantiable(types, ty, "no fresh instance can be created"));
    }
    Ok(Collection::with_capacity(c.flavor, capacity))
}

fn blank_map(types: &TypeContext, ty: TypeId, m: &MapType, capacity: usize) -> CopyResult<MapObject> {
    if !m.constructible {
        return Err(not_instantiable(types, ty, "no fresh instance can be created"));
    }
    Ok(MapObject::with_capacity(m.flavor, capacity))
}

/// Allocate an array of `len` default elements
pub fn allocate_array(types: &TypeContext, array_ty: TypeId, len: usize) -> CopyResult<ObjRef> {
    let element = array_element(types, array_ty)?;
    let fill = default_value(types, element);
    Ok(ObjRef::new(array_ty, HeapData::Array(vec![fill; len])))
}

/// Build an array holding `values`
pub fn new_array(types: &TypeContext, array_ty: TypeId, values: Vec<Value>) -> CopyResult<ObjRef> {
    let element = array_element(types, array_ty)?;
    if let Some(bad) = values.iter().find(|v| !value_fits(types, v, element)) {
        return Err(not_instantiable(
            types,
            array_ty,
            &format!("element {} does not fit {}", bad, types.name_of(element)),
        ));
    }
    Ok(ObjRef::new(array_ty, HeapData::Array(values)))
}

fn array_element(types: &TypeContext, array_ty: TypeId) -> CopyResult<TypeId> {
    match types.get(array_ty).ok_or(CopyError::UnknownType(array_ty))? {
        Type::Array(a) => Ok(a.element),
        _ => Err(not_instantiable(types, array_ty, "not an array type")),
    }
}

/// Build a collection of a concrete type holding `values`
///
/// Works for immutable types too; their contents are fixed afterwards.
pub fn new_collection(types: &TypeContext, ty: TypeId, values: Vec<Value>) -> CopyResult<ObjRef> {
    match types.get(ty).ok_or(CopyError::UnknownType(ty))? {
        Type::Collection(c) => {
            let collection = Collection::from_values(c.flavor, values, c.immutable);
            Ok(ObjRef::new(ty, HeapData::Collection(collection)))
        }
        _ => Err(not_instantiable(types, ty, "not a concrete collection type")),
    }
}

/// Build a map of a concrete type holding `entries`
pub fn new_map(types: &TypeContext, ty: TypeId, entries: Vec<(Value, Value)>) -> CopyResult<ObjRef> {
    match types.get(ty).ok_or(CopyError::UnknownType(ty))? {
        Type::Map(m) => {
            let map = MapObject::from_entries(m.flavor, entries, m.immutable);
            Ok(ObjRef::new(ty, HeapData::Map(map)))
        }
        _ => Err(not_instantiable(types, ty, "not a concrete map type")),
    }
}

/// Invoke a record's canonical constructor
pub fn construct_record(types: &TypeContext, ty: TypeId, args: Vec<Value>) -> CopyResult<ObjRef> {
    let record = match types.get(ty).ok_or(CopyError::UnknownType(ty))? {
        Type::Record(r) => r,
        _ => return Err(not_instantiable(types, ty, "not a record type")),
    };
    if !record.constructible {
        return Err(not_instantiable(types, ty, "canonical constructor is not accessible"));
    }

    let reject = |cause| CopyError::UnsupportedAggregateConstruction {
        type_name: record.name.clone(),
        cause,
    };
    if args.len() != record.components.len() {
        return Err(reject(ConstructionError::ArityMismatch {
            expected: record.components.len(),
            actual: args.len(),
        }));
    }
    for (component, arg) in record.components.iter().zip(&args) {
        if arg.is_null() && types.is_primitive(component.ty) {
            return Err(reject(ConstructionError::NullPrimitive {
                component: component.name.clone(),
            }));
        }
        if !value_fits(types, arg, component.ty) {
            return Err(reject(ConstructionError::ComponentTypeMismatch {
                component: component.name.clone(),
                expected: types.name_of(component.ty),
                actual: types.name_of(arg.runtime_type()),
            }));
        }
    }
    Ok(ObjRef::new(ty, HeapData::Record(args)))
}

fn not_instantiable(types: &TypeContext, ty: TypeId, reason: &str) -> CopyError {
    CopyError::Instantiation {
        type_name: types.name_of(ty),
        reason: reason.to_string(),
    }
}
