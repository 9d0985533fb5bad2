//! Type introspection
//!
//! Turns a registered type into the ordered list of field descriptors the
//! copy engine works with. A class contributes every instance field across
//! its ancestry, most-derived level first; a record contributes its
//! components in declaration order, readable but never writable.
//!
//! Descriptors are pure functions of the type context, so they are cached
//! per type in a [`DescriptorCache`] and shared behind an `Arc`.

use std::sync::Arc;

use dashmap::DashMap;
use replica_types::{FieldSlot, Type, TypeContext, TypeId};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::object::{HeapData, ObjRef, ObjectError};
use crate::value::Value;
use crate::{CopyError, CopyResult};

/// How a field value is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Getter {
    /// Instance slot
    Slot(usize),
    /// Record component
    Component(usize),
}

impl Getter {
    /// Read the field from an object's contents
    pub fn read(&self, data: &HeapData) -> Result<Value, ObjectError> {
        match *self {
            Getter::Slot(index) => data.slot(index),
            Getter::Component(index) => data.component(index),
        }
    }
}

/// How a field value is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Setter {
    slot: usize,
    raw_primitive: bool,
}

impl Setter {
    /// Write the field into an object's contents
    ///
    /// A raw primitive slot cannot hold `Null`; such writes leave the slot
    /// untouched.
    pub fn write(&self, data: &mut HeapData, value: Value) -> Result<(), ObjectError> {
        if self.raw_primitive && value.is_null() {
            return Ok(());
        }
        data.set_slot(self.slot, value)
    }
}

/// A copyable field of a type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    name: Arc<str>,
    owner: Arc<str>,
    declaring: TypeId,
    declared_type: TypeId,
    primitive_like: bool,
    getter: Getter,
    setter: Option<Setter>,
}

impl FieldDescriptor {
    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type that declares the field
    pub fn declaring_type(&self) -> TypeId {
        self.declaring
    }

    /// Declared type of the field
    pub fn declared_type(&self) -> TypeId {
        self.declared_type
    }

    /// Whether values of the field are immutable scalars
    pub fn is_primitive_like(&self) -> bool {
        self.primitive_like
    }

    /// Accessor
    pub fn getter(&self) -> Getter {
        self.getter
    }

    /// Mutator, absent for record components
    pub fn setter(&self) -> Option<Setter> {
        self.setter
    }

    /// Read the field of `obj`
    pub fn get(&self, obj: &ObjRef) -> CopyResult<Value> {
        let data = obj.read();
        self.getter.read(&data).map_err(|err| self.access_error(err.to_string()))
    }

    /// Write the field of `obj`
    pub fn set(&self, obj: &ObjRef, value: Value) -> CopyResult<()> {
        let Some(setter) = self.setter else {
            return Err(self.access_error("field has no mutator".to_string()));
        };
        let mut data = obj.write();
        setter.write(&mut data, value).map_err(|err| self.access_error(err.to_string()))
    }

    fn access_error(&self, reason: String) -> CopyError {
        CopyError::FieldAccess {
            type_name: self.owner.to_string(),
            field: self.name.to_string(),
            reason,
        }
    }
}

/// The introspected fields of one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptors {
    type_id: TypeId,
    type_name: Arc<str>,
    fields: Vec<FieldDescriptor>,
    by_name: FxHashMap<Arc<str>, usize>,
}

impl TypeDescriptors {
    /// Type these descriptors belong to
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Display name of the type
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Every descriptor, hidden ancestor fields included
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Descriptors reachable by name (the most-derived of each name)
    pub fn visible(&self) -> impl Iterator<Item = &FieldDescriptor> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter(|(index, field)| self.by_name.get(field.name()) == Some(index))
            .map(|(_, field)| field)
    }

    /// Look up a field by name
    pub fn find(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&index| &self.fields[index])
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the type has no copyable fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Introspect a type without consulting any cache
pub fn introspect(types: &TypeContext, id: TypeId) -> CopyResult<TypeDescriptors> {
    let ty = types.get(id).ok_or(CopyError::UnknownType(id))?;
    let type_name: Arc<str> = Arc::from(types.name_of(id));

    let fields = match ty {
        Type::Class(_) => {
            let mut fields = Vec::new();
            for slot in types.field_slots(id) {
                if !slot.decl.is_instance_field() {
                    continue;
                }
                match bind_slot(types, &type_name, &slot) {
                    Ok(field) => fields.push(field),
                    Err(err) => {
                        trace!(type_name = %type_name, field = %slot.decl.name, error = %err, "field excluded");
                    }
                }
            }
            fields
        }
        Type::Record(record) => record
            .components
            .iter()
            .enumerate()
            .map(|(index, component)| FieldDescriptor {
                name: Arc::from(component.name.as_str()),
                owner: type_name.clone(),
                declaring: id,
                declared_type: component.ty,
                primitive_like: is_primitive_like(types, component.ty),
                getter: Getter::Component(index),
                setter: None,
            })
            .collect(),
        _ => Vec::new(),
    };

    let mut by_name = FxHashMap::default();
    for (index, field) in fields.iter().enumerate() {
        by_name.entry(field.name.clone()).or_insert(index);
    }

    Ok(TypeDescriptors {
        type_id: id,
        type_name,
        fields,
        by_name,
    })
}

fn bind_slot(types: &TypeContext, owner: &Arc<str>, slot: &FieldSlot<'_>) -> CopyResult<FieldDescriptor> {
    let decl = slot.decl;
    if decl.modifiers.is_restricted {
        return Err(CopyError::FieldAccess {
            type_name: types.name_of(slot.declaring),
            field: decl.name.clone(),
            reason: "access is restricted".to_string(),
        });
    }
    Ok(FieldDescriptor {
        name: Arc::from(decl.name.as_str()),
        owner: owner.clone(),
        declaring: slot.declaring,
        declared_type: decl.ty,
        primitive_like: is_primitive_like(types, decl.ty),
        getter: Getter::Slot(slot.slot),
        setter: Some(Setter {
            slot: slot.slot,
            raw_primitive: types.is_primitive(decl.ty),
        }),
    })
}

fn is_primitive_like(types: &TypeContext, id: TypeId) -> bool {
    types.get(id).is_some_and(Type::is_primitive_like)
}

/// Per-type descriptor cache
#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: DashMap<TypeId, Arc<TypeDescriptors>>,
}

impl DescriptorCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached descriptors of a type, introspecting on a miss
    ///
    /// Racing callers may both introspect; the first install wins and every
    /// caller returns the installed value. Failures install nothing.
    pub fn get_or_introspect(&self, types: &TypeContext, id: TypeId) -> CopyResult<Arc<TypeDescriptors>> {
        if let Some(hit) = self.entries.get(&id) {
            return Ok(hit.value().clone());
        }
        let computed = Arc::new(introspect(types, id)?);
        debug!(type_name = computed.type_name(), fields = computed.len(), "introspected type");
        let installed = self.entries.entry(id).or_insert(computed);
        Ok(installed.value().clone())
    }

    /// Number of cached types
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
