//! Heap object model
//!
//! Every mutable aggregate lives behind an [`ObjRef`]: a shared handle whose
//! pointer address is the object's identity. Instances keep their fields in a
//! flat slot vector laid out by [`TypeContext::field_slots`], records keep
//! their components positionally, and containers wrap ordinary Rust
//! collections.
//!
//! [`TypeContext::field_slots`]: replica_types::TypeContext::field_slots

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::hash::BuildHasherDefault;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use replica_types::{CollectionFlavor, MapFlavor, TypeId};
use rustc_hash::FxHasher;

use crate::value::Value;

type FxBuild = BuildHasherDefault<FxHasher>;

/// Object access errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectError {
    /// Slot or element index past the end
    #[error("Index {index} out of bounds (length {len})")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Actual length
        len: usize,
    },

    /// Mutation of a container whose contents are fixed
    #[error("Cannot modify an immutable {kind}")]
    Frozen {
        /// Container kind
        kind: &'static str,
    },

    /// Operation applied to the wrong kind of object
    #[error("Expected {expected}, found {found}")]
    ShapeMismatch {
        /// Kind the operation needs
        expected: &'static str,
        /// Kind of the object
        found: &'static str,
    },
}

/// A heap object: its runtime type and its contents
#[derive(Debug)]
pub struct HeapObject {
    /// Runtime type
    pub type_id: TypeId,
    /// Contents
    pub data: HeapData,
}

/// Contents of a heap object
#[derive(Debug, Clone)]
pub enum HeapData {
    /// Class instance: one value per instance field slot
    Instance(Vec<Value>),
    /// Record: components in declaration order
    Record(Vec<Value>),
    /// Fixed-length array
    Array(Vec<Value>),
    /// List, deque or set
    Collection(Collection),
    /// Key/value map
    Map(MapObject),
}

impl HeapData {
    /// Kind name used in error messages
    pub const fn kind(&self) -> &'static str {
        match self {
            HeapData::Instance(_) => "instance",
            HeapData::Record(_) => "record",
            HeapData::Array(_) => "array",
            HeapData::Collection(_) => "collection",
            HeapData::Map(_) => "map",
        }
    }

    /// Read an instance slot
    pub fn slot(&self, index: usize) -> Result<Value, ObjectError> {
        match self {
            HeapData::Instance(slots) => read_at(slots, index),
            other => Err(other.mismatch("instance")),
        }
    }

    /// Write an instance slot
    pub fn set_slot(&mut self, index: usize, value: Value) -> Result<(), ObjectError> {
        match self {
            HeapData::Instance(slots) => write_at(slots, index, value),
            other => Err(other.mismatch("instance")),
        }
    }

    /// Read a record component
    pub fn component(&self, index: usize) -> Result<Value, ObjectError> {
        match self {
            HeapData::Record(components) => read_at(components, index),
            other => Err(other.mismatch("record")),
        }
    }

    /// All record components
    pub fn components(&self) -> Result<&[Value], ObjectError> {
        match self {
            HeapData::Record(components) => Ok(components),
            other => Err(other.mismatch("record")),
        }
    }

    /// All array elements
    pub fn elements(&self) -> Result<&[Value], ObjectError> {
        match self {
            HeapData::Array(elements) => Ok(elements),
            other => Err(other.mismatch("array")),
        }
    }

    /// Read an array element
    pub fn element(&self, index: usize) -> Result<Value, ObjectError> {
        match self {
            HeapData::Array(elements) => read_at(elements, index),
            other => Err(other.mismatch("array")),
        }
    }

    /// Write an array element
    pub fn set_element(&mut self, index: usize, value: Value) -> Result<(), ObjectError> {
        match self {
            HeapData::Array(elements) => write_at(elements, index, value),
            other => Err(other.mismatch("array")),
        }
    }

    /// Borrow the collection payload
    pub fn as_collection(&self) -> Result<&Collection, ObjectError> {
        match self {
            HeapData::Collection(c) => Ok(c),
            other => Err(other.mismatch("collection")),
        }
    }

    /// Mutably borrow the collection payload
    pub fn as_collection_mut(&mut self) -> Result<&mut Collection, ObjectError> {
        match self {
            HeapData::Collection(c) => Ok(c),
            other => Err(other.mismatch("collection")),
        }
    }

    /// Borrow the map payload
    pub fn as_map(&self) -> Result<&MapObject, ObjectError> {
        match self {
            HeapData::Map(m) => Ok(m),
            other => Err(other.mismatch("map")),
        }
    }

    /// Mutably borrow the map payload
    pub fn as_map_mut(&mut self) -> Result<&mut MapObject, ObjectError> {
        match self {
            HeapData::Map(m) => Ok(m),
            other => Err(other.mismatch("map")),
        }
    }

    fn mismatch(&self, expected: &'static str) -> ObjectError {
        ObjectError::ShapeMismatch {
            expected,
            found: self.kind(),
        }
    }
}

fn read_at(values: &[Value], index: usize) -> Result<Value, ObjectError> {
    values.get(index).cloned().ok_or(ObjectError::IndexOutOfBounds {
        index,
        len: values.len(),
    })
}

fn write_at(values: &mut [Value], index: usize, value: Value) -> Result<(), ObjectError> {
    let len = values.len();
    match values.get_mut(index) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(ObjectError::IndexOutOfBounds { index, len }),
    }
}

// ============================================================================
// Collections
// ============================================================================

/// Storage of a collection
#[derive(Debug, Clone)]
enum CollectionData {
    /// Ordered sequence
    List(Vec<Value>),
    /// Double-ended queue
    Deque(VecDeque<Value>),
    /// Insertion-ordered unique elements
    Set(IndexSet<Value, FxBuild>),
    /// Sorted unique elements
    SortedSet(BTreeSet<Value>),
}

/// A collection object
#[derive(Debug, Clone)]
pub struct Collection {
    data: CollectionData,
    frozen: bool,
}

impl Collection {
    /// Create an empty, mutable collection
    pub fn with_capacity(flavor: CollectionFlavor, capacity: usize) -> Self {
        let data = match flavor {
            CollectionFlavor::List => CollectionData::List(Vec::with_capacity(capacity)),
            CollectionFlavor::Deque => CollectionData::Deque(VecDeque::with_capacity(capacity)),
            CollectionFlavor::Set => {
                CollectionData::Set(IndexSet::with_capacity_and_hasher(capacity, FxBuild::default()))
            }
            CollectionFlavor::SortedSet => CollectionData::SortedSet(BTreeSet::new()),
        };
        Self { data, frozen: false }
    }

    /// Create a collection holding `values`, optionally fixed afterwards
    pub fn from_values(flavor: CollectionFlavor, values: Vec<Value>, frozen: bool) -> Self {
        let mut collection = Self::with_capacity(flavor, values.len());
        for value in values {
            collection.add_unchecked(value);
        }
        collection.frozen = frozen;
        collection
    }

    /// Whether the contents are fixed
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match &self.data {
            CollectionData::List(v) => v.len(),
            CollectionData::Deque(d) => d.len(),
            CollectionData::Set(s) => s.len(),
            CollectionData::SortedSet(s) => s.len(),
        }
    }

    /// Whether the collection has no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the elements in iteration order
    pub fn to_vec(&self) -> Vec<Value> {
        match &self.data {
            CollectionData::List(v) => v.clone(),
            CollectionData::Deque(d) => d.iter().cloned().collect(),
            CollectionData::Set(s) => s.iter().cloned().collect(),
            CollectionData::SortedSet(s) => s.iter().cloned().collect(),
        }
    }

    /// Append an element (sets ignore duplicates)
    pub fn add(&mut self, value: Value) -> Result<(), ObjectError> {
        if self.frozen {
            return Err(ObjectError::Frozen { kind: "collection" });
        }
        self.add_unchecked(value);
        Ok(())
    }

    fn add_unchecked(&mut self, value: Value) {
        match &mut self.data {
            CollectionData::List(v) => v.push(value),
            CollectionData::Deque(d) => d.push_back(value),
            CollectionData::Set(s) => {
                s.insert(value);
            }
            CollectionData::SortedSet(s) => {
                s.insert(value);
            }
        }
    }
}

// ============================================================================
// Maps
// ============================================================================

/// Storage of a map
#[derive(Debug, Clone)]
enum MapData {
    /// Insertion-ordered entries
    Ordered(IndexMap<Value, Value, FxBuild>),
    /// Key-sorted entries
    Sorted(BTreeMap<Value, Value>),
}

/// A map object
#[derive(Debug, Clone)]
pub struct MapObject {
    data: MapData,
    frozen: bool,
}

impl MapObject {
    /// Create an empty, mutable map
    pub fn with_capacity(flavor: MapFlavor, capacity: usize) -> Self {
        let data = match flavor {
            MapFlavor::Hash | MapFlavor::Linked => {
                MapData::Ordered(IndexMap::with_capacity_and_hasher(capacity, FxBuild::default()))
            }
            MapFlavor::Sorted => MapData::Sorted(BTreeMap::new()),
        };
        Self { data, frozen: false }
    }

    /// Create a map holding `entries`, optionally fixed afterwards
    pub fn from_entries(flavor: MapFlavor, entries: Vec<(Value, Value)>, frozen: bool) -> Self {
        let mut map = Self::with_capacity(flavor, entries.len());
        for (key, value) in entries {
            map.put_unchecked(key, value);
        }
        map.frozen = frozen;
        map
    }

    /// Whether keys are kept sorted
    pub fn is_sorted(&self) -> bool {
        matches!(self.data, MapData::Sorted(_))
    }

    /// Whether the contents are fixed
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        match &self.data {
            MapData::Ordered(m) => m.len(),
            MapData::Sorted(m) => m.len(),
        }
    }

    /// Whether the map has no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a key
    pub fn get(&self, key: &Value) -> Option<&Value> {
        match &self.data {
            MapData::Ordered(m) => m.get(key),
            MapData::Sorted(m) => m.get(key),
        }
    }

    /// Snapshot of the entries in iteration order
    pub fn entries(&self) -> Vec<(Value, Value)> {
        match &self.data {
            MapData::Ordered(m) => m.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            MapData::Sorted(m) => m.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        }
    }

    /// Insert or replace an entry
    pub fn put(&mut self, key: Value, value: Value) -> Result<(), ObjectError> {
        if self.frozen {
            return Err(ObjectError::Frozen { kind: "map" });
        }
        self.put_unchecked(key, value);
        Ok(())
    }

    fn put_unchecked(&mut self, key: Value, value: Value) {
        match &mut self.data {
            MapData::Ordered(m) => {
                m.insert(key, value);
            }
            MapData::Sorted(m) => {
                m.insert(key, value);
            }
        }
    }
}

// ============================================================================
// Handles
// ============================================================================

/// Shared handle to a heap object
///
/// Cloning the handle shares the object; the pointer address is its
/// identity. Handles are reference counted, so a cycle of objects stays
/// alive until one of its links is overwritten.
#[derive(Clone)]
pub struct ObjRef(Arc<RwLock<HeapObject>>);

impl ObjRef {
    /// Allocate a new heap object
    pub fn new(type_id: TypeId, data: HeapData) -> Self {
        ObjRef(Arc::new(RwLock::new(HeapObject { type_id, data })))
    }

    /// Runtime type of the object
    pub fn type_id(&self) -> TypeId {
        self.0.read().type_id
    }

    /// Check if two handles point to the same object
    #[inline]
    pub fn ptr_eq(a: &ObjRef, b: &ObjRef) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Address of the object, stable for as long as a handle exists
    #[inline]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// Lock the contents for reading
    pub fn read(&self) -> MappedData<'_> {
        MappedData(self.0.read())
    }

    /// Lock the contents for writing
    pub fn write(&self) -> MappedDataMut<'_> {
        MappedDataMut(self.0.write())
    }
}

/// Read guard over a heap object's contents
pub struct MappedData<'a>(RwLockReadGuard<'a, HeapObject>);

impl std::ops::Deref for MappedData<'_> {
    type Target = HeapData;

    fn deref(&self) -> &HeapData {
        &self.0.data
    }
}

/// Write guard over a heap object's contents
pub struct MappedDataMut<'a>(RwLockWriteGuard<'a, HeapObject>);

impl std::ops::Deref for MappedDataMut<'_> {
    type Target = HeapData;

    fn deref(&self) -> &HeapData {
        &self.0.data
    }
}

impl std::ops::DerefMut for MappedDataMut<'_> {
    fn deref_mut(&mut self) -> &mut HeapData {
        &mut self.0.data
    }
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Contents are not printed; graphs may be cyclic
        write!(f, "ObjRef({}@{:#x})", self.type_id(), self.addr())
    }
}
