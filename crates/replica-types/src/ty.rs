//! Core type definitions for the Replica type model

use std::fmt;

/// Unique identifier for a type in a [`TypeContext`](crate::TypeContext)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// The universal root type
    pub const ANY: TypeId = TypeId(0);

    /// Raw `bool`
    pub const BOOL: TypeId = TypeId(1);
    /// Raw `i8`
    pub const I8: TypeId = TypeId(2);
    /// Raw `i16`
    pub const I16: TypeId = TypeId(3);
    /// Raw `i32`
    pub const I32: TypeId = TypeId(4);
    /// Raw `i64`
    pub const I64: TypeId = TypeId(5);
    /// Raw `f32`
    pub const F32: TypeId = TypeId(6);
    /// Raw `f64`
    pub const F64: TypeId = TypeId(7);
    /// Raw `char`
    pub const CHAR: TypeId = TypeId(8);

    /// Boxed `bool`
    pub const BOXED_BOOL: TypeId = TypeId(9);
    /// Boxed `i8`
    pub const BOXED_I8: TypeId = TypeId(10);
    /// Boxed `i16`
    pub const BOXED_I16: TypeId = TypeId(11);
    /// Boxed `i32`
    pub const BOXED_I32: TypeId = TypeId(12);
    /// Boxed `i64`
    pub const BOXED_I64: TypeId = TypeId(13);
    /// Boxed `f32`
    pub const BOXED_F32: TypeId = TypeId(14);
    /// Boxed `f64`
    pub const BOXED_F64: TypeId = TypeId(15);
    /// Boxed `char`
    pub const BOXED_CHAR: TypeId = TypeId(16);

    /// Immutable text
    pub const STRING: TypeId = TypeId(17);
    /// Arbitrary-precision integer
    pub const BIG_INT: TypeId = TypeId(18);
    /// Point in time
    pub const INSTANT: TypeId = TypeId(19);
    /// Span of time
    pub const DURATION: TypeId = TypeId(20);
    /// Type descriptor value
    pub const TYPE: TypeId = TypeId(21);

    /// `Collection` interface
    pub const COLLECTION: TypeId = TypeId(22);
    /// `List` interface
    pub const LIST: TypeId = TypeId(23);
    /// `Deque` interface
    pub const DEQUE: TypeId = TypeId(24);
    /// `Set` interface
    pub const SET: TypeId = TypeId(25);
    /// `SortedSet` interface
    pub const SORTED_SET: TypeId = TypeId(26);
    /// `Map` interface
    pub const MAP: TypeId = TypeId(27);
    /// `SortedMap` interface
    pub const SORTED_MAP: TypeId = TypeId(28);

    /// Growable list
    pub const ARRAY_LIST: TypeId = TypeId(29);
    /// Double-ended queue
    pub const ARRAY_DEQUE: TypeId = TypeId(30);
    /// Hash set
    pub const HASH_SET: TypeId = TypeId(31);
    /// Insertion-ordered set
    pub const LINKED_HASH_SET: TypeId = TypeId(32);
    /// Sorted set
    pub const TREE_SET: TypeId = TypeId(33);
    /// Hash map
    pub const HASH_MAP: TypeId = TypeId(34);
    /// Insertion-ordered map
    pub const LINKED_HASH_MAP: TypeId = TypeId(35);
    /// Sorted map
    pub const TREE_MAP: TypeId = TypeId(36);

    /// Platform-immutable list
    pub const IMMUTABLE_LIST: TypeId = TypeId(37);
    /// Platform-immutable set
    pub const IMMUTABLE_SET: TypeId = TypeId(38);
    /// Platform-immutable map
    pub const IMMUTABLE_MAP: TypeId = TypeId(39);

    /// Raw index of this id
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Raw (non-nullable) primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Boolean
    Bool,
    /// 8-bit signed integer
    I8,
    /// 16-bit signed integer
    I16,
    /// 32-bit signed integer
    I32,
    /// 64-bit signed integer
    I64,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
    /// Unicode scalar
    Char,
}

impl PrimitiveType {
    /// All primitive types, in prelude order
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Bool,
        PrimitiveType::I8,
        PrimitiveType::I16,
        PrimitiveType::I32,
        PrimitiveType::I64,
        PrimitiveType::F32,
        PrimitiveType::F64,
        PrimitiveType::Char,
    ];

    /// Name of the raw primitive
    pub const fn type_name(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::I8 => "i8",
            PrimitiveType::I16 => "i16",
            PrimitiveType::I32 => "i32",
            PrimitiveType::I64 => "i64",
            PrimitiveType::F32 => "f32",
            PrimitiveType::F64 => "f64",
            PrimitiveType::Char => "char",
        }
    }

    /// Name of the boxed wrapper
    pub const fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "Boolean",
            PrimitiveType::I8 => "Byte",
            PrimitiveType::I16 => "Short",
            PrimitiveType::I32 => "Integer",
            PrimitiveType::I64 => "Long",
            PrimitiveType::F32 => "Float",
            PrimitiveType::F64 => "Double",
            PrimitiveType::Char => "Character",
        }
    }

    /// Prelude id of the raw primitive
    pub const fn raw_id(self) -> TypeId {
        match self {
            PrimitiveType::Bool => TypeId::BOOL,
            PrimitiveType::I8 => TypeId::I8,
            PrimitiveType::I16 => TypeId::I16,
            PrimitiveType::I32 => TypeId::I32,
            PrimitiveType::I64 => TypeId::I64,
            PrimitiveType::F32 => TypeId::F32,
            PrimitiveType::F64 => TypeId::F64,
            PrimitiveType::Char => TypeId::CHAR,
        }
    }

    /// Prelude id of the boxed wrapper
    pub const fn boxed_id(self) -> TypeId {
        match self {
            PrimitiveType::Bool => TypeId::BOXED_BOOL,
            PrimitiveType::I8 => TypeId::BOXED_I8,
            PrimitiveType::I16 => TypeId::BOXED_I16,
            PrimitiveType::I32 => TypeId::BOXED_I32,
            PrimitiveType::I64 => TypeId::BOXED_I64,
            PrimitiveType::F32 => TypeId::BOXED_F32,
            PrimitiveType::F64 => TypeId::BOXED_F64,
            PrimitiveType::Char => TypeId::BOXED_CHAR,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Immutable scalar reference types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// Text
    String,
    /// Arbitrary-precision integer
    BigInt,
    /// Point in time
    Instant,
    /// Span of time
    Duration,
    /// Type descriptor
    TypeDescriptor,
}

impl ScalarType {
    /// Name of the scalar type
    pub const fn type_name(self) -> &'static str {
        match self {
            ScalarType::String => "String",
            ScalarType::BigInt => "BigInteger",
            ScalarType::Instant => "Instant",
            ScalarType::Duration => "Duration",
            ScalarType::TypeDescriptor => "Class",
        }
    }
}

/// Field modifiers that influence introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldModifiers {
    /// Class-level field, never part of an instance
    pub is_static: bool,
    /// Compiler-generated field
    pub is_synthetic: bool,
    /// Access-controlled field whose accessor cannot be bound
    pub is_restricted: bool,
}

/// A declared field (or record component)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDecl {
    /// Field name
    pub name: String,
    /// Declared type
    pub ty: TypeId,
    /// Modifiers
    pub modifiers: FieldModifiers,
}

impl FieldDecl {
    /// Create an instance field
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            modifiers: FieldModifiers::default(),
        }
    }

    /// Mark the field static
    pub fn into_static(mut self) -> Self {
        self.modifiers.is_static = true;
        self
    }

    /// Mark the field synthetic
    pub fn into_synthetic(mut self) -> Self {
        self.modifiers.is_synthetic = true;
        self
    }

    /// Mark the field access-restricted
    pub fn into_restricted(mut self) -> Self {
        self.modifiers.is_restricted = true;
        self
    }

    /// Whether the field belongs to instances
    pub fn is_instance_field(&self) -> bool {
        !self.modifiers.is_static && !self.modifiers.is_synthetic
    }
}

/// Enumeration type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumType {
    /// Enum name
    pub name: String,
    /// Variant names, by ordinal
    pub variants: Vec<String>,
}

/// Class type (nominal, single inheritance)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassType {
    /// Class name
    pub name: String,
    /// Parent class (if any)
    pub parent: Option<TypeId>,
    /// Implemented interfaces
    pub implements: Vec<TypeId>,
    /// Fields declared at this level of the hierarchy
    pub fields: Vec<FieldDecl>,
    /// Abstract classes cannot be instantiated
    pub is_abstract: bool,
    /// Instances are immutable by contract and shared instead of cloned
    pub value_like: bool,
}

/// Record type: immutable positional aggregate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordType {
    /// Record name
    pub name: String,
    /// Components in declaration order
    pub components: Vec<FieldDecl>,
    /// Whether the canonical constructor is accessible
    pub constructible: bool,
}

/// Array type: T[]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
    /// Element type
    pub element: TypeId,
}

/// Storage behaviour of a collection type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionFlavor {
    /// Ordered sequence
    List,
    /// Double-ended queue
    Deque,
    /// Unique elements, insertion ordered
    Set,
    /// Unique elements, sorted
    SortedSet,
}

impl CollectionFlavor {
    /// Whether the flavor enforces element uniqueness
    pub const fn is_set(self) -> bool {
        matches!(self, CollectionFlavor::Set | CollectionFlavor::SortedSet)
    }
}

/// Collection type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionType {
    /// Collection name
    pub name: String,
    /// Storage flavor
    pub flavor: CollectionFlavor,
    /// Interfaces or parent collections
    pub supertypes: Vec<TypeId>,
    /// Contents are fixed at construction
    pub immutable: bool,
    /// Whether a fresh empty instance can be created
    pub constructible: bool,
}

/// Storage behaviour of a map type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapFlavor {
    /// Hash map
    Hash,
    /// Insertion-ordered map
    Linked,
    /// Key-sorted map
    Sorted,
}

/// Map type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapType {
    /// Map name
    pub name: String,
    /// Storage flavor
    pub flavor: MapFlavor,
    /// Interfaces or parent maps
    pub supertypes: Vec<TypeId>,
    /// Contents are fixed at construction
    pub immutable: bool,
    /// Whether a fresh empty instance can be created
    pub constructible: bool,
}

/// Interface type (abstract contract)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfaceType {
    /// Interface name
    pub name: String,
    /// Extended interfaces
    pub extends: Vec<TypeId>,
}

/// The core type representation in Replica
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Universal root type
    Any,

    /// Raw primitive (non-nullable)
    Primitive(PrimitiveType),

    /// Boxed primitive (nullable)
    Boxed(PrimitiveType),

    /// Immutable scalar
    Scalar(ScalarType),

    /// Enumeration
    Enum(EnumType),

    /// Class (plain aggregate)
    Class(ClassType),

    /// Record (immutable positional aggregate)
    Record(RecordType),

    /// Array: T[]
    Array(ArrayType),

    /// Collection
    Collection(CollectionType),

    /// Map
    Map(MapType),

    /// Interface
    Interface(InterfaceType),
}

impl Type {
    /// Display name of the type
    pub fn name(&self) -> String {
        match self {
            Type::Any => "Object".to_string(),
            Type::Primitive(p) => p.type_name().to_string(),
            Type::Boxed(p) => p.boxed_name().to_string(),
            Type::Scalar(s) => s.type_name().to_string(),
            Type::Enum(e) => e.name.clone(),
            Type::Class(c) => c.name.clone(),
            Type::Record(r) => r.name.clone(),
            // Element names need the context; see `TypeContext::name_of`
            Type::Array(_) => "[]".to_string(),
            Type::Collection(c) => c.name.clone(),
            Type::Map(m) => m.name.clone(),
            Type::Interface(i) => i.name.clone(),
        }
    }

    /// Whether this is a raw primitive
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// Whether values of this type are immutable and passed by value
    pub fn is_primitive_like(&self) -> bool {
        matches!(
            self,
            Type::Primitive(_) | Type::Boxed(_) | Type::Scalar(_) | Type::Enum(_)
        )
    }

    /// Get the class payload, if this is a class
    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            Type::Class(c) => Some(c),
            _ => None,
        }
    }

    /// Get the record payload, if this is a record
    pub fn as_record(&self) -> Option<&RecordType> {
        match self {
            Type::Record(r) => Some(r),
            _ => None,
        }
    }
}
