//! Replica Type Model
//!
//! Runtime type descriptors, the type registry, value shape classification,
//! and the compatibility rules used to match fields between types.

#![warn(missing_docs)]

pub mod compat;
pub mod context;
pub mod error;
pub mod shape;
pub mod ty;

pub use compat::CompatibilityContext;
pub use context::{ClassDef, CollectionDef, FieldSlot, MapDef, RecordDef, TypeContext, TypeResult};
pub use error::TypeError;
pub use shape::ValueShape;
pub use ty::{
    ArrayType, ClassType, CollectionFlavor, CollectionType, EnumType, FieldDecl, FieldModifiers,
    InterfaceType, MapFlavor, MapType, PrimitiveType, RecordType, ScalarType, Type, TypeId,
};
