//! Value shape classification
//!
//! Every registered type is classified once into a [`ValueShape`] so that the
//! deep copy engine dispatches on a closed enum instead of re-inspecting the
//! type on every value.

use crate::ty::Type;

/// How values of a type are treated by deep copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    /// Shared as-is, never cloned
    Immutable,
    /// Fixed-length array
    Array,
    /// Immutable positional aggregate
    Record,
    /// List, deque or set
    Collection,
    /// Key/value map
    Map,
    /// Plain aggregate with mutable fields
    PlainObject,
}

impl ValueShape {
    /// Classify a type
    pub fn of(ty: &Type) -> Self {
        match ty {
            Type::Primitive(_) | Type::Boxed(_) | Type::Scalar(_) | Type::Enum(_) => {
                ValueShape::Immutable
            }
            Type::Class(c) if c.value_like => ValueShape::Immutable,
            Type::Class(_) => ValueShape::PlainObject,
            Type::Record(_) => ValueShape::Record,
            Type::Array(_) => ValueShape::Array,
            Type::Collection(_) => ValueShape::Collection,
            Type::Map(_) => ValueShape::Map,
            // Abstract types never have instances of their own
            Type::Any | Type::Interface(_) => ValueShape::PlainObject,
        }
    }
}
