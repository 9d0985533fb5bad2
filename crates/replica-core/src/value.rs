//! Value representation
//!
//! A [`Value`] is either an immutable scalar, passed around by value, or a
//! [`Value::Ref`] to a shared heap object. Scalars are never cloned
//! structurally by the copy engine; only references have identity.
//!
//! `Value` is `Eq + Hash + Ord` so it can key sets and maps:
//!
//! - floats compare by bit pattern (so `NaN == NaN` and `0.0 != -0.0`)
//! - references compare by identity, never by contents
//! - values of different variants order by variant rank

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use num_bigint::BigInt;
use replica_types::{PrimitiveType, TypeId};

use crate::object::ObjRef;

/// An enumerant: the enum type and the variant ordinal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumValue {
    /// Enum type
    pub type_id: TypeId,
    /// Variant ordinal
    pub ordinal: u32,
}

/// A runtime value
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// 8-bit integer
    I8(i8),
    /// 16-bit integer
    I16(i16),
    /// 32-bit integer
    I32(i32),
    /// 64-bit integer
    I64(i64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// Unicode scalar
    Char(char),
    /// Immutable text
    Str(Arc<str>),
    /// Arbitrary-precision integer
    BigInt(Arc<BigInt>),
    /// Point in time
    Instant(SystemTime),
    /// Span of time
    Duration(Duration),
    /// Enumerant
    Enum(EnumValue),
    /// Type descriptor
    Type(TypeId),
    /// Reference to a heap object
    Ref(ObjRef),
}

impl Value {
    /// Zero value of a raw primitive
    pub const fn zero_of(primitive: PrimitiveType) -> Self {
        match primitive {
            PrimitiveType::Bool => Value::Bool(false),
            PrimitiveType::I8 => Value::I8(0),
            PrimitiveType::I16 => Value::I16(0),
            PrimitiveType::I32 => Value::I32(0),
            PrimitiveType::I64 => Value::I64(0),
            PrimitiveType::F32 => Value::F32(0.0),
            PrimitiveType::F64 => Value::F64(0.0),
            PrimitiveType::Char => Value::Char('\0'),
        }
    }

    /// Check if this value is absent
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is a heap reference
    #[inline]
    pub const fn is_ref(&self) -> bool {
        matches!(self, Value::Ref(_))
    }

    /// The primitive this value carries, if any
    pub const fn primitive(&self) -> Option<PrimitiveType> {
        match self {
            Value::Bool(_) => Some(PrimitiveType::Bool),
            Value::I8(_) => Some(PrimitiveType::I8),
            Value::I16(_) => Some(PrimitiveType::I16),
            Value::I32(_) => Some(PrimitiveType::I32),
            Value::I64(_) => Some(PrimitiveType::I64),
            Value::F32(_) => Some(PrimitiveType::F32),
            Value::F64(_) => Some(PrimitiveType::F64),
            Value::Char(_) => Some(PrimitiveType::Char),
            _ => None,
        }
    }

    /// Runtime type of the value
    ///
    /// Primitives report their boxed type, as a value held in a generic
    /// slot would be boxed. `Null` reports the root type.
    pub fn runtime_type(&self) -> TypeId {
        if let Some(p) = self.primitive() {
            return p.boxed_id();
        }
        match self {
            Value::Str(_) => TypeId::STRING,
            Value::BigInt(_) => TypeId::BIG_INT,
            Value::Instant(_) => TypeId::INSTANT,
            Value::Duration(_) => TypeId::DURATION,
            Value::Enum(e) => e.type_id,
            Value::Type(_) => TypeId::TYPE,
            Value::Ref(obj) => obj.type_id(),
            _ => TypeId::ANY,
        }
    }

    /// Extract i32
    pub const fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract the heap reference
    pub const fn as_object(&self) -> Option<&ObjRef> {
        match self {
            Value::Ref(obj) => Some(obj),
            _ => None,
        }
    }

    /// Check reference identity (`false` unless both are the same object)
    pub fn same_ref(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Ref(a), Value::Ref(b)) => ObjRef::ptr_eq(a, b),
            _ => false,
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::I8(_) => 2,
            Value::I16(_) => 3,
            Value::I32(_) => 4,
            Value::I64(_) => 5,
            Value::F32(_) => 6,
            Value::F64(_) => 7,
            Value::Char(_) => 8,
            Value::Str(_) => 9,
            Value::BigInt(_) => 10,
            Value::Instant(_) => 11,
            Value::Duration(_) => 12,
            Value::Enum(_) => 13,
            Value::Type(_) => 14,
            Value::Ref(_) => 15,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Instant(a), Value::Instant(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Ref(a), Value::Ref(b)) => ObjRef::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::I8(i) => i.hash(state),
            Value::I16(i) => i.hash(state),
            Value::I32(i) => i.hash(state),
            Value::I64(i) => i.hash(state),
            Value::F32(f) => f.to_bits().hash(state),
            Value::F64(f) => f.to_bits().hash(state),
            Value::Char(c) => c.hash(state),
            Value::Str(s) => s.hash(state),
            Value::BigInt(b) => b.hash(state),
            Value::Instant(t) => t.hash(state),
            Value::Duration(d) => d.hash(state),
            Value::Enum(e) => e.hash(state),
            Value::Type(t) => t.hash(state),
            Value::Ref(obj) => obj.addr().hash(state),
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::I8(a), Value::I8(b)) => a.cmp(b),
            (Value::I16(a), Value::I16(b)) => a.cmp(b),
            (Value::I32(a), Value::I32(b)) => a.cmp(b),
            (Value::I64(a), Value::I64(b)) => a.cmp(b),
            (Value::F32(a), Value::F32(b)) => a.total_cmp(b),
            (Value::F64(a), Value::F64(b)) => a.total_cmp(b),
            (Value::Char(a), Value::Char(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::BigInt(a), Value::BigInt(b)) => a.cmp(b),
            (Value::Instant(a), Value::Instant(b)) => a.cmp(b),
            (Value::Duration(a), Value::Duration(b)) => a.cmp(b),
            (Value::Enum(a), Value::Enum(b)) => a.cmp(b),
            (Value::Type(a), Value::Type(b)) => a.cmp(b),
            (Value::Ref(a), Value::Ref(b)) => a.addr().cmp(&b.addr()),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "bool({})", b),
            Value::I8(i) => write!(f, "i8({})", i),
            Value::I16(i) => write!(f, "i16({})", i),
            Value::I32(i) => write!(f, "i32({})", i),
            Value::I64(i) => write!(f, "i64({})", i),
            Value::F32(x) => write!(f, "f32({})", x),
            Value::F64(x) => write!(f, "f64({})", x),
            Value::Char(c) => write!(f, "char({:?})", c),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::BigInt(b) => write!(f, "bigint({})", b),
            Value::Instant(t) => write!(f, "instant({:?})", t),
            Value::Duration(d) => write!(f, "duration({:?})", d),
            Value::Enum(e) => write!(f, "enum({}, {})", e.type_id, e.ordinal),
            Value::Type(t) => write!(f, "type({})", t),
            Value::Ref(obj) => write!(f, "ref({}@{:#x})", obj.type_id(), obj.addr()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::I8(i) => write!(f, "{}", i),
            Value::I16(i) => write!(f, "{}", i),
            Value::I32(i) => write!(f, "{}", i),
            Value::I64(i) => write!(f, "{}", i),
            Value::F32(x) => write!(f, "{}", x),
            Value::F64(x) => write!(f, "{}", x),
            Value::Char(c) => write!(f, "{}", c),
            Value::Str(s) => write!(f, "{}", s),
            Value::BigInt(b) => write!(f, "{}", b),
            Value::Instant(t) => write!(f, "{:?}", t),
            Value::Duration(d) => write!(f, "{:?}", d),
            Value::Enum(e) => write!(f, "{}#{}", e.type_id, e.ordinal),
            Value::Type(t) => write!(f, "{}", t),
            Value::Ref(obj) => write!(f, "[object@{:#x}]", obj.addr()),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    char => Char,
    SystemTime => Instant,
    Duration => Duration,
    EnumValue => Enum,
    ObjRef => Ref,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<BigInt> for Value {
    fn from(b: BigInt) -> Self {
        Value::BigInt(Arc::new(b))
    }
}

impl From<&ObjRef> for Value {
    fn from(obj: &ObjRef) -> Self {
        Value::Ref(obj.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{HeapData, ObjRef};
    use std::collections::BTreeSet;

    #[test]
    fn test_value_null() {
        let v = Value::Null;
        assert!(v.is_null());
        assert!(!v.is_ref());
        assert_eq!(v.runtime_type(), TypeId::ANY);
        assert_eq!(Value::default(), Value::Null);
    }

    #[test]
    fn test_zero_of() {
        assert_eq!(Value::zero_of(PrimitiveType::I32), Value::I32(0));
        assert_eq!(Value::zero_of(PrimitiveType::Bool), Value::Bool(false));
        assert_eq!(Value::zero_of(PrimitiveType::Char), Value::Char('\0'));
    }

    #[test]
    fn test_runtime_type_boxes_primitives() {
        assert_eq!(Value::I32(1).runtime_type(), TypeId::BOXED_I32);
        assert_eq!(Value::Bool(true).runtime_type(), TypeId::BOXED_BOOL);
        assert_eq!(Value::from("x").runtime_type(), TypeId::STRING);
    }

    #[test]
    fn test_float_equality_by_bits() {
        assert_eq!(Value::F64(f64::NAN), Value::F64(f64::NAN));
        assert_ne!(Value::F64(0.0), Value::F64(-0.0));
    }

    #[test]
    fn test_ref_identity() {
        let a = ObjRef::new(TypeId::ANY, HeapData::Instance(vec![]));
        let b = ObjRef::new(TypeId::ANY, HeapData::Instance(vec![]));
        let va = Value::from(&a);
        assert_eq!(va, Value::Ref(a.clone()));
        assert_ne!(va, Value::Ref(b));
        assert!(va.same_ref(&Value::Ref(a)));
        assert!(!Value::I32(1).same_ref(&Value::I32(1)));
    }

    #[test]
    fn test_ordering_across_variants() {
        let set: BTreeSet<Value> = [Value::from("b"), Value::I32(2), Value::Null, Value::from("a"), Value::I32(1)]
            .into_iter()
            .collect();
        let ordered: Vec<Value> = set.into_iter().collect();
        assert_eq!(
            ordered,
            vec![Value::Null, Value::I32(1), Value::I32(2), Value::from("a"), Value::from("b")]
        );
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(7i64)), Value::I64(7));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Value::Null), "null");
        assert_eq!(format!("{}", Value::I32(-10)), "-10");
        assert_eq!(format!("{}", Value::from("张三")), "张三");
        assert_eq!(format!("{:?}", Value::I32(42)), "i32(42)");
    }
}
