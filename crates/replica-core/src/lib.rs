//! Replica Core
//!
//! Object-graph copy engine. This crate provides:
//! - A value and heap object model keyed by runtime [`TypeId`]s
//! - Cached per-type field introspection and per-type-pair copy plans
//! - Shallow and deep field copies with include/exclude filtering
//! - Cycle- and sharing-preserving deep cloning of arbitrary graphs
//! - Container reconstruction with mutable fallbacks

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod copier;
pub mod deep;
pub mod factory;
pub mod introspect;
pub mod object;
pub mod options;
pub mod plan;
pub mod reconstruct;
pub mod value;

pub use copier::{CopierConfig, CopyEngine, Copier};
pub use introspect::{FieldDescriptor, Getter, Setter, TypeDescriptors};
pub use object::{Collection, HeapData, HeapObject, MapObject, ObjRef, ObjectError};
pub use options::{CopyOptions, CopyOptionsBuilder};
pub use plan::{Binding, CopyPlan};
pub use value::{EnumValue, Value};

use replica_types::TypeId;

/// Why a record could not be rebuilt through its canonical constructor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    /// Wrong number of positional arguments
    #[error("expected {expected} arguments, got {actual}")]
    ArityMismatch {
        /// Declared component count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// Argument does not fit the component's declared type
    #[error("component '{component}' expects {expected}, got {actual}")]
    ComponentTypeMismatch {
        /// Component name
        component: String,
        /// Declared type name
        expected: String,
        /// Runtime type name of the argument
        actual: String,
    },

    /// Absent value for a raw primitive component
    #[error("component '{component}' is a primitive and cannot be null")]
    NullPrimitive {
        /// Component name
        component: String,
    },

    /// The record is reachable from its own components
    #[error("record is reachable from its own components")]
    CyclicRecord,
}

/// Copy errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CopyError {
    /// No usable construction path for a type
    #[error("Cannot instantiate {type_name}: {reason}")]
    Instantiation {
        /// Offending type
        type_name: String,
        /// What went wrong
        reason: String,
    },

    /// A field accessor could not be bound or applied
    #[error("Cannot access field '{field}' of {type_name}: {reason}")]
    FieldAccess {
        /// Declaring type
        type_name: String,
        /// Field name
        field: String,
        /// What went wrong
        reason: String,
    },

    /// A record's canonical constructor rejected the rebuilt arguments
    #[error("Cannot construct record {type_name}")]
    UnsupportedAggregateConstruction {
        /// Record type
        type_name: String,
        /// Underlying cause
        #[source]
        cause: ConstructionError,
    },

    /// Deep copy nested deeper than the configured limit
    #[error("Deep copy exceeded the depth limit of {limit}")]
    DepthLimitExceeded {
        /// Configured limit
        limit: usize,
    },

    /// Type id not registered in the context
    #[error("Unknown type: {0}")]
    UnknownType(TypeId),

    /// Object access failed
    #[error(transparent)]
    Object(#[from] ObjectError),
}

/// Copy result
pub type CopyResult<T> = Result<T, CopyError>;
