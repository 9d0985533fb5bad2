//! Type registration errors

use thiserror::Error;

use crate::ty::TypeId;

/// Errors that can occur while registering types
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeError {
    /// A type with the same name is already registered
    #[error("Duplicate type: {name}")]
    DuplicateType {
        /// Type name
        name: String,
    },

    /// Type id does not belong to this context
    #[error("Unknown type: {0}")]
    UnknownType(TypeId),

    /// Field name declared twice at one level of a class
    #[error("Duplicate field {field} in {type_name}")]
    DuplicateField {
        /// Declaring type
        type_name: String,
        /// Field name
        field: String,
    },

    /// Fields can only be added to classes
    #[error("{type_name} is not a class")]
    NotAClass {
        /// Offending type
        type_name: String,
    },

    /// A class parent must itself be a class
    #[error("Invalid parent for {type_name}: {parent} is not a class")]
    InvalidParent {
        /// Class being defined
        type_name: String,
        /// Proposed parent
        parent: String,
    },
}
