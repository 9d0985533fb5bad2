//! Type compatibility rules
//!
//! Decides whether a value declared as one type may be stored in a field
//! declared as another. Two rules apply:
//!
//! - widening: the destination is the source itself or one of its supertypes
//! - boxing: raw and boxed forms of the same primitive are interchangeable
//!
//! Widths never convert: an `i32` field does not accept an `i64`.

use crate::context::TypeContext;
use crate::ty::{Type, TypeId};

/// Context for checking compatibility between declared types
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityContext<'a> {
    type_ctx: &'a TypeContext,
}

impl<'a> CompatibilityContext<'a> {
    /// Create a new compatibility context
    pub fn new(type_ctx: &'a TypeContext) -> Self {
        CompatibilityContext { type_ctx }
    }

    /// Check if a `source` value may be written into a `dest` slot
    pub fn is_compatible(&self, source: TypeId, dest: TypeId) -> bool {
        if self.is_subtype(source, dest) {
            return true;
        }
        self.boxed(source) == self.boxed(dest)
    }

    /// Normalize raw primitives to their boxed wrapper
    fn boxed(&self, id: TypeId) -> TypeId {
        match self.type_ctx.get(id) {
            Some(Type::Primitive(p)) => p.boxed_id(),
            _ => id,
        }
    }

    /// Check if `sub` is a subtype of `sup` (sub <: sup)
    pub fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        // Reflexivity: T <: T
        if sub == sup {
            return true;
        }

        let Some(sub_ty) = self.type_ctx.get(sub) else {
            return false;
        };
        let Some(sup_ty) = self.type_ctx.get(sup) else {
            return false;
        };

        match (sub_ty, sup_ty) {
            // Raw primitives have no supertypes, not even the root
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,

            // Every reference type widens to the root
            (_, Type::Any) => true,

            // Arrays are covariant in reference element types
            (Type::Array(a1), Type::Array(a2)) => {
                !self.type_ctx.is_primitive(a1.element)
                    && !self.type_ctx.is_primitive(a2.element)
                    && self.is_subtype(a1.element, a2.element)
            }

            // Nominal: walk parents and implemented interfaces
            (Type::Class(c), _) => {
                c.parent.is_some_and(|p| self.is_subtype(p, sup))
                    || c.implements.iter().any(|&i| self.is_subtype(i, sup))
            }
            (Type::Collection(c), _) => c.supertypes.iter().any(|&s| self.is_subtype(s, sup)),
            (Type::Map(m), _) => m.supertypes.iter().any(|&s| self.is_subtype(s, sup)),
            (Type::Interface(i), _) => i.extends.iter().any(|&e| self.is_subtype(e, sup)),

            _ => false,
        }
    }
}

impl TypeContext {
    /// Check if a `source` value may be written into a `dest` slot
    pub fn is_compatible(&self, source: TypeId, dest: TypeId) -> bool {
        CompatibilityContext::new(self).is_compatible(source, dest)
    }

    /// Check if `sub` is a subtype of `sup`
    pub fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        CompatibilityContext::new(self).is_subtype(sub, sup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ClassDef, CollectionDef};
    use crate::ty::CollectionFlavor;

    #[test]
    fn test_reflexive() {
        let ctx = TypeContext::new();
        assert!(ctx.is_compatible(TypeId::STRING, TypeId::STRING));
        assert!(ctx.is_compatible(TypeId::I32, TypeId::I32));
    }

    #[test]
    fn test_boxing_both_directions() {
        let ctx = TypeContext::new();
        assert!(ctx.is_compatible(TypeId::I32, TypeId::BOXED_I32));
        assert!(ctx.is_compatible(TypeId::BOXED_I32, TypeId::I32));
        assert!(ctx.is_compatible(TypeId::BOOL, TypeId::BOXED_BOOL));
    }

    #[test]
    fn test_widths_do_not_convert() {
        let ctx = TypeContext::new();
        assert!(!ctx.is_compatible(TypeId::I64, TypeId::I32));
        assert!(!ctx.is_compatible(TypeId::I32, TypeId::I64));
        assert!(!ctx.is_compatible(TypeId::BOXED_I64, TypeId::I32));
        assert!(!ctx.is_compatible(TypeId::F32, TypeId::F64));
    }

    #[test]
    fn test_unrelated_references() {
        let ctx = TypeContext::new();
        assert!(!ctx.is_compatible(TypeId::STRING, TypeId::BIG_INT));
        assert!(!ctx.is_compatible(TypeId::ARRAY_LIST, TypeId::HASH_SET));
    }

    #[test]
    fn test_root_accepts_references_only() {
        let ctx = TypeContext::new();
        assert!(ctx.is_compatible(TypeId::STRING, TypeId::ANY));
        assert!(ctx.is_compatible(TypeId::BOXED_I32, TypeId::ANY));
        assert!(!ctx.is_compatible(TypeId::I32, TypeId::ANY));
        assert!(!ctx.is_compatible(TypeId::ANY, TypeId::STRING));
    }

    #[test]
    fn test_class_hierarchy() {
        let mut ctx = TypeContext::new();
        let animal = ctx.define_class(ClassDef::new("Animal")).unwrap();
        let dog = ctx.define_class(ClassDef::new("Dog").extends(animal)).unwrap();
        let puppy = ctx.define_class(ClassDef::new("Puppy").extends(dog)).unwrap();

        assert!(ctx.is_compatible(puppy, animal));
        assert!(ctx.is_compatible(dog, animal));
        assert!(!ctx.is_compatible(animal, dog));
    }

    #[test]
    fn test_container_interfaces() {
        let mut ctx = TypeContext::new();
        assert!(ctx.is_compatible(TypeId::ARRAY_LIST, TypeId::LIST));
        assert!(ctx.is_compatible(TypeId::ARRAY_LIST, TypeId::COLLECTION));
        assert!(ctx.is_compatible(TypeId::LINKED_HASH_SET, TypeId::HASH_SET));
        assert!(ctx.is_compatible(TypeId::TREE_MAP, TypeId::MAP));
        assert!(!ctx.is_compatible(TypeId::LIST, TypeId::ARRAY_LIST));

        let tags = ctx
            .define_collection(CollectionDef::new("TagList", CollectionFlavor::List).extends(TypeId::ARRAY_LIST))
            .unwrap();
        assert!(ctx.is_compatible(tags, TypeId::LIST));
    }

    #[test]
    fn test_array_covariance() {
        let mut ctx = TypeContext::new();
        let animal = ctx.define_class(ClassDef::new("Animal")).unwrap();
        let dog = ctx.define_class(ClassDef::new("Dog").extends(animal)).unwrap();
        let dogs = ctx.array_of(dog).unwrap();
        let animals = ctx.array_of(animal).unwrap();
        let ints = ctx.array_of(TypeId::I32).unwrap();
        let boxed_ints = ctx.array_of(TypeId::BOXED_I32).unwrap();

        assert!(ctx.is_compatible(dogs, animals));
        assert!(!ctx.is_compatible(animals, dogs));
        assert!(!ctx.is_compatible(ints, boxed_ints));
        assert!(ctx.is_compatible(ints, TypeId::ANY));
    }
}
