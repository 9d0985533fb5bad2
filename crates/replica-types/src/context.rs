//! Type context: the registry of every type known to a copier
//!
//! A fresh context is pre-populated with a prelude (the universal root,
//! primitives and their boxed wrappers, immutable scalars, and the standard
//! container types) whose ids are the associated constants on [`TypeId`].
//! Application types are added through the `define_*` methods and the
//! context is then frozen behind an `Arc` and shared.

use rustc_hash::FxHashMap;

use crate::error::TypeError;
use crate::shape::ValueShape;
use crate::ty::{
    ArrayType, ClassType, CollectionFlavor, CollectionType, EnumType, FieldDecl, InterfaceType,
    MapFlavor, MapType, PrimitiveType, RecordType, ScalarType, Type, TypeId,
};

/// Result type for type registration
pub type TypeResult<T> = Result<T, TypeError>;

/// A registered type with its precomputed shape
#[derive(Debug, Clone)]
struct TypeEntry {
    ty: Type,
    shape: ValueShape,
}

/// A field slot in an instance layout
#[derive(Debug, Clone, Copy)]
pub struct FieldSlot<'a> {
    /// Index into the instance slot vector
    pub slot: usize,
    /// Class that declares the field
    pub declaring: TypeId,
    /// The declaration
    pub decl: &'a FieldDecl,
}

/// Registry of types
#[derive(Debug, Clone)]
pub struct TypeContext {
    entries: Vec<TypeEntry>,
    by_name: FxHashMap<String, TypeId>,
    arrays: FxHashMap<TypeId, TypeId>,
}

impl TypeContext {
    /// Create a context containing only the prelude
    pub fn new() -> Self {
        let mut ctx = TypeContext {
            entries: Vec::with_capacity(64),
            by_name: FxHashMap::default(),
            arrays: FxHashMap::default(),
        };
        ctx.install_prelude();
        ctx
    }

    fn install_prelude(&mut self) {
        self.push(Type::Any);
        for p in PrimitiveType::ALL {
            self.push(Type::Primitive(p));
        }
        for p in PrimitiveType::ALL {
            self.push(Type::Boxed(p));
        }
        for s in [
            ScalarType::String,
            ScalarType::BigInt,
            ScalarType::Instant,
            ScalarType::Duration,
            ScalarType::TypeDescriptor,
        ] {
            self.push(Type::Scalar(s));
        }

        self.push(interface("Collection", vec![]));
        self.push(interface("List", vec![TypeId::COLLECTION]));
        self.push(interface("Deque", vec![TypeId::COLLECTION]));
        self.push(interface("Set", vec![TypeId::COLLECTION]));
        self.push(interface("SortedSet", vec![TypeId::SET]));
        self.push(interface("Map", vec![]));
        self.push(interface("SortedMap", vec![TypeId::MAP]));

        self.push(CollectionDef::new("ArrayList", CollectionFlavor::List).extends(TypeId::LIST).into_type());
        self.push(CollectionDef::new("ArrayDeque", CollectionFlavor::Deque).extends(TypeId::DEQUE).into_type());
        self.push(CollectionDef::new("HashSet", CollectionFlavor::Set).extends(TypeId::SET).into_type());
        self.push(CollectionDef::new("LinkedHashSet", CollectionFlavor::Set).extends(TypeId::HASH_SET).into_type());
        self.push(CollectionDef::new("TreeSet", CollectionFlavor::SortedSet).extends(TypeId::SORTED_SET).into_type());
        self.push(MapDef::new("HashMap", MapFlavor::Hash).extends(TypeId::MAP).into_type());
        self.push(MapDef::new("LinkedHashMap", MapFlavor::Linked).extends(TypeId::HASH_MAP).into_type());
        self.push(MapDef::new("TreeMap", MapFlavor::Sorted).extends(TypeId::SORTED_MAP).into_type());

        self.push(
            CollectionDef::new("ImmutableList", CollectionFlavor::List)
                .extends(TypeId::LIST)
                .immutable()
                .into_type(),
        );
        self.push(
            CollectionDef::new("ImmutableSet", CollectionFlavor::Set)
                .extends(TypeId::SET)
                .immutable()
                .into_type(),
        );
        self.push(
            MapDef::new("ImmutableMap", MapFlavor::Linked)
                .extends(TypeId::MAP)
                .immutable()
                .into_type(),
        );

        debug_assert_eq!(self.entries.len(), TypeId::IMMUTABLE_MAP.index() + 1);
    }

    fn push(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.entries.len() as u32);
        let name = match &ty {
            Type::Array(a) => format!("{}[]", self.name_of(a.element)),
            other => other.name(),
        };
        let shape = ValueShape::of(&ty);
        self.entries.push(TypeEntry { ty, shape });
        self.by_name.insert(name, id);
        id
    }

    fn check_name(&self, name: &str) -> TypeResult<()> {
        if self.by_name.contains_key(name) {
            return Err(TypeError::DuplicateType {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn check_id(&self, id: TypeId) -> TypeResult<()> {
        if id.index() < self.entries.len() {
            Ok(())
        } else {
            Err(TypeError::UnknownType(id))
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a class with all of its fields
    pub fn define_class(&mut self, def: ClassDef) -> TypeResult<TypeId> {
        self.check_name(&def.name)?;
        if let Some(parent) = def.parent {
            self.check_parent(&def.name, parent)?;
        }
        for &iface in &def.implements {
            self.check_id(iface)?;
        }
        let mut class = ClassType {
            name: def.name,
            parent: def.parent,
            implements: def.implements,
            fields: Vec::with_capacity(def.fields.len()),
            is_abstract: def.is_abstract,
            value_like: def.value_like,
        };
        for field in def.fields {
            push_field(&mut class, field, |id| self.check_id(id))?;
        }
        Ok(self.push(Type::Class(class)))
    }

    /// Register an empty class to be filled with [`add_field`](Self::add_field)
    ///
    /// Needed for self-referential classes, whose fields mention their own id.
    pub fn declare_class(&mut self, name: &str, parent: Option<TypeId>) -> TypeResult<TypeId> {
        let mut def = ClassDef::new(name);
        def.parent = parent;
        self.define_class(def)
    }

    /// Add a field to a class declared earlier
    pub fn add_field(&mut self, class: TypeId, field: FieldDecl) -> TypeResult<()> {
        self.check_id(class)?;
        self.check_id(field.ty)?;
        let entry = &mut self.entries[class.index()];
        match &mut entry.ty {
            Type::Class(c) => push_field(c, field, |_| Ok(())),
            other => Err(TypeError::NotAClass {
                type_name: other.name(),
            }),
        }
    }

    /// Register a record type
    pub fn define_record(&mut self, def: RecordDef) -> TypeResult<TypeId> {
        self.check_name(&def.name)?;
        let mut seen = FxHashMap::default();
        for component in &def.components {
            self.check_id(component.ty)?;
            if seen.insert(component.name.as_str(), ()).is_some() {
                return Err(TypeError::DuplicateField {
                    type_name: def.name.clone(),
                    field: component.name.clone(),
                });
            }
        }
        Ok(self.push(Type::Record(RecordType {
            name: def.name,
            components: def.components,
            constructible: def.constructible,
        })))
    }

    /// Register an enumeration
    pub fn define_enum<I, S>(&mut self, name: &str, variants: I) -> TypeResult<TypeId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check_name(name)?;
        Ok(self.push(Type::Enum(EnumType {
            name: name.to_string(),
            variants: variants.into_iter().map(Into::into).collect(),
        })))
    }

    /// Register an interface
    pub fn define_interface(&mut self, name: &str, extends: Vec<TypeId>) -> TypeResult<TypeId> {
        self.check_name(name)?;
        for &id in &extends {
            self.check_id(id)?;
        }
        Ok(self.push(interface(name, extends)))
    }

    /// Register a collection type
    pub fn define_collection(&mut self, def: CollectionDef) -> TypeResult<TypeId> {
        self.check_name(&def.name)?;
        for &id in &def.supertypes {
            self.check_id(id)?;
        }
        Ok(self.push(def.into_type()))
    }

    /// Register a map type
    pub fn define_map(&mut self, def: MapDef) -> TypeResult<TypeId> {
        self.check_name(&def.name)?;
        for &id in &def.supertypes {
            self.check_id(id)?;
        }
        Ok(self.push(def.into_type()))
    }

    /// Get (or create) the array type for an element type
    pub fn array_of(&mut self, element: TypeId) -> TypeResult<TypeId> {
        self.check_id(element)?;
        if let Some(&id) = self.arrays.get(&element) {
            return Ok(id);
        }
        let id = self.push(Type::Array(ArrayType { element }));
        self.arrays.insert(element, id);
        Ok(id)
    }

    fn check_parent(&self, name: &str, parent: TypeId) -> TypeResult<()> {
        self.check_id(parent)?;
        match &self.entries[parent.index()].ty {
            Type::Class(_) => Ok(()),
            other => Err(TypeError::InvalidParent {
                type_name: name.to_string(),
                parent: other.name(),
            }),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Get a type by id
    pub fn get(&self, id: TypeId) -> Option<&Type> {
        self.entries.get(id.index()).map(|e| &e.ty)
    }

    /// Look up a type by name
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Display name of a type
    pub fn name_of(&self, id: TypeId) -> String {
        match self.get(id) {
            Some(Type::Array(a)) => format!("{}[]", self.name_of(a.element)),
            Some(ty) => ty.name(),
            None => id.to_string(),
        }
    }

    /// Precomputed shape of a type
    pub fn shape(&self, id: TypeId) -> Option<ValueShape> {
        self.entries.get(id.index()).map(|e| e.shape)
    }

    /// Element type of an array type
    pub fn array_element(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id)? {
            Type::Array(a) => Some(a.element),
            _ => None,
        }
    }

    /// Whether the type is a raw primitive
    pub fn is_primitive(&self, id: TypeId) -> bool {
        self.get(id).is_some_and(Type::is_primitive)
    }

    /// The primitive a raw or boxed type wraps
    pub fn primitive_of(&self, id: TypeId) -> Option<PrimitiveType> {
        match self.get(id)? {
            Type::Primitive(p) | Type::Boxed(p) => Some(*p),
            _ => None,
        }
    }

    /// Class chain from `id` up to (excluding) the universal root
    ///
    /// Most-derived first. Empty for non-class types.
    pub fn class_chain(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            match self.get(cur) {
                Some(Type::Class(c)) => {
                    chain.push(cur);
                    current = c.parent;
                }
                _ => break,
            }
        }
        chain
    }

    /// Number of instance slots of a class, inherited fields included
    pub fn slot_count(&self, id: TypeId) -> usize {
        self.class_chain(id)
            .iter()
            .filter_map(|&c| self.get(c).and_then(Type::as_class))
            .map(|c| c.fields.iter().filter(|f| !f.modifiers.is_static).count())
            .sum()
    }

    /// Instance field slots of a class
    ///
    /// Slots are laid out root-most level first, so a class shares its
    /// parent's slot indices. The returned list is ordered most-derived
    /// level first, each level in declaration order. Static fields have no
    /// slot and are omitted.
    pub fn field_slots(&self, id: TypeId) -> Vec<FieldSlot<'_>> {
        let chain = self.class_chain(id);
        let mut bases = vec![0usize; chain.len()];
        let mut next = 0usize;
        for (level, &class_id) in chain.iter().enumerate().rev() {
            bases[level] = next;
            if let Some(class) = self.get(class_id).and_then(Type::as_class) {
                next += class.fields.iter().filter(|f| !f.modifiers.is_static).count();
            }
        }

        let mut slots = Vec::with_capacity(next);
        for (level, &class_id) in chain.iter().enumerate() {
            let Some(class) = self.get(class_id).and_then(Type::as_class) else {
                continue;
            };
            let mut slot = bases[level];
            for decl in class.fields.iter().filter(|f| !f.modifiers.is_static) {
                slots.push(FieldSlot {
                    slot,
                    declaring: class_id,
                    decl,
                });
                slot += 1;
            }
        }
        slots
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false once the prelude is installed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TypeContext {
    fn default() -> Self {
        Self::new()
    }
}

fn interface(name: &str, extends: Vec<TypeId>) -> Type {
    Type::Interface(InterfaceType {
        name: name.to_string(),
        extends,
    })
}

fn push_field(
    class: &mut ClassType,
    field: FieldDecl,
    check: impl Fn(TypeId) -> TypeResult<()>,
) -> TypeResult<()> {
    check(field.ty)?;
    if class.fields.iter().any(|f| f.name == field.name) {
        return Err(TypeError::DuplicateField {
            type_name: class.name.clone(),
            field: field.name,
        });
    }
    class.fields.push(field);
    Ok(())
}

// ============================================================================
// Definition builders
// ============================================================================

/// Builder for a class definition
#[derive(Debug, Clone)]
pub struct ClassDef {
    name: String,
    parent: Option<TypeId>,
    implements: Vec<TypeId>,
    fields: Vec<FieldDecl>,
    is_abstract: bool,
    value_like: bool,
}

impl ClassDef {
    /// Start a class definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            implements: Vec::new(),
            fields: Vec::new(),
            is_abstract: false,
            value_like: false,
        }
    }

    /// Set the parent class
    pub fn extends(mut self, parent: TypeId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Add an implemented interface
    pub fn implements(mut self, iface: TypeId) -> Self {
        self.implements.push(iface);
        self
    }

    /// Add an instance field
    pub fn field(self, name: impl Into<String>, ty: TypeId) -> Self {
        self.with_field(FieldDecl::new(name, ty))
    }

    /// Add a field declaration with modifiers
    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    /// Mark the class abstract
    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Mark instances immutable by contract
    pub fn value_like(mut self) -> Self {
        self.value_like = true;
        self
    }
}

/// Builder for a record definition
#[derive(Debug, Clone)]
pub struct RecordDef {
    name: String,
    components: Vec<FieldDecl>,
    constructible: bool,
}

impl RecordDef {
    /// Start a record definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
            constructible: true,
        }
    }

    /// Add a positional component
    pub fn component(mut self, name: impl Into<String>, ty: TypeId) -> Self {
        self.components.push(FieldDecl::new(name, ty));
        self
    }

    /// Hide the canonical constructor
    pub fn inaccessible(mut self) -> Self {
        self.constructible = false;
        self
    }
}

/// Builder for a collection type
#[derive(Debug, Clone)]
pub struct CollectionDef {
    name: String,
    flavor: CollectionFlavor,
    supertypes: Vec<TypeId>,
    immutable: bool,
    constructible: bool,
}

impl CollectionDef {
    /// Start a collection definition
    pub fn new(name: impl Into<String>, flavor: CollectionFlavor) -> Self {
        Self {
            name: name.into(),
            flavor,
            supertypes: Vec::new(),
            immutable: false,
            constructible: true,
        }
    }

    /// Add a supertype
    pub fn extends(mut self, supertype: TypeId) -> Self {
        self.supertypes.push(supertype);
        self
    }

    /// Contents are fixed at construction; also not freshly instantiable
    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self.constructible = false;
        self
    }

    /// No way to create a fresh empty instance
    pub fn not_constructible(mut self) -> Self {
        self.constructible = false;
        self
    }

    fn into_type(self) -> Type {
        Type::Collection(CollectionType {
            name: self.name,
            flavor: self.flavor,
            supertypes: self.supertypes,
            immutable: self.immutable,
            constructible: self.constructible,
        })
    }
}

/// Builder for a map type
#[derive(Debug, Clone)]
pub struct MapDef {
    name: String,
    flavor: MapFlavor,
    supertypes: Vec<TypeId>,
    immutable: bool,
    constructible: bool,
}

impl MapDef {
    /// Start a map definition
    pub fn new(name: impl Into<String>, flavor: MapFlavor) -> Self {
        Self {
            name: name.into(),
            flavor,
            supertypes: Vec::new(),
            immutable: false,
            constructible: true,
        }
    }

    /// Add a supertype
    pub fn extends(mut self, supertype: TypeId) -> Self {
        self.supertypes.push(supertype);
        self
    }

    /// Contents are fixed at construction; also not freshly instantiable
    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self.constructible = false;
        self
    }

    /// No way to create a fresh empty instance
    pub fn not_constructible(mut self) -> Self {
        self.constructible = false;
        self
    }

    fn into_type(self) -> Type {
        Type::Map(MapType {
            name: self.name,
            flavor: self.flavor,
            supertypes: self.supertypes,
            immutable: self.immutable,
            constructible: self.constructible,
        })
    }
}
