//! Copy executor
//!
//! [`Copier`] is the entry point: it owns the type context, the descriptor
//! and plan caches, and runs shallow copies, deep copies, conversions and
//! deep clones through the [`CopyEngine`] interface.
//!
//! A `Copier` is `Send + Sync`. Share one (by reference or `Arc`) to share
//! its caches; every cache entry is a pure function of the type context, so
//! concurrent first-time lookups converge on a single installed value.

use std::sync::Arc;

use replica_types::{TypeContext, TypeId, ValueShape};
use tracing::trace;

use crate::deep::DeepCopier;
use crate::factory;
use crate::introspect::{DescriptorCache, TypeDescriptors};
use crate::object::ObjRef;
use crate::options::CopyOptions;
use crate::plan::{self, CopyPlan, PlanCache};
use crate::value::Value;
use crate::{CopyError, CopyResult};

/// Copier configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopierConfig {
    /// Deepest object nesting a deep copy may reach (`None` = unlimited)
    pub max_depth: Option<usize>,
}

impl CopierConfig {
    /// Bound deep-copy nesting
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

/// Field-by-name copying between objects
///
/// Absent (`Null`) or scalar sources and destinations make a copy vacuous;
/// they are never errors.
pub trait CopyEngine {
    /// Shallow copy every matching field
    fn copy(&self, source: &Value, dest: &Value) -> CopyResult<()> {
        self.copy_with(source, dest, &CopyOptions::SHALLOW)
    }

    /// Deep copy every matching field
    fn deep_copy(&self, source: &Value, dest: &Value) -> CopyResult<()> {
        self.copy_with(source, dest, &CopyOptions::DEEP)
    }

    /// Copy matching fields as directed by `options`
    fn copy_with(&self, source: &Value, dest: &Value, options: &CopyOptions) -> CopyResult<()>;

    /// Create a `dest_type` instance and shallow copy `source` into it
    fn convert(&self, source: &Value, dest_type: TypeId) -> CopyResult<Value> {
        self.convert_with(source, dest_type, &CopyOptions::SHALLOW)
    }

    /// Create a `dest_type` instance and copy `source` into it
    fn convert_with(&self, source: &Value, dest_type: TypeId, options: &CopyOptions) -> CopyResult<Value>;

    /// Convert every source, preserving order
    fn converts<'v, I>(&self, sources: I, dest_type: TypeId) -> CopyResult<Vec<Value>>
    where
        I: IntoIterator<Item = &'v Value>,
        Self: Sized,
    {
        let sources = sources.into_iter();
        let mut converted = Vec::with_capacity(sources.size_hint().0);
        for source in sources {
            converted.push(self.convert(source, dest_type)?);
        }
        Ok(converted)
    }

    /// Produce a fully independent copy of a value's object graph
    fn deep_clone(&self, source: &Value) -> CopyResult<Value>;
}

/// The copy engine
#[derive(Debug)]
pub struct Copier {
    types: Arc<TypeContext>,
    config: CopierConfig,
    descriptors: DescriptorCache,
    plans: PlanCache,
}

impl Copier {
    /// Create a copier with the default configuration
    pub fn new(types: Arc<TypeContext>) -> Self {
        Self::with_config(types, CopierConfig::default())
    }

    /// Create a copier with a custom configuration
    pub fn with_config(types: Arc<TypeContext>, config: CopierConfig) -> Self {
        Self {
            types,
            config,
            descriptors: DescriptorCache::new(),
            plans: PlanCache::new(),
        }
    }

    /// The type context
    pub fn types(&self) -> &TypeContext {
        &self.types
    }

    /// The configuration
    pub fn config(&self) -> &CopierConfig {
        &self.config
    }

    /// Introspected fields of a type (cached)
    pub fn describe(&self, ty: TypeId) -> CopyResult<Arc<TypeDescriptors>> {
        self.descriptors.get_or_introspect(&self.types, ty)
    }

    /// Copy plan for an ordered pair of types (cached)
    pub fn resolve(&self, source: TypeId, dest: TypeId) -> CopyResult<Arc<CopyPlan>> {
        if let Some(plan) = self.plans.get(source, dest) {
            return Ok(plan);
        }
        let source_desc = self.describe(source)?;
        let dest_desc = self.describe(dest)?;
        let resolved = plan::resolve(&self.types, &source_desc, &dest_desc);
        Ok(self.plans.install(resolved))
    }

    /// Allocate a blank instance
    pub fn allocate(&self, ty: TypeId) -> CopyResult<ObjRef> {
        factory::allocate(&self.types, ty)
    }

    /// Build a record from positional components
    pub fn new_record(&self, ty: TypeId, components: Vec<Value>) -> CopyResult<ObjRef> {
        factory::construct_record(&self.types, ty, components)
    }

    /// Build an array of a registered array type
    pub fn new_array(&self, array_type: TypeId, elements: Vec<Value>) -> CopyResult<ObjRef> {
        factory::new_array(&self.types, array_type, elements)
    }

    /// Build a collection of a concrete collection type
    pub fn new_collection(&self, ty: TypeId, elements: Vec<Value>) -> CopyResult<ObjRef> {
        factory::new_collection(&self.types, ty, elements)
    }

    /// Build a map of a concrete map type
    pub fn new_map(&self, ty: TypeId, entries: Vec<(Value, Value)>) -> CopyResult<ObjRef> {
        factory::new_map(&self.types, ty, entries)
    }

    /// Read a field by name
    pub fn get(&self, obj: &ObjRef, name: &str) -> CopyResult<Value> {
        let descriptors = self.describe(obj.type_id())?;
        match descriptors.find(name) {
            Some(field) => field.get(obj),
            None => Err(no_such_field(&descriptors, name)),
        }
    }

    /// Write a field by name
    pub fn set(&self, obj: &ObjRef, name: &str, value: impl Into<Value>) -> CopyResult<()> {
        let descriptors = self.describe(obj.type_id())?;
        match descriptors.find(name) {
            Some(field) => field.set(obj, value.into()),
            None => Err(no_such_field(&descriptors, name)),
        }
    }

    /// Number of types with cached descriptors
    pub fn cached_descriptor_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Number of cached copy plans
    pub fn cached_plan_count(&self) -> usize {
        self.plans.len()
    }

    fn deep_copier(&self) -> DeepCopier<'_> {
        DeepCopier::new(&self.types, &self.descriptors, self.config.max_depth)
    }

    fn copy_fields(&self, src: &ObjRef, dst: &ObjRef, options: &CopyOptions) -> CopyResult<()> {
        let plan = self.resolve(src.type_id(), dst.type_id())?;

        if options.is_simple() {
            for binding in plan.bindings() {
                let value = binding.source.get(src)?;
                binding.dest.set(dst, value)?;
            }
            return Ok(());
        }

        let mut deep = options.is_deep().then(|| {
            let mut copier = self.deep_copier();
            copier.seed(src, dst.clone());
            copier
        });
        for binding in plan.bindings() {
            if !options.should_copy(binding.name()) {
                continue;
            }
            let value = binding.source.get(src)?;
            if value.is_null() {
                if !options.ignores_nulls() {
                    binding.dest.set(dst, Value::Null)?;
                }
                continue;
            }
            let value = match deep.as_mut() {
                Some(copier) => copier.copy_value(&value)?,
                None => value,
            };
            binding.dest.set(dst, value)?;
        }
        Ok(())
    }

    fn convert_into_record(&self, source: &Value, record_ty: TypeId, options: &CopyOptions) -> CopyResult<Value> {
        let components = self.describe(record_ty)?;
        let source = match source.as_object() {
            Some(obj) => Some((obj, self.describe(obj.type_id())?)),
            None => None,
        };
        let mut deep = options.is_deep().then(|| self.deep_copier());

        let mut args = Vec::with_capacity(components.len());
        for component in components.fields() {
            let matched = source.as_ref().and_then(|(obj, fields)| {
                fields
                    .find(component.name())
                    .filter(|field| options.should_copy(field.name()))
                    .filter(|field| self.types.is_compatible(field.declared_type(), component.declared_type()))
                    .map(|field| (*obj, field))
            });
            let value = match matched {
                Some((obj, field)) => field.get(obj)?,
                None => Value::Null,
            };
            let value = match (&mut deep, value) {
                (_, Value::Null) => factory::default_value(&self.types, component.declared_type()),
                (Some(copier), value) => copier.copy_value(&value)?,
                (None, value) => value,
            };
            args.push(value);
        }
        trace!(record = components.type_name(), "converting into record");
        Ok(Value::Ref(factory::construct_record(&self.types, record_ty, args)?))
    }
}

fn no_such_field(descriptors: &TypeDescriptors, name: &str) -> CopyError {
    CopyError::FieldAccess {
        type_name: descriptors.type_name().to_string(),
        field: name.to_string(),
        reason: "no such field".to_string(),
    }
}

impl CopyEngine for Copier {
    fn copy_with(&self, source: &Value, dest: &Value, options: &CopyOptions) -> CopyResult<()> {
        match (source.as_object(), dest.as_object()) {
            (Some(src), Some(dst)) => self.copy_fields(src, dst, options),
            _ => Ok(()),
        }
    }

    fn convert_with(&self, source: &Value, dest_type: TypeId, options: &CopyOptions) -> CopyResult<Value> {
        if source.is_null() {
            return Ok(Value::Null);
        }
        if self.types.shape(dest_type) == Some(ValueShape::Record) {
            return self.convert_into_record(source, dest_type, options);
        }
        let dest = Value::Ref(self.allocate(dest_type)?);
        self.copy_with(source, &dest, options)?;
        Ok(dest)
    }

    fn deep_clone(&self, source: &Value) -> CopyResult<Value> {
        self.deep_copier().copy_value(source)
    }
}
