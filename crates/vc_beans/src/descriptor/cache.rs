use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use core::any::TypeId;

use log::debug;
use vc_utils::sync::ConcurrentCache;

use crate::BeanError;
use crate::descriptor::lookup::find_method;
use crate::descriptor::property::introspect;
use crate::descriptor::{ClassDescriptors, MappedPropertyDescriptor};
use crate::info::{BeanClass, Method};
use crate::value::ValueType;

// -----------------------------------------------------------------------------
// MethodKey

/// Identity of a method lookup.
///
/// `signature` holds the leading parameter types requested, `None` when
/// only the arity was requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub class: TypeId,
    pub name: String,
    pub arity: usize,
    pub signature: Option<Box<[ValueType]>>,
}

// -----------------------------------------------------------------------------
// DescriptorCache

/// Memoized introspection results.
///
/// Holds three tables, all keyed by class identity: the property
/// descriptors of a class, the mapped descriptor of a `(class, property)`
/// pair (including negative results), and individual method lookups.
///
/// The cache is shared between threads behind an [`Arc`]. Concurrent
/// misses may introspect the same class twice; both results are equal
/// and the last one published is kept. Errors are never cached.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    classes: ConcurrentCache<TypeId, ClassDescriptors>,
    mapped: ConcurrentCache<(TypeId, String), Option<MappedPropertyDescriptor>>,
    methods: ConcurrentCache<MethodKey, Option<Method>>,
}

impl DescriptorCache {
    #[inline]
    pub const fn new() -> Self {
        Self {
            classes: ConcurrentCache::new(),
            mapped: ConcurrentCache::new(),
            methods: ConcurrentCache::new(),
        }
    }

    /// The property descriptors of `class`.
    pub fn class_descriptors(&self, class: &'static BeanClass) -> Arc<ClassDescriptors> {
        self.classes.get_or_compute(class.type_id(), || {
            debug!("descriptor cache miss for `{}`", class.name());
            introspect(class)
        })
    }

    /// The mapped descriptor of `property` on `class`, if it has keyed accessors.
    pub fn mapped_descriptor(
        &self,
        class: &'static BeanClass,
        property: &str,
    ) -> Result<Option<MappedPropertyDescriptor>, BeanError> {
        let key = (class.type_id(), property.to_owned());
        let found = self.mapped.get_or_try_compute(key, || {
            debug!("mapped descriptor cache miss for `{}.{property}`", class.name());
            MappedPropertyDescriptor::discover(class, property, self)
        })?;
        Ok((*found).clone())
    }

    /// An accessible method of `class` named `name` with `arity` parameters
    /// whose leading parameter types are `signature`, when given.
    pub fn method(
        &self,
        class: &'static BeanClass,
        name: &str,
        arity: usize,
        signature: Option<&[ValueType]>,
    ) -> Option<Method> {
        let key = MethodKey {
            class: class.type_id(),
            name: name.to_owned(),
            arity,
            signature: signature.map(Box::from),
        };
        let found = self.methods.get_or_compute(key, || {
            find_method(class, name, &|method: &Method| {
                method.arity() == arity && signature.is_none_or(|s| method.params().starts_with(s))
            })
        });
        (*found).clone()
    }

    /// Number of classes with cached property descriptors.
    #[inline]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Drops every cached result.
    pub fn clear(&self) {
        debug!("clearing descriptor caches");
        self.classes.clear();
        self.mapped.clear();
        self.methods.clear();
    }
}
