use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use log::debug;

use crate::BeanError;
use crate::access::{ParseError, PropertyPath, Segment, SegmentKind};
use crate::access::{INDEXED_END, INDEXED_START, MAPPED_END, MAPPED_START, NESTED};
use crate::descriptor::{ClassDescriptors, DescriptorCache, MappedPropertyDescriptor, PropertyDescriptor};
use crate::info::{BeanClass, BeanRef, Method};
use crate::value::{Value, ValueMap, ValueType};

// -----------------------------------------------------------------------------
// Helpers

#[inline]
fn class_of(bean: &BeanRef) -> &'static BeanClass {
    bean.borrow().bean_class()
}

/// Name of `value` used in error messages.
fn target_name(value: &Value) -> String {
    match value {
        Value::Bean(bean) => class_of(bean).name().into(),
        Value::Dyna(bean) => bean.borrow().dyna_class().name().into(),
        other => other.type_name(),
    }
}

fn not_readable(property: &str, class: &BeanClass) -> BeanError {
    BeanError::NotReadable {
        property: property.into(),
        target: class.name().into(),
    }
}

fn not_writeable(property: &str, class: &BeanClass) -> BeanError {
    BeanError::NotWriteable {
        property: property.into(),
        target: class.name().into(),
    }
}

fn index_arg(property: &str, index: usize) -> Result<Value, BeanError> {
    i32::try_from(index)
        .map(Value::I32)
        .map_err(|_| BeanError::IndexOutOfRange {
            property: property.into(),
            index,
            len: i32::MAX as usize,
        })
}

/// The value stored under `name` in a map-backed bean.
fn stored(bean: &BeanRef, name: &str) -> Option<Value> {
    bean.borrow()
        .map_storage()
        .map(|map| map.get(name).cloned().unwrap_or_default())
}

/// Stores `value` under `name` in a map-backed bean.
///
/// Returns `false` if the bean has no map storage.
fn store(bean: &BeanRef, name: &str, value: Value) -> bool {
    match bean.borrow_mut().map_storage_mut() {
        Some(map) => {
            map.insert(name.into(), value);
            true
        }
        None => false,
    }
}

/// Invokes a setter, checking `value` against its last parameter type.
fn invoke_write(
    method: &Method,
    bean: &BeanRef,
    property: &str,
    leading: Option<Value>,
    value: Value,
) -> Result<(), BeanError> {
    let value = match method.params().last() {
        Some(ty) => ty.coerce(property, value)?,
        None => value,
    };
    let args = match leading {
        Some(first) => vec![first, value],
        None => vec![value],
    };
    method.invoke(bean, &args)?;
    Ok(())
}

fn null_collection(property: &str, full: String) -> BeanError {
    BeanError::NullIntermediate {
        path: property.into(),
        full,
    }
}

fn element_get(collection: Value, property: &str, index: usize) -> Result<Value, BeanError> {
    if collection.is_null() {
        return Err(null_collection(property, format!("{property}[{index}]")));
    }
    collection.index_get(property, index)
}

fn element_set(
    collection: Value,
    property: &str,
    index: usize,
    value: Value,
    element: &ValueType,
) -> Result<(), BeanError> {
    if collection.is_null() {
        return Err(null_collection(property, format!("{property}[{index}]")));
    }
    collection.index_set(property, index, value, element)
}

fn entry_get(map: Value, property: &str, key: &str) -> Result<Value, BeanError> {
    if map.is_null() {
        return Err(null_collection(property, format!("{property}({key})")));
    }
    map.key_get(property, key)
}

fn entry_set(map: Value, property: &str, key: &str, value: Value) -> Result<(), BeanError> {
    if map.is_null() {
        return Err(null_collection(property, format!("{property}({key})")));
    }
    map.key_set(property, key, value)
}

fn check_simple_name(name: &str) -> Result<(), BeanError> {
    match name.find([NESTED, INDEXED_START, INDEXED_END, MAPPED_START, MAPPED_END]) {
        Some(offset) => Err(BeanError::InvalidPath(ParseError {
            offset,
            path: name.into(),
            error: "expected a simple property name".into(),
        })),
        None => Ok(()),
    }
}

// -----------------------------------------------------------------------------
// PropertyUtils

/// Reads and writes properties by path.
///
/// Targets are [`Value`]s:
///
/// - [`Value::Dyna`]: dispatched to the container's own accessors.
/// - [`Value::Map`]: direct keyed lookup.
/// - [`Value::Bean`]: accessors discovered from the bean's class, through
///   the shared [`DescriptorCache`]. Map-backed beans fall back to their
///   storage for names their class does not declare.
///
/// Cloning a `PropertyUtils` shares its cache.
#[derive(Debug, Clone, Default)]
pub struct PropertyUtils {
    cache: Arc<DescriptorCache>,
}

impl PropertyUtils {
    /// Creates a resolver with a private descriptor cache.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver using `cache`, possibly shared with other resolvers.
    #[inline]
    pub fn with_cache(cache: Arc<DescriptorCache>) -> Self {
        Self { cache }
    }

    #[inline]
    pub fn cache(&self) -> &Arc<DescriptorCache> {
        &self.cache
    }

    /// Drops every cached descriptor.
    #[inline]
    pub fn clear_descriptors(&self) {
        self.cache.clear();
    }

    // -------------------------------------------------------------------------
    // Descriptors

    #[inline]
    pub fn class_descriptors(&self, class: &'static BeanClass) -> Arc<ClassDescriptors> {
        self.cache.class_descriptors(class)
    }

    /// The property descriptors of a bean value.
    pub fn property_descriptors(&self, bean: &Value) -> Result<Arc<ClassDescriptors>, BeanError> {
        match bean {
            Value::Null => Err(BeanError::NullTarget),
            Value::Bean(bean) => Ok(self.class_descriptors(class_of(bean))),
            other => Err(BeanError::UnsupportedOperation {
                operation: "property_descriptors".into(),
                target: target_name(other),
            }),
        }
    }

    /// The descriptor of the property addressed by the last segment of `path`.
    ///
    /// Returns `None` when that property's owner is not a bean, or the bean
    /// has no such property.
    pub fn property_descriptor(
        &self,
        bean: &Value,
        path: &str,
    ) -> Result<Option<PropertyDescriptor>, BeanError> {
        let (parent, segment) = self.resolve_parent(bean, path)?;
        match &parent {
            Value::Bean(bean) => Ok(self
                .class_descriptors(class_of(bean))
                .get(&segment.name)
                .cloned()),
            _ => Ok(None),
        }
    }

    /// The keyed accessors of property `name` of a bean value.
    pub fn mapped_property_descriptor(
        &self,
        bean: &Value,
        name: &str,
    ) -> Result<Option<MappedPropertyDescriptor>, BeanError> {
        match bean {
            Value::Null => Err(BeanError::NullTarget),
            Value::Bean(bean) => self.cache.mapped_descriptor(class_of(bean), name),
            _ => Ok(None),
        }
    }

    // -------------------------------------------------------------------------
    // Walk

    /// Resolves the first `len` segments of `path`.
    fn walk(&self, bean: &Value, path: &PropertyPath, len: usize, full: &str) -> Result<Value, BeanError> {
        let mut current = bean.clone();
        for (i, segment) in path.segments()[..len].iter().enumerate() {
            if current.is_null() {
                return Err(BeanError::NullIntermediate {
                    path: path.prefix(i),
                    full: full.into(),
                });
            }
            current = self.get_segment(&current, segment)?;
        }
        Ok(current)
    }

    /// Resolves every segment of `path` but the last.
    ///
    /// Returns the owner of the addressed property and the last segment.
    pub(crate) fn resolve_parent(&self, bean: &Value, path: &str) -> Result<(Value, Segment), BeanError> {
        if bean.is_null() {
            return Err(BeanError::NullTarget);
        }
        let parsed = PropertyPath::parse(path)?;
        let parents = parsed.len() - 1;
        let parent = self.walk(bean, &parsed, parents, path)?;
        if parent.is_null() {
            return Err(BeanError::NullIntermediate {
                path: parsed.prefix(parents),
                full: path.into(),
            });
        }
        Ok((parent, parsed.last().clone()))
    }

    pub(crate) fn get_segment(&self, target: &Value, segment: &Segment) -> Result<Value, BeanError> {
        match &segment.kind {
            SegmentKind::Simple => self.simple_get(target, &segment.name),
            SegmentKind::Indexed(index) => self.indexed_get(target, &segment.name, *index),
            SegmentKind::Mapped(key) => self.mapped_get(target, &segment.name, key),
        }
    }

    pub(crate) fn set_segment(&self, target: &Value, segment: &Segment, value: Value) -> Result<(), BeanError> {
        match &segment.kind {
            SegmentKind::Simple => self.simple_set(target, &segment.name, value),
            SegmentKind::Indexed(index) => self.indexed_set(target, &segment.name, *index, value),
            SegmentKind::Mapped(key) => self.mapped_set(target, &segment.name, key, value),
        }
    }

    // -------------------------------------------------------------------------
    // Get

    /// Reads the property at `path`, see [`get_nested_property`](Self::get_nested_property).
    #[inline]
    pub fn get_property(&self, bean: &Value, path: &str) -> Result<Value, BeanError> {
        self.get_nested_property(bean, path)
    }

    /// Reads the property at `path`, walking every segment.
    ///
    /// A `null` value before the last segment fails with
    /// [`BeanError::NullIntermediate`]; a `null` leaf is returned as is.
    pub fn get_nested_property(&self, bean: &Value, path: &str) -> Result<Value, BeanError> {
        if bean.is_null() {
            return Err(BeanError::NullTarget);
        }
        let parsed = PropertyPath::parse(path)?;
        self.walk(bean, &parsed, parsed.len(), path)
    }

    /// Reads property `name` of `bean`; `name` must not contain delimiters.
    pub fn get_simple_property(&self, bean: &Value, name: &str) -> Result<Value, BeanError> {
        check_simple_name(name)?;
        self.simple_get(bean, name)
    }

    /// Reads an indexed property given as `name[index]`.
    pub fn get_indexed_property(&self, bean: &Value, expr: &str) -> Result<Value, BeanError> {
        let segment = Segment::parse(expr)?;
        match segment.kind {
            SegmentKind::Indexed(index) => self.indexed_get(bean, &segment.name, index),
            _ => Err(BeanError::InvalidPath(ParseError {
                offset: expr.len(),
                path: expr.into(),
                error: "expected an indexed property".into(),
            })),
        }
    }

    /// Reads element `index` of property `name`.
    #[inline]
    pub fn get_indexed_property_at(&self, bean: &Value, name: &str, index: usize) -> Result<Value, BeanError> {
        self.indexed_get(bean, name, index)
    }

    /// Reads a mapped property given as `name(key)`.
    pub fn get_mapped_property(&self, bean: &Value, expr: &str) -> Result<Value, BeanError> {
        let segment = Segment::parse(expr)?;
        match &segment.kind {
            SegmentKind::Mapped(key) => self.mapped_get(bean, &segment.name, key),
            _ => Err(BeanError::InvalidPath(ParseError {
                offset: expr.len(),
                path: expr.into(),
                error: "expected a mapped property".into(),
            })),
        }
    }

    /// Reads the value under `key` of property `name`.
    #[inline]
    pub fn get_mapped_property_key(&self, bean: &Value, name: &str, key: &str) -> Result<Value, BeanError> {
        self.mapped_get(bean, name, key)
    }

    fn simple_get(&self, target: &Value, name: &str) -> Result<Value, BeanError> {
        match target {
            Value::Null => Err(BeanError::NullTarget),
            Value::Dyna(bean) => bean.borrow_mut().get(name),
            Value::Map(map) => Ok(map.borrow().get(name).cloned().unwrap_or_default()),
            Value::Bean(bean) => {
                let class = class_of(bean);
                let descriptors = self.class_descriptors(class);
                let descriptor = descriptors.get(name);
                if let Some(read) = descriptor.and_then(PropertyDescriptor::read_method) {
                    return read.invoke(bean, &[]);
                }
                if let Some(value) = stored(bean, name) {
                    return Ok(value);
                }
                Err(match descriptor {
                    Some(_) => not_readable(name, class),
                    None => BeanError::unknown(name, class.name()),
                })
            }
            other => Err(BeanError::unknown(name, target_name(other))),
        }
    }

    fn indexed_get(&self, target: &Value, name: &str, index: usize) -> Result<Value, BeanError> {
        match target {
            Value::Null => Err(BeanError::NullTarget),
            Value::Dyna(bean) => bean.borrow_mut().get_indexed(name, index),
            _ if name.is_empty() => target.index_get(&target_name(target), index),
            Value::Map(map) => {
                let collection = map.borrow().get(name).cloned().unwrap_or_default();
                element_get(collection, name, index)
            }
            Value::Bean(bean) => {
                let class = class_of(bean);
                let descriptors = self.class_descriptors(class);
                if let Some(descriptor) = descriptors.get(name) {
                    if let Some(read) = descriptor.indexed_read_method() {
                        return read.invoke(bean, &[index_arg(name, index)?]);
                    }
                    if let Some(read) = descriptor.read_method() {
                        return element_get(read.invoke(bean, &[])?, name, index);
                    }
                    return Err(not_readable(name, class));
                }
                if self.cache.mapped_descriptor(class, name)?.is_some() {
                    return Err(BeanError::not_indexed(name));
                }
                match stored(bean, name) {
                    Some(collection) => element_get(collection, name, index),
                    None => Err(BeanError::unknown(name, class.name())),
                }
            }
            other => Err(BeanError::unknown(name, target_name(other))),
        }
    }

    fn mapped_get(&self, target: &Value, name: &str, key: &str) -> Result<Value, BeanError> {
        match target {
            Value::Null => Err(BeanError::NullTarget),
            Value::Dyna(bean) => bean.borrow_mut().get_mapped(name, key),
            _ if name.is_empty() => target.key_get(&target_name(target), key),
            Value::Map(map) => {
                let collection = map.borrow().get(name).cloned().unwrap_or_default();
                entry_get(collection, name, key)
            }
            Value::Bean(bean) => {
                let class = class_of(bean);
                let descriptors = self.class_descriptors(class);
                let descriptor = descriptors.get(name);
                if let Some(read) = descriptor.and_then(PropertyDescriptor::read_method) {
                    return entry_get(read.invoke(bean, &[])?, name, key);
                }
                if let Some(mapped) = self.cache.mapped_descriptor(class, name)? {
                    return match mapped.read_method() {
                        Some(read) => read.invoke(bean, &[Value::from(key)]),
                        None => Err(not_readable(name, class)),
                    };
                }
                if let Some(collection) = stored(bean, name) {
                    return entry_get(collection, name, key);
                }
                Err(match descriptor {
                    Some(_) => not_readable(name, class),
                    None => BeanError::unknown(name, class.name()),
                })
            }
            other => Err(BeanError::unknown(name, target_name(other))),
        }
    }

    // -------------------------------------------------------------------------
    // Set

    /// Writes the property at `path`, see [`set_nested_property`](Self::set_nested_property).
    #[inline]
    pub fn set_property(&self, bean: &Value, path: &str, value: Value) -> Result<(), BeanError> {
        self.set_nested_property(bean, path, value)
    }

    /// Resolves every segment of `path` but the last, then writes `value`
    /// through the last one.
    ///
    /// No type conversion happens here beyond lossless widening, see
    /// [`BeanUtils`](crate::utils::BeanUtils) for converting writes.
    pub fn set_nested_property(&self, bean: &Value, path: &str, value: Value) -> Result<(), BeanError> {
        let (parent, segment) = self.resolve_parent(bean, path)?;
        self.set_segment(&parent, &segment, value)
    }

    /// Writes property `name` of `bean`; `name` must not contain delimiters.
    pub fn set_simple_property(&self, bean: &Value, name: &str, value: Value) -> Result<(), BeanError> {
        check_simple_name(name)?;
        self.simple_set(bean, name, value)
    }

    /// Writes an indexed property given as `name[index]`.
    pub fn set_indexed_property(&self, bean: &Value, expr: &str, value: Value) -> Result<(), BeanError> {
        let segment = Segment::parse(expr)?;
        match segment.kind {
            SegmentKind::Indexed(index) => self.indexed_set(bean, &segment.name, index, value),
            _ => Err(BeanError::InvalidPath(ParseError {
                offset: expr.len(),
                path: expr.into(),
                error: "expected an indexed property".into(),
            })),
        }
    }

    /// Writes element `index` of property `name`.
    #[inline]
    pub fn set_indexed_property_at(
        &self,
        bean: &Value,
        name: &str,
        index: usize,
        value: Value,
    ) -> Result<(), BeanError> {
        self.indexed_set(bean, name, index, value)
    }

    /// Writes a mapped property given as `name(key)`.
    pub fn set_mapped_property(&self, bean: &Value, expr: &str, value: Value) -> Result<(), BeanError> {
        let segment = Segment::parse(expr)?;
        match &segment.kind {
            SegmentKind::Mapped(key) => self.mapped_set(bean, &segment.name, key, value),
            _ => Err(BeanError::InvalidPath(ParseError {
                offset: expr.len(),
                path: expr.into(),
                error: "expected a mapped property".into(),
            })),
        }
    }

    /// Writes the value under `key` of property `name`.
    #[inline]
    pub fn set_mapped_property_key(
        &self,
        bean: &Value,
        name: &str,
        key: &str,
        value: Value,
    ) -> Result<(), BeanError> {
        self.mapped_set(bean, name, key, value)
    }

    fn simple_set(&self, target: &Value, name: &str, value: Value) -> Result<(), BeanError> {
        match target {
            Value::Null => Err(BeanError::NullTarget),
            Value::Dyna(bean) => bean.borrow_mut().set(name, value),
            Value::Map(map) => {
                map.borrow_mut().insert(name.into(), value);
                Ok(())
            }
            Value::Bean(bean) => {
                let class = class_of(bean);
                let descriptors = self.class_descriptors(class);
                let descriptor = descriptors.get(name);
                if let Some(write) = descriptor.and_then(PropertyDescriptor::write_method) {
                    return invoke_write(write, bean, name, None, value);
                }
                if store(bean, name, value) {
                    return Ok(());
                }
                Err(match descriptor {
                    Some(_) => not_writeable(name, class),
                    None => BeanError::unknown(name, class.name()),
                })
            }
            other => Err(BeanError::unknown(name, target_name(other))),
        }
    }

    fn indexed_set(&self, target: &Value, name: &str, index: usize, value: Value) -> Result<(), BeanError> {
        match target {
            Value::Null => Err(BeanError::NullTarget),
            Value::Dyna(bean) => bean.borrow_mut().set_indexed(name, index, value),
            _ if name.is_empty() => target.index_set(&target_name(target), index, value, &ValueType::Any),
            Value::Map(map) => {
                let collection = map.borrow().get(name).cloned().unwrap_or_default();
                element_set(collection, name, index, value, &ValueType::Any)
            }
            Value::Bean(bean) => {
                let class = class_of(bean);
                let descriptors = self.class_descriptors(class);
                if let Some(descriptor) = descriptors.get(name) {
                    if let Some(write) = descriptor.indexed_write_method() {
                        return invoke_write(write, bean, name, Some(index_arg(name, index)?), value);
                    }
                    if let Some(read) = descriptor.read_method() {
                        let element = descriptor.element_type().unwrap_or(ValueType::Any);
                        return element_set(read.invoke(bean, &[])?, name, index, value, &element);
                    }
                    return Err(not_writeable(name, class));
                }
                if self.cache.mapped_descriptor(class, name)?.is_some() {
                    return Err(BeanError::not_indexed(name));
                }
                match stored(bean, name) {
                    Some(collection) => element_set(collection, name, index, value, &ValueType::Any),
                    None => Err(BeanError::unknown(name, class.name())),
                }
            }
            other => Err(BeanError::unknown(name, target_name(other))),
        }
    }

    fn mapped_set(&self, target: &Value, name: &str, key: &str, value: Value) -> Result<(), BeanError> {
        match target {
            Value::Null => Err(BeanError::NullTarget),
            Value::Dyna(bean) => bean.borrow_mut().set_mapped(name, key, value),
            _ if name.is_empty() => target.key_set(&target_name(target), key, value),
            Value::Map(map) => {
                let collection = map.borrow().get(name).cloned().unwrap_or_default();
                entry_set(collection, name, key, value)
            }
            Value::Bean(bean) => {
                let class = class_of(bean);
                let descriptors = self.class_descriptors(class);
                let descriptor = descriptors.get(name);
                if let Some(read) = descriptor.and_then(PropertyDescriptor::read_method) {
                    return entry_set(read.invoke(bean, &[])?, name, key, value);
                }
                if let Some(mapped) = self.cache.mapped_descriptor(class, name)? {
                    return match mapped.write_method() {
                        Some(write) => invoke_write(write, bean, name, Some(Value::from(key)), value),
                        None => Err(not_writeable(name, class)),
                    };
                }
                if let Some(collection) = stored(bean, name) {
                    return entry_set(collection, name, key, value);
                }
                Err(match descriptor {
                    Some(_) => not_writeable(name, class),
                    None => BeanError::unknown(name, class.name()),
                })
            }
            other => Err(BeanError::unknown(name, target_name(other))),
        }
    }

    // -------------------------------------------------------------------------
    // Introspection

    /// The declared type of the property at `path`.
    ///
    /// For indexed and mapped segments this is the element type. Returns
    /// `None` if the property is unknown or its type cannot be determined.
    pub fn property_type(&self, bean: &Value, path: &str) -> Result<Option<ValueType>, BeanError> {
        let (parent, segment) = self.resolve_parent(bean, path)?;
        let name = segment.name.as_str();
        let by_value = || {
            self.get_segment(&parent, &segment)
                .ok()
                .filter(|value| !value.is_null())
                .map(|value| value.runtime_type())
        };

        match &parent {
            Value::Dyna(bean) => {
                let bean = bean.borrow();
                Ok(bean.property(name).map(|property| match segment.kind {
                    SegmentKind::Simple => property.ty().clone(),
                    _ => property.element_type(),
                }))
            }
            Value::Map(_) => Ok(by_value()),
            Value::Bean(bean) => {
                let class = class_of(bean);
                let descriptors = self.class_descriptors(class);
                if let Some(descriptor) = descriptors.get(name) {
                    return Ok(match segment.kind {
                        SegmentKind::Simple => descriptor.property_type().cloned(),
                        SegmentKind::Indexed(_) => descriptor.element_type(),
                        SegmentKind::Mapped(_) => Some(ValueType::Any),
                    });
                }
                if let Some(mapped) = self.cache.mapped_descriptor(class, name)? {
                    return Ok(Some(mapped.value_type().clone()));
                }
                Ok(by_value())
            }
            _ => Ok(None),
        }
    }

    /// Returns `true` if the property at `path` can be read.
    ///
    /// Never fails; an unresolvable path is simply not readable.
    pub fn is_readable(&self, bean: &Value, path: &str) -> bool {
        let Ok((parent, segment)) = self.resolve_parent(bean, path) else {
            return false;
        };
        let name = segment.name.as_str();
        match &parent {
            Value::Dyna(bean) => bean.borrow().is_readable(name),
            Value::Map(_) => true,
            Value::Bean(bean) => {
                if parent.is_keyed() {
                    return true;
                }
                let class = class_of(bean);
                match self.class_descriptors(class).get(name) {
                    Some(descriptor) => match segment.kind {
                        SegmentKind::Indexed(_) => descriptor.is_readable(),
                        _ => descriptor.read_method().is_some(),
                    },
                    None => self
                        .cache
                        .mapped_descriptor(class, name)
                        .ok()
                        .flatten()
                        .is_some_and(|mapped| mapped.read_method().is_some()),
                }
            }
            _ => false,
        }
    }

    /// Returns `true` if the property at `path` can be written.
    ///
    /// Never fails; an unresolvable path is simply not writeable.
    pub fn is_writeable(&self, bean: &Value, path: &str) -> bool {
        let Ok((parent, segment)) = self.resolve_parent(bean, path) else {
            return false;
        };
        let name = segment.name.as_str();
        match &parent {
            Value::Dyna(bean) => bean.borrow().is_writeable(name),
            Value::Map(_) => true,
            Value::Bean(bean) => {
                if parent.is_keyed() {
                    return true;
                }
                let class = class_of(bean);
                match self.class_descriptors(class).get(name) {
                    Some(descriptor) => match segment.kind {
                        SegmentKind::Simple => descriptor.write_method().is_some(),
                        SegmentKind::Indexed(_) => descriptor.is_writeable() || descriptor.read_method().is_some(),
                        SegmentKind::Mapped(_) => descriptor.read_method().is_some(),
                    },
                    None => self
                        .cache
                        .mapped_descriptor(class, name)
                        .ok()
                        .flatten()
                        .is_some_and(|mapped| mapped.write_method().is_some()),
                }
            }
            _ => false,
        }
    }

    // -------------------------------------------------------------------------
    // Bulk

    /// Every readable property of `bean` with its current value.
    pub fn describe(&self, bean: &Value) -> Result<ValueMap, BeanError> {
        match bean {
            Value::Null => Err(BeanError::NullTarget),
            Value::Dyna(dyna) => {
                let names = dyna.borrow().property_names();
                let mut out = ValueMap::default();
                for name in names {
                    let value = dyna.borrow_mut().get(&name)?;
                    out.insert(name, value);
                }
                Ok(out)
            }
            Value::Map(map) => Ok(map.borrow().clone()),
            Value::Bean(bean) => {
                let mut out = bean.borrow().map_storage().cloned().unwrap_or_default();
                for descriptor in self.class_descriptors(class_of(bean)).iter() {
                    if let Some(read) = descriptor.read_method() {
                        out.insert(descriptor.name().into(), read.invoke(bean, &[])?);
                    }
                }
                Ok(out)
            }
            other => Err(BeanError::UnsupportedOperation {
                operation: "describe".into(),
                target: target_name(other),
            }),
        }
    }

    /// Copies every readable property of `orig` to the same-named writeable
    /// property of `dest`, without conversion.
    ///
    /// Properties `dest` lacks or cannot write are skipped.
    pub fn copy_properties(&self, dest: &Value, orig: &Value) -> Result<(), BeanError> {
        if dest.is_null() || orig.is_null() {
            return Err(BeanError::NullTarget);
        }
        let mut entries: Vec<(String, Value)> = self.describe(orig)?.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, value) in entries {
            if !self.is_writeable(dest, &name) {
                debug!("skipping `{name}`: not writeable on `{}`", target_name(dest));
                continue;
            }
            match self.simple_set(dest, &name, value) {
                Ok(()) => {}
                Err(err) if err.is_missing_property() => debug!("skipping `{name}`: {err}"),
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::RefCell;

    use super::PropertyUtils;
    use crate::BeanError;
    use crate::dyna::{DynaBean, LazyDynaBean};
    use crate::fixtures::{Agent, Badge, Config, Employee, Ledger, Person, Rack};
    use crate::value::{Primitive, Value, ValueType};

    #[test]
    fn nested_get_and_set() {
        let props = PropertyUtils::new();
        let person = Value::bean(Person::sample("Oslo"));

        assert_eq!(props.get_property(&person, "address.city"), Ok("Oslo".into()));
        props.set_property(&person, "address.city", "Bergen".into()).unwrap();
        assert_eq!(props.get_nested_property(&person, "address.city"), Ok("Bergen".into()));

        assert_eq!(props.get_property(&person, "tags[1]"), Ok("b".into()));
        props.set_property(&person, "tags[1]", "c".into()).unwrap();
        assert_eq!(props.get_indexed_property(&person, "tags[1]"), Ok("c".into()));
        assert_eq!(props.get_indexed_property_at(&person, "tags", 0), Ok("a".into()));
    }

    #[test]
    fn null_intermediate() {
        let props = PropertyUtils::new();
        let person = Value::bean(Person::default());

        assert_eq!(props.get_property(&person, "address"), Ok(Value::Null));
        assert_eq!(
            props.get_property(&person, "address.city"),
            Err(BeanError::NullIntermediate {
                path: "address".into(),
                full: "address.city".into(),
            })
        );
        assert!(matches!(
            props.set_property(&person, "address.city", "x".into()),
            Err(BeanError::NullIntermediate { .. })
        ));
        assert_eq!(props.get_property(&Value::Null, "a"), Err(BeanError::NullTarget));
    }

    #[test]
    fn path_errors() {
        let props = PropertyUtils::new();
        let person = Value::bean(Person::sample("Oslo"));

        assert!(matches!(
            props.get_property(&person, "tags[x]"),
            Err(BeanError::InvalidPath(_))
        ));
        assert!(matches!(
            props.get_simple_property(&person, "address.city"),
            Err(BeanError::InvalidPath(_))
        ));
        assert!(matches!(
            props.get_indexed_property(&person, "tags"),
            Err(BeanError::InvalidPath(_))
        ));
        assert!(matches!(
            props.get_property(&person, "missing"),
            Err(BeanError::UnknownProperty { .. })
        ));
        assert!(matches!(
            props.get_property(&person, "tags[5]"),
            Err(BeanError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn keyed_accessors() {
        let props = PropertyUtils::new();
        let person = Value::bean(Person::default());

        props.set_property(&person, "phone(home)", "555".into()).unwrap();
        assert_eq!(props.get_property(&person, "phone(home)"), Ok("555".into()));
        assert_eq!(props.get_mapped_property(&person, "phone(work)"), Ok(Value::Null));
        assert_eq!(
            props.get_mapped_property_key(&person, "phone", "home"),
            Ok("555".into())
        );
        assert!(matches!(
            props.get_property(&person, "phone[0]"),
            Err(BeanError::NotIndexed { .. })
        ));

        let descriptor = props
            .mapped_property_descriptor(&person, "phone")
            .unwrap()
            .unwrap();
        assert_eq!(descriptor.value_type(), &ValueType::Str);
        assert!(props.mapped_property_descriptor(&person, "name").unwrap().is_none());
    }

    #[test]
    fn keyed_accessors_from_interfaces() {
        let props = PropertyUtils::new();

        let badge = Value::bean(Badge::default());
        assert_eq!(props.get_property(&badge, "label(gold)"), Ok("Badge:gold".into()));
        assert!(!props.is_writeable(&badge, "label(gold)"));

        let agent = Value::bean(Agent::default());
        props.set_property(&agent, "attribute(k)", "v".into()).unwrap();
        assert_eq!(props.get_property(&agent, "attribute(k)"), Ok("v".into()));
        assert!(matches!(
            props.get_property(&agent, "codename"),
            Err(BeanError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn keyed_accessor_mismatch() {
        let props = PropertyUtils::new();
        let ledger = Value::bean(Ledger::default());
        assert!(matches!(
            props.get_property(&ledger, "entry(a)"),
            Err(BeanError::DescriptorMismatch { .. })
        ));
    }

    #[test]
    fn keyed_setter_beside_indexed_setter() {
        let props = PropertyUtils::new();
        let rack = Rc::new(RefCell::new(Rack::default()));
        let target = Value::Bean(rack.clone());

        let mapped = props.mapped_property_descriptor(&target, "slot").unwrap().unwrap();
        assert_eq!(
            mapped.write_method().map(|m| m.params().first().cloned()),
            Some(Some(ValueType::Str))
        );

        props.set_property(&target, "slot(top)", "a".into()).unwrap();
        props.set_property(&target, "slot[1]", "b".into()).unwrap();
        assert_eq!(props.get_property(&target, "slot(top)"), Ok("a".into()));
        assert_eq!(rack.borrow().labels.get("top"), Some(&Value::from("a")));
        assert_eq!(rack.borrow().slots, [Value::Null, Value::from("b")]);
    }

    #[test]
    fn inherited_accessors() {
        let props = PropertyUtils::new();
        let employee = Value::bean(Employee::default());

        props.set_property(&employee, "name", "Eve".into()).unwrap();
        props.set_property(&employee, "salary", Value::I32(10)).unwrap();
        assert_eq!(props.get_property(&employee, "name"), Ok("Eve".into()));
        assert_eq!(props.get_property(&employee, "salary"), Ok(Value::I64(10)));
        assert!(matches!(
            props.set_property(&employee, "tags[0]", "x".into()),
            Err(BeanError::IndexOutOfRange { .. })
        ));
        assert!(props.class_descriptors(Employee::class()).get("age").is_some());
    }

    #[test]
    fn map_backed_bean_prefers_accessors() {
        let props = PropertyUtils::new();
        let config = Value::bean(Config::default());

        props.set_property(&config, "version", Value::I32(2)).unwrap();
        props.set_property(&config, "mode", "fast".into()).unwrap();
        assert_eq!(props.get_property(&config, "version"), Ok(Value::I32(2)));
        assert_eq!(props.get_property(&config, "mode"), Ok("fast".into()));
        assert_eq!(props.get_property(&config, "(mode)"), Ok("fast".into()));
        assert!(config.with_bean(|c: &Config| !c.entries.contains_key("version")).unwrap());

        assert!(matches!(
            props.set_property(&config, "version", "two".into()),
            Err(BeanError::ConversionFailure { .. })
        ));
    }

    #[test]
    fn maps_and_lists() {
        let props = PropertyUtils::new();
        let root = Value::map([(
            "users",
            Value::list([Value::map([("name", Value::from("ann"))])]),
        )]);

        assert_eq!(props.get_property(&root, "users[0].name"), Ok("ann".into()));
        props.set_property(&root, "users[0].age", Value::I8(3)).unwrap();
        assert_eq!(props.get_property(&root, "users[0].age"), Ok(Value::I8(3)));
        assert_eq!(props.get_property(&root, "missing"), Ok(Value::Null));

        let users = props.get_property(&root, "users").unwrap();
        assert_eq!(props.get_property(&users, "[0].name"), Ok("ann".into()));
        assert!(matches!(
            props.get_property(&root, "users(k)"),
            Err(BeanError::NotMapped { .. })
        ));

        let nested = Value::map([("m", Value::map([("k", Value::I8(1))]))]);
        assert!(matches!(
            props.get_property(&nested, "m[0]"),
            Err(BeanError::NotIndexed { .. })
        ));
    }

    #[test]
    fn read_only_list_elements() {
        let props = PropertyUtils::new();
        let person = Person {
            notes: Value::list(["first".into()]),
            ..Person::default()
        };
        let person = Value::bean(person);

        props.set_property(&person, "notes[0]", "second".into()).unwrap();
        assert_eq!(props.get_property(&person, "notes[0]"), Ok("second".into()));
        assert!(!props.is_writeable(&person, "notes"));
        assert!(props.is_writeable(&person, "notes[0]"));
    }

    #[test]
    fn dynamic_targets() {
        let props = PropertyUtils::new();
        let bean = Value::dyna(DynaBean::Lazy(LazyDynaBean::new()));

        props.set_property(&bean, "list[2]", Value::I8(1)).unwrap();
        props.set_property(&bean, "attrs(k)", "v".into()).unwrap();
        assert_eq!(props.get_property(&bean, "list[2]"), Ok(Value::I8(1)));
        assert_eq!(props.get_property(&bean, "list[0]"), Ok(Value::Null));
        assert_eq!(props.get_property(&bean, "attrs(k)"), Ok("v".into()));
        assert_eq!(props.property_type(&bean, "list"), Ok(Some(ValueType::List)));
    }

    #[test]
    fn introspection() {
        let props = PropertyUtils::new();
        let person = Value::bean(Person::sample("Oslo"));

        assert!(props.is_readable(&person, "id"));
        assert!(!props.is_writeable(&person, "id"));
        assert!(props.is_writeable(&person, "phone(x)"));
        assert!(props.is_readable(&person, "address.city"));
        assert!(!props.is_readable(&person, "missing"));
        assert!(!props.is_readable(&person, "bad[path"));

        let i32_ty = ValueType::Primitive(Primitive::I32);
        assert_eq!(props.property_type(&person, "age"), Ok(Some(i32_ty)));
        assert_eq!(
            props.property_type(&person, "tags"),
            Ok(Some(ValueType::array_of(ValueType::Str)))
        );
        assert_eq!(props.property_type(&person, "tags[0]"), Ok(Some(ValueType::Str)));
        assert_eq!(props.property_type(&person, "phone(x)"), Ok(Some(ValueType::Str)));

        let descriptor = props.property_descriptor(&person, "address.city").unwrap().unwrap();
        assert_eq!(descriptor.name(), "city");
        assert!(props.property_descriptor(&person, "missing").unwrap().is_none());
    }

    #[test]
    fn describe_and_copy() {
        let props = PropertyUtils::new();
        let person = Value::bean(Person::sample("Oslo"));

        let described = props.describe(&person).unwrap();
        assert_eq!(described.get("name"), Some(&Value::from("Ann")));
        assert_eq!(described.get("active"), Some(&Value::Bool(true)));
        assert!(!described.contains_key("phone"));

        let lazy = Value::dyna(DynaBean::Lazy(LazyDynaBean::new()));
        props.copy_properties(&lazy, &person).unwrap();
        assert_eq!(props.get_property(&lazy, "age"), Ok(Value::I32(31)));
        assert_eq!(props.get_property(&lazy, "address.city"), Ok("Oslo".into()));

        let other = Value::bean(Employee::default());
        props.copy_properties(&other, &lazy).unwrap();
        assert_eq!(props.get_property(&other, "age"), Ok(Value::I32(31)));
    }

    #[test]
    fn shared_cache() {
        let props = PropertyUtils::new();
        let other = PropertyUtils::with_cache(props.cache().clone());
        props.get_property(&Value::bean(Person::default()), "name").unwrap();
        assert!(other.cache().class_count() > 0);

        other.clear_descriptors();
        assert_eq!(props.cache().class_count(), 0);
    }
}
