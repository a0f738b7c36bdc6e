use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, warn};
use vc_utils::hash::HashMap;

use crate::descriptor::lookup::accessible_method;
use crate::info::{BeanClass, INDEX_TYPE, Method, decapitalize};
use crate::value::{Primitive, ValueType};

// -----------------------------------------------------------------------------
// PropertyDescriptor

/// The accessors of one property of a bean class.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    name: String,
    read: Option<Method>,
    write: Option<Method>,
    indexed_read: Option<Method>,
    indexed_write: Option<Method>,
}

impl PropertyDescriptor {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `getX()` or `isX()`.
    #[inline]
    pub fn read_method(&self) -> Option<&Method> {
        self.read.as_ref()
    }

    /// `setX(value)`.
    #[inline]
    pub fn write_method(&self) -> Option<&Method> {
        self.write.as_ref()
    }

    /// `getX(index)`.
    #[inline]
    pub fn indexed_read_method(&self) -> Option<&Method> {
        self.indexed_read.as_ref()
    }

    /// `setX(index, value)`.
    #[inline]
    pub fn indexed_write_method(&self) -> Option<&Method> {
        self.indexed_write.as_ref()
    }

    /// Type of the whole property, `None` for purely indexed properties.
    pub fn property_type(&self) -> Option<&ValueType> {
        match &self.read {
            Some(read) => read.return_type(),
            None => self.write.as_ref().and_then(|write| write.params().first()),
        }
    }

    /// Type of one element, for indexed properties.
    pub fn indexed_type(&self) -> Option<&ValueType> {
        match &self.indexed_read {
            Some(read) => read.return_type(),
            None => self.indexed_write.as_ref().and_then(|write| write.params().get(1)),
        }
    }

    /// Element type reached by an indexed path segment.
    pub fn element_type(&self) -> Option<ValueType> {
        if let Some(ty) = self.indexed_type() {
            return Some(ty.clone());
        }
        match self.property_type()? {
            ValueType::Array(component) => Some((**component).clone()),
            ValueType::List | ValueType::Any => Some(ValueType::Any),
            _ => None,
        }
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.indexed_read.is_some() || self.indexed_write.is_some()
    }

    #[inline]
    pub fn is_readable(&self) -> bool {
        self.read.is_some() || self.indexed_read.is_some()
    }

    #[inline]
    pub fn is_writeable(&self) -> bool {
        self.write.is_some() || self.indexed_write.is_some()
    }
}

// -----------------------------------------------------------------------------
// ClassDescriptors

/// Every property discovered on one bean class, in declaration order.
#[derive(Debug, Default)]
pub struct ClassDescriptors {
    descriptors: Vec<PropertyDescriptor>,
    index: HashMap<String, usize>,
}

impl ClassDescriptors {
    #[inline]
    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.descriptors.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Introspection

enum Role {
    Read,
    Write,
    IndexedRead,
    IndexedWrite,
}

/// Classifies `method` as a property accessor by its name and signature.
fn classify(method: &Method) -> Option<(String, Role)> {
    let name = method.name();
    let params = method.params();
    let ret = method.return_type();

    let (rest, role) = if let Some(rest) = name.strip_prefix("get") {
        match (params, ret) {
            ([], Some(_)) => (rest, Role::Read),
            ([index], Some(_)) if *index == INDEX_TYPE => (rest, Role::IndexedRead),
            _ => return None,
        }
    } else if let Some(rest) = name.strip_prefix("is") {
        match (params, ret) {
            ([], Some(ValueType::Primitive(Primitive::Bool))) => (rest, Role::Read),
            _ => return None,
        }
    } else if let Some(rest) = name.strip_prefix("set") {
        match (params, ret) {
            ([_], None) => (rest, Role::Write),
            ([index, _], None) if *index == INDEX_TYPE => (rest, Role::IndexedWrite),
            _ => return None,
        }
    } else {
        return None;
    };

    if rest.is_empty() {
        return None;
    }
    Some((decapitalize(rest), role))
}

#[derive(Default)]
struct Draft {
    read: Option<Method>,
    writes: Vec<Method>,
    indexed_read: Option<Method>,
    indexed_writes: Vec<Method>,
}

impl Draft {
    fn set_read(&mut self, method: Method) {
        // `isX` wins over `getX` of the same property.
        let keep_current = self
            .read
            .as_ref()
            .is_some_and(|current| current.name().starts_with("is") && !method.name().starts_with("is"));
        if !keep_current {
            self.read = Some(method);
        }
    }

    /// Picks the most derived setter whose type agrees with the getter.
    fn pick_write<'a>(
        class: &BeanClass,
        name: &str,
        expected: Option<&ValueType>,
        writes: &'a [Method],
        position: usize,
    ) -> Option<&'a Method> {
        let Some(expected) = expected else {
            return writes.last();
        };
        let found = writes
            .iter()
            .rev()
            .find(|write| write.params().get(position) == Some(expected));
        if found.is_none() && !writes.is_empty() {
            warn!(
                "dropping setter of `{}.{name}`: parameter type disagrees with getter type `{expected}`",
                class.name()
            );
        }
        found
    }

    fn finish(self, class: &BeanClass, name: String) -> PropertyDescriptor {
        let read_type = self.read.as_ref().and_then(Method::return_type);
        let write = Self::pick_write(class, &name, read_type, &self.writes, 0).cloned();

        let indexed_type = self.indexed_read.as_ref().and_then(Method::return_type);
        let indexed_write =
            Self::pick_write(class, &name, indexed_type, &self.indexed_writes, 1).cloned();

        PropertyDescriptor {
            name,
            read: self.read,
            write,
            indexed_read: self.indexed_read,
            indexed_write,
        }
    }
}

/// Discovers the properties of `class` from the accessors it declares or
/// inherits. Accessors of descendants override those of ancestors.
pub(crate) fn introspect(class: &'static BeanClass) -> ClassDescriptors {
    let mut names: Vec<String> = Vec::new();
    let mut drafts: HashMap<String, Draft> = HashMap::default();

    let chain: Vec<&'static BeanClass> = class.ancestors().collect();
    for declaring in chain.into_iter().rev() {
        for method in declaring.methods() {
            if !method.has_body() {
                continue;
            }
            let Some((name, role)) = classify(method) else {
                continue;
            };
            let Some(method) = accessible_method(class, declaring, method) else {
                continue;
            };

            let draft = drafts.entry(name).or_insert_with_key(|name| {
                names.push(name.clone());
                Draft::default()
            });
            match role {
                Role::Read => draft.set_read(method),
                Role::Write => draft.writes.push(method),
                Role::IndexedRead => draft.indexed_read = Some(method),
                Role::IndexedWrite => draft.indexed_writes.push(method),
            }
        }
    }

    let mut descriptors = Vec::with_capacity(names.len());
    let mut index = HashMap::default();
    for name in names {
        if let Some(draft) = drafts.remove(&name) {
            index.insert(name.clone(), descriptors.len());
            descriptors.push(draft.finish(class, name));
        }
    }

    debug!("introspected {} properties of `{}`", descriptors.len(), class.name());
    ClassDescriptors { descriptors, index }
}
