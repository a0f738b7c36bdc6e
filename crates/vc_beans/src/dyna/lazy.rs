use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::BeanError;
use crate::dyna::{DynaClass, DynaProperty};
use crate::value::{MapRef, Value, ValueMap, ValueType};

// -----------------------------------------------------------------------------
// LazyDynaBean

/// A container that extends its own schema as properties are written.
///
/// Writing an undeclared property adds it to the schema, typed after the
/// written value, unless the schema is restricted. Indexed and mapped
/// access to an undeclared property first installs an empty list or
/// map. Indexed access past the end grows the collection instead of
/// failing.
///
/// A container built with [`over_map`](LazyDynaBean::over_map) stores its
/// values in a caller-provided map, whose existing keys count as
/// declared untyped properties.
///
/// # Examples
///
/// ```
/// use vc_beans::dyna::LazyDynaBean;
/// use vc_beans::value::Value;
///
/// let mut bean = LazyDynaBean::new();
/// bean.set_indexed("list", 2, "x".into()).unwrap();
///
/// assert_eq!(bean.size("list"), 3);
/// assert_eq!(bean.get_indexed("list", 0).unwrap(), Value::Null);
/// assert_eq!(bean.get_indexed("list", 2).unwrap(), Value::from("x"));
/// ```
///
/// Cloning copies the schema and the stored values, so the clone extends
/// its own schema. A container over a shared map keeps sharing the map.
#[derive(Debug)]
pub struct LazyDynaBean {
    class: Rc<DynaClass>,
    values: MapRef,
    shared: bool,
}

impl Clone for LazyDynaBean {
    fn clone(&self) -> Self {
        let values = if self.shared {
            Rc::clone(&self.values)
        } else {
            Rc::new(RefCell::new(self.values.borrow().clone()))
        };
        Self {
            class: Rc::new((*self.class).clone()),
            values,
            shared: self.shared,
        }
    }
}

impl Default for LazyDynaBean {
    fn default() -> Self {
        Self::new()
    }
}

impl LazyDynaBean {
    pub fn new() -> Self {
        Self::with_class(&DynaClass::new("LazyDynaBean"))
    }

    /// Creates a container starting from a copy of `class`.
    pub fn with_class(class: &DynaClass) -> Self {
        Self {
            class: Rc::new(class.clone()),
            values: Rc::new(RefCell::new(ValueMap::default())),
            shared: false,
        }
    }

    /// Creates a container storing its values in `map`.
    pub fn over_map(map: MapRef) -> Self {
        Self {
            class: Rc::new(DynaClass::new("LazyDynaMap")),
            values: map,
            shared: true,
        }
    }

    #[inline]
    pub fn dyna_class(&self) -> &Rc<DynaClass> {
        &self.class
    }

    /// The map holding the values.
    #[inline]
    pub fn map(&self) -> &MapRef {
        &self.values
    }

    /// Declares property `name` of type `ty` ahead of its first write.
    #[inline]
    pub fn declare(&mut self, name: &str, ty: ValueType) -> Result<(), BeanError> {
        self.class.add_property(DynaProperty::new(name, ty))
    }

    /// The declared property `name`, or an untyped one for a key already
    /// present in a shared map.
    pub fn property(&self, name: &str) -> Option<DynaProperty> {
        self.class.property(name).or_else(|| {
            (self.shared && self.values.borrow().contains_key(name))
                .then(|| DynaProperty::new(name, ValueType::Any))
        })
    }

    #[inline]
    pub fn is_dyna_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    /// Declared property names, then adopted map keys in sorted order.
    pub fn property_names(&self) -> Vec<String> {
        let mut names = self.class.property_names();
        if self.shared {
            let mut adopted: Vec<String> = self
                .values
                .borrow()
                .keys()
                .filter(|key| !self.class.is_dyna_property(key))
                .cloned()
                .collect();
            adopted.sort();
            names.extend(adopted);
        }
        names
    }

    /// Returns `true` if `name` can be written without a schema violation.
    #[inline]
    pub fn is_writeable(&self, name: &str) -> bool {
        !self.class.is_restricted() || self.is_dyna_property(name)
    }

    /// Number of elements held by a list, array or map property, or `0`.
    pub fn size(&self, name: &str) -> usize {
        self.values
            .borrow()
            .get(name)
            .and_then(Value::container_len)
            .unwrap_or(0)
    }

    /// Reads `name`.
    ///
    /// An undeclared property reads as [`Value::Null`] and stays
    /// undeclared. A declared property without a value is assigned a
    /// default instance of its type first.
    pub fn get(&mut self, name: &str) -> Result<Value, BeanError> {
        if let Some(value) = self.values.borrow().get(name)
            && !value.is_null()
        {
            return Ok(value.clone());
        }
        let Some(property) = self.property(name) else {
            return Ok(Value::Null);
        };
        let value = property.ty().default_instance();
        if !value.is_null() {
            self.values.borrow_mut().insert(name.into(), value.clone());
        }
        Ok(value)
    }

    /// Writes `name`, declaring it first if needed.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), BeanError> {
        let property = match self.property(name) {
            Some(property) => property,
            None => {
                let ty = match &value {
                    Value::Null => ValueType::Any,
                    value => value.runtime_type(),
                };
                let property = DynaProperty::new(name, ty);
                self.class.add_property(property.clone())?;
                property
            }
        };
        let value = property.ty().coerce(name, value)?;
        self.values.borrow_mut().insert(name.into(), value);
        Ok(())
    }

    /// The collection behind `name`, installing `empty` for an undeclared
    /// property.
    fn collection(&mut self, name: &str, empty: impl Fn() -> Value) -> Result<(DynaProperty, Value), BeanError> {
        if !self.is_dyna_property(name) {
            self.set(name, empty())?;
        }
        let mut value = self.get(name)?;
        if value.is_null() {
            value = empty();
            self.set(name, value.clone())?;
        }
        let property = self
            .property(name)
            .ok_or_else(|| BeanError::unknown(name, self.class.name()))?;
        Ok((property, value))
    }

    /// Grows the indexed property `name` so that `index` is in range.
    fn grow(&mut self, name: &str, index: usize) -> Result<(DynaProperty, Value), BeanError> {
        let (property, value) = self.collection(name, || Value::list(Vec::new()))?;
        let value = match value {
            Value::List(list) => {
                {
                    let mut list = list.borrow_mut();
                    if list.len() <= index {
                        list.resize(index + 1, Value::Null);
                    }
                }
                Value::List(list)
            }
            Value::Array(array) => {
                if array.borrow().len() > index {
                    Value::Array(array)
                } else {
                    let grown = array.borrow().grown(index + 1);
                    let grown = Value::Array(Rc::new(RefCell::new(grown)));
                    self.values.borrow_mut().insert(name.into(), grown.clone());
                    grown
                }
            }
            _ => return Err(BeanError::not_indexed(name)),
        };
        Ok((property, value))
    }

    pub fn get_indexed(&mut self, name: &str, index: usize) -> Result<Value, BeanError> {
        let (_, collection) = self.grow(name, index)?;
        collection.index_get(name, index)
    }

    pub fn set_indexed(&mut self, name: &str, index: usize, value: Value) -> Result<(), BeanError> {
        let (property, collection) = self.grow(name, index)?;
        collection.index_set(name, index, value, &property.element_type())
    }

    fn keyed(&mut self, name: &str) -> Result<(DynaProperty, Value), BeanError> {
        let (property, value) = self.collection(name, || Value::map(Vec::<(String, Value)>::new()))?;
        if !value.is_keyed() {
            return Err(BeanError::not_mapped(name));
        }
        Ok((property, value))
    }

    pub fn get_mapped(&mut self, name: &str, key: &str) -> Result<Value, BeanError> {
        let (_, map) = self.keyed(name)?;
        map.key_get(name, key)
    }

    pub fn set_mapped(&mut self, name: &str, key: &str, value: Value) -> Result<(), BeanError> {
        let (property, map) = self.keyed(name)?;
        let value = property.element_type().coerce(name, value)?;
        map.key_set(name, key, value)
    }

    /// Returns `true` if the mapped property `name` holds `key`.
    ///
    /// An absent or non-map property holds nothing.
    pub fn contains(&self, name: &str, key: &str) -> bool {
        let value = self.values.borrow().get(name).cloned().unwrap_or_default();
        value.key_contains(name, key).unwrap_or(false)
    }

    /// Removes `key` from the mapped property `name`.
    pub fn remove(&mut self, name: &str, key: &str) -> Result<(), BeanError> {
        let value = self.values.borrow().get(name).cloned().unwrap_or_default();
        if value.is_null() {
            return Ok(());
        }
        value.key_remove(name, key)
    }

    /// A new empty container with a copy of this container's schema.
    pub fn instantiate(&self) -> Self {
        Self::with_class(&self.class)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::RefCell;

    use super::LazyDynaBean;
    use crate::BeanError;
    use crate::value::{Primitive, Value, ValueMap, ValueType};

    #[test]
    fn set_declares_from_runtime_type() {
        let mut bean = LazyDynaBean::new();
        bean.set("count", Value::I32(1)).unwrap();

        let property = bean.property("count").unwrap();
        assert_eq!(property.ty(), &ValueType::Boxed(Primitive::I32));

        bean.set("count", Value::I8(2)).unwrap();
        assert_eq!(bean.get("count"), Ok(Value::I32(2)));
        assert!(matches!(
            bean.set("count", "x".into()),
            Err(BeanError::ConversionFailure { .. })
        ));
    }

    #[test]
    fn get_does_not_declare() {
        let mut bean = LazyDynaBean::new();
        assert_eq!(bean.get("missing"), Ok(Value::Null));
        assert!(!bean.is_dyna_property("missing"));
    }

    #[test]
    fn declared_type_wins() {
        let mut bean = LazyDynaBean::new();
        bean.declare("n", ValueType::Primitive(Primitive::I64)).unwrap();
        assert_eq!(bean.get("n"), Ok(Value::I64(0)));
        bean.set("n", Value::I16(4)).unwrap();
        assert_eq!(bean.get("n"), Ok(Value::I64(4)));
    }

    #[test]
    fn indexed_growth() {
        let mut bean = LazyDynaBean::new();
        bean.set_indexed("list", 0, "x".into()).unwrap();
        assert_eq!(bean.get_indexed("list", 0), Ok("x".into()));
        assert_eq!(bean.size("list"), 1);

        bean.set_indexed("list", 5, "y".into()).unwrap();
        assert_eq!(bean.size("list"), 6);
        assert_eq!(bean.get_indexed("list", 3), Ok(Value::Null));
        assert_eq!(bean.get_indexed("list", 5), Ok("y".into()));
    }

    #[test]
    fn array_growth_fills_defaults() {
        let mut bean = LazyDynaBean::new();
        bean.declare("ns", ValueType::array_of(ValueType::Primitive(Primitive::I32)))
            .unwrap();
        bean.set_indexed("ns", 2, Value::I32(9)).unwrap();

        assert_eq!(bean.size("ns"), 3);
        assert_eq!(bean.get_indexed("ns", 0), Ok(Value::I32(0)));
        assert_eq!(bean.get_indexed("ns", 2), Ok(Value::I32(9)));
        assert!(matches!(
            bean.set_indexed("ns", 0, Value::Null),
            Err(BeanError::NullForPrimitive { .. })
        ));
    }

    #[test]
    fn mapped_access() {
        let mut bean = LazyDynaBean::new();
        assert_eq!(bean.get_mapped("attrs", "k"), Ok(Value::Null));
        assert!(bean.is_dyna_property("attrs"));

        bean.set_mapped("attrs", "k", Value::I8(1)).unwrap();
        assert!(bean.contains("attrs", "k"));
        bean.remove("attrs", "k").unwrap();
        assert!(!bean.contains("attrs", "k"));

        bean.set("n", Value::I8(1)).unwrap();
        assert!(matches!(
            bean.get_indexed("n", 0),
            Err(BeanError::NotIndexed { .. })
        ));
        assert!(matches!(
            bean.get_mapped("n", "k"),
            Err(BeanError::NotMapped { .. })
        ));
    }

    #[test]
    fn restricted_schema() {
        let mut bean = LazyDynaBean::new();
        bean.set("a", Value::I8(1)).unwrap();
        bean.dyna_class().set_restricted(true);

        assert!(bean.is_writeable("a"));
        assert!(!bean.is_writeable("b"));
        bean.set("a", Value::I8(2)).unwrap();
        assert!(matches!(
            bean.set("b", Value::I8(1)),
            Err(BeanError::RestrictedSchemaViolation { .. })
        ));
        assert!(matches!(
            bean.set_indexed("list", 0, Value::Null),
            Err(BeanError::RestrictedSchemaViolation { .. })
        ));
    }

    #[test]
    fn over_shared_map() {
        let mut map = ValueMap::default();
        map.insert("existing".into(), Value::I32(1));
        let map = Rc::new(RefCell::new(map));

        let mut bean = LazyDynaBean::over_map(Rc::clone(&map));
        assert!(bean.is_dyna_property("existing"));
        bean.set("existing", "now text".into()).unwrap();
        bean.set("added", Value::Bool(true)).unwrap();

        assert_eq!(map.borrow().get("existing"), Some(&Value::from("now text")));
        assert_eq!(map.borrow().get("added"), Some(&Value::Bool(true)));
        assert_eq!(bean.property_names(), ["added", "existing"]);
    }

    #[test]
    fn instantiate_copies_schema_only() {
        let mut bean = LazyDynaBean::new();
        bean.set("a", Value::I8(1)).unwrap();

        let mut fresh = bean.instantiate();
        assert!(fresh.is_dyna_property("a"));
        assert_eq!(fresh.get("a"), Ok(Value::Null));

        fresh.set("b", Value::I8(1)).unwrap();
        assert!(!bean.is_dyna_property("b"));
    }

    #[test]
    fn null_property_becomes_collection() {
        let mut bean = LazyDynaBean::new();
        bean.set("items", Value::Null).unwrap();
        bean.set("attrs", Value::Null).unwrap();

        bean.set_indexed("items", 1, "x".into()).unwrap();
        assert_eq!(bean.size("items"), 2);
        assert_eq!(bean.get_indexed("items", 1), Ok("x".into()));

        bean.set_mapped("attrs", "k", Value::I32(3)).unwrap();
        assert_eq!(bean.get_mapped("attrs", "k"), Ok(Value::I32(3)));
    }

    #[test]
    fn clone_owns_schema_and_values() {
        let mut original = LazyDynaBean::new();
        original.set("x", Value::I8(1)).unwrap();

        let mut copy = original.clone();
        copy.set("only_copy", Value::I8(2)).unwrap();
        copy.set("x", Value::I8(5)).unwrap();

        assert!(!original.is_dyna_property("only_copy"));
        assert_eq!(original.get("only_copy"), Ok(Value::Null));
        assert_eq!(original.get("x"), Ok(Value::I8(1)));
        assert_eq!(copy.get("x"), Ok(Value::I8(5)));
    }

    #[test]
    fn clone_over_shared_map_keeps_map() {
        let map = Rc::new(RefCell::new(ValueMap::default()));
        let original = LazyDynaBean::over_map(Rc::clone(&map));

        let mut copy = original.clone();
        copy.set("k", Value::Bool(true)).unwrap();

        assert!(Rc::ptr_eq(copy.map(), original.map()));
        assert_eq!(map.borrow().get("k"), Some(&Value::Bool(true)));
        assert!(!original.dyna_class().is_dyna_property("k"));
    }
}
