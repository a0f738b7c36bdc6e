use alloc::borrow::Cow;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use vc_utils::hash::HashMap;

use crate::BeanError;
use crate::dyna::{BasicDynaBean, DynaBean};
use crate::value::ValueType;

// -----------------------------------------------------------------------------
// DynaProperty

/// A named, typed slot of a [`DynaClass`].
#[derive(Debug, Clone, PartialEq)]
pub struct DynaProperty {
    name: String,
    ty: ValueType,
    content_type: Option<ValueType>,
}

impl DynaProperty {
    #[inline]
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
            content_type: None,
        }
    }

    /// Declares the element type of a list or map property.
    #[inline]
    pub fn with_content_type(mut self, content_type: ValueType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> &ValueType {
        &self.ty
    }

    #[inline]
    pub fn content_type(&self) -> Option<&ValueType> {
        self.content_type.as_ref()
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.ty.is_indexed()
    }

    #[inline]
    pub fn is_mapped(&self) -> bool {
        self.ty.is_mapped()
    }

    /// The type of the elements of an indexed or mapped property.
    ///
    /// Array properties report their component type, other properties
    /// their declared content type, or [`ValueType::Any`].
    pub fn element_type(&self) -> ValueType {
        match (&self.ty, &self.content_type) {
            (ValueType::Array(component), _) => (**component).clone(),
            (_, Some(content)) => content.clone(),
            _ => ValueType::Any,
        }
    }
}

// -----------------------------------------------------------------------------
// Schema

/// Properties in declaration order, indexed by name.
#[derive(Debug, Clone, Default)]
struct Schema {
    properties: Vec<DynaProperty>,
    index: HashMap<String, usize>,
}

impl Schema {
    #[inline]
    fn get(&self, name: &str) -> Option<&DynaProperty> {
        self.index.get(name).map(|&i| &self.properties[i])
    }

    fn insert(&mut self, property: DynaProperty) {
        match self.index.get(&property.name) {
            Some(&i) => self.properties[i] = property,
            None => {
                self.index.insert(property.name.clone(), self.properties.len());
                self.properties.push(property);
            }
        }
    }

    fn remove(&mut self, name: &str) {
        let Some(position) = self.index.remove(name) else {
            return;
        };
        self.properties.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
    }
}

// -----------------------------------------------------------------------------
// DynaClass

/// The schema of a dynamic container.
///
/// A class is shared by every container created from it, and its
/// properties can be added or removed in place until it is marked
/// restricted.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use vc_beans::dyna::{DynaClass, DynaProperty};
/// use vc_beans::value::{Primitive, Value, ValueType};
///
/// let class = Rc::new(DynaClass::new("Row"));
/// class.add_property(DynaProperty::new("id", ValueType::Primitive(Primitive::I64))).unwrap();
/// class.set_restricted(true);
/// assert!(class.add("other").is_err());
///
/// let mut row = class.new_instance();
/// assert_eq!(row.get("id").unwrap(), Value::I64(0));
/// ```
#[derive(Clone)]
pub struct DynaClass {
    name: Cow<'static, str>,
    schema: RefCell<Schema>,
    restricted: Cell<bool>,
}

impl DynaClass {
    /// Creates an unrestricted class without properties.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            schema: RefCell::new(Schema::default()),
            restricted: Cell::new(false),
        }
    }

    /// Creates an unrestricted class holding `properties`.
    ///
    /// A later property replaces an earlier one of the same name.
    pub fn with_properties(
        name: impl Into<Cow<'static, str>>,
        properties: impl IntoIterator<Item = DynaProperty>,
    ) -> Self {
        let class = Self::new(name);
        {
            let mut schema = class.schema.borrow_mut();
            for property in properties {
                schema.insert(property);
            }
        }
        class
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A snapshot of the properties, in declaration order.
    pub fn properties(&self) -> Vec<DynaProperty> {
        self.schema.borrow().properties.clone()
    }

    pub fn property_names(&self) -> Vec<String> {
        self.schema.borrow().properties.iter().map(|p| p.name.clone()).collect()
    }

    pub fn property(&self, name: &str) -> Option<DynaProperty> {
        self.schema.borrow().get(name).cloned()
    }

    #[inline]
    pub fn is_dyna_property(&self, name: &str) -> bool {
        self.schema.borrow().index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schema.borrow().properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schema.borrow().properties.is_empty()
    }

    #[inline]
    pub fn is_restricted(&self) -> bool {
        self.restricted.get()
    }

    /// Freezes or unfreezes the property list.
    #[inline]
    pub fn set_restricted(&self, restricted: bool) {
        self.restricted.set(restricted);
    }

    fn check_unrestricted(&self, property: &str) -> Result<(), BeanError> {
        if self.restricted.get() {
            return Err(BeanError::RestrictedSchemaViolation {
                class: self.name.as_ref().into(),
                property: property.into(),
            });
        }
        Ok(())
    }

    /// Adds an untyped property.
    #[inline]
    pub fn add(&self, name: &str) -> Result<(), BeanError> {
        self.add_property(DynaProperty::new(name, ValueType::Any))
    }

    /// Adds `property`, replacing a property of the same name.
    pub fn add_property(&self, property: DynaProperty) -> Result<(), BeanError> {
        self.check_unrestricted(&property.name)?;
        self.schema.borrow_mut().insert(property);
        Ok(())
    }

    /// Removes property `name`; removing an absent property does nothing.
    pub fn remove(&self, name: &str) -> Result<(), BeanError> {
        self.check_unrestricted(name)?;
        self.schema.borrow_mut().remove(name);
        Ok(())
    }

    /// Creates an empty fixed-schema container of this class.
    pub fn new_instance(self: &Rc<Self>) -> DynaBean {
        DynaBean::Basic(BasicDynaBean::new(Rc::clone(self)))
    }
}

impl fmt::Debug for DynaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynaClass")
            .field("name", &self.name)
            .field("properties", &self.schema.borrow().properties)
            .field("restricted", &self.restricted.get())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{DynaClass, DynaProperty};
    use crate::BeanError;
    use crate::value::{Primitive, ValueType};

    #[test]
    fn element_type() {
        let ints = DynaProperty::new("xs", ValueType::array_of(ValueType::Primitive(Primitive::I32)));
        assert_eq!(ints.element_type(), ValueType::Primitive(Primitive::I32));
        assert!(ints.is_indexed());

        let names = DynaProperty::new("ns", ValueType::List).with_content_type(ValueType::Str);
        assert_eq!(names.element_type(), ValueType::Str);
        assert_eq!(DynaProperty::new("m", ValueType::Map).element_type(), ValueType::Any);
    }

    #[test]
    fn add_replaces_and_keeps_order() {
        let class = DynaClass::with_properties(
            "Row",
            [
                DynaProperty::new("a", ValueType::Str),
                DynaProperty::new("b", ValueType::Str),
            ],
        );
        class.add_property(DynaProperty::new("a", ValueType::Date)).unwrap();
        assert_eq!(class.property_names(), ["a", "b"]);
        assert_eq!(class.property("a").unwrap().ty(), &ValueType::Date);
    }

    #[test]
    fn restricted_class_rejects_changes() {
        let class = DynaClass::new("Row");
        class.add("a").unwrap();
        class.set_restricted(true);

        assert_eq!(
            class.add("new"),
            Err(BeanError::RestrictedSchemaViolation {
                class: "Row".into(),
                property: "new".into(),
            })
        );
        assert!(class.remove("a").is_err());
        assert!(class.is_dyna_property("a"));

        class.set_restricted(false);
        class.remove("a").unwrap();
        assert!(class.is_empty());
    }

    #[test]
    fn lookup_by_name_after_removal() {
        let class = DynaClass::with_properties(
            "Row",
            ["a", "b", "c"].map(|name| DynaProperty::new(name, ValueType::Str)),
        );
        class.remove("a").unwrap();
        class.remove("missing").unwrap();

        assert_eq!(class.property_names(), ["b", "c"]);
        assert_eq!(class.property("c").map(|p| p.name().to_owned()), Some("c".into()));
        assert!(!class.is_dyna_property("a"));

        class.add("a").unwrap();
        assert_eq!(class.property_names(), ["b", "c", "a"]);
        assert_eq!(class.property("b").unwrap().ty(), &ValueType::Str);
        assert_eq!(class.property("a").unwrap().ty(), &ValueType::Any);
    }
}
