//! Dynamic containers.
//!
//! A [`DynaBean`] holds named properties described by a [`DynaClass`]
//! instead of a compiled type. Three disciplines are available:
//!
//! - [`BasicDynaBean`]: the schema is fixed, unknown names are errors.
//! - [`LazyDynaBean`]: the schema grows as properties are written.
//! - [`WrapDynaBean`]: an ordinary bean seen through the same interface.
//!
//! Containers are single-threaded; share them through [`DynaRef`].

// -----------------------------------------------------------------------------
// Modules

mod basic;
mod class;
mod lazy;
mod wrap;

// -----------------------------------------------------------------------------
// Exports

pub use basic::BasicDynaBean;
pub use class::{DynaClass, DynaProperty};
pub use lazy::LazyDynaBean;
pub use wrap::WrapDynaBean;

// -----------------------------------------------------------------------------
// DynaBean

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::BeanError;
use crate::value::{Value, ValueMap};

/// Shared handle to a dynamic container.
pub type DynaRef = Rc<RefCell<DynaBean>>;

/// A dynamic container of any discipline.
#[derive(Debug, Clone)]
pub enum DynaBean {
    Basic(BasicDynaBean),
    Lazy(LazyDynaBean),
    Wrap(WrapDynaBean),
}

macro_rules! dispatch {
    ($this:expr, $bean:ident => $body:expr) => {
        match $this {
            DynaBean::Basic($bean) => $body,
            DynaBean::Lazy($bean) => $body,
            DynaBean::Wrap($bean) => $body,
        }
    };
}

impl DynaBean {
    /// Moves the container behind a shared handle.
    #[inline]
    pub fn into_ref(self) -> DynaRef {
        Rc::new(RefCell::new(self))
    }

    #[inline]
    pub fn dyna_class(&self) -> &Rc<DynaClass> {
        dispatch!(self, bean => bean.dyna_class())
    }

    /// The schema entry of `name`.
    pub fn property(&self, name: &str) -> Option<DynaProperty> {
        match self {
            Self::Basic(bean) => bean.dyna_class().property(name),
            Self::Lazy(bean) => bean.property(name),
            Self::Wrap(bean) => bean.property(name),
        }
    }

    /// Names of the properties [`get`](Self::get) can read.
    pub fn property_names(&self) -> Vec<String> {
        match self {
            Self::Basic(bean) => bean.dyna_class().property_names(),
            Self::Lazy(bean) => bean.property_names(),
            Self::Wrap(bean) => bean.property_names(),
        }
    }

    pub fn is_readable(&self, name: &str) -> bool {
        match self {
            Self::Basic(bean) => bean.dyna_class().is_dyna_property(name),
            Self::Lazy(_) => true,
            Self::Wrap(bean) => bean.is_readable(name),
        }
    }

    pub fn is_writeable(&self, name: &str) -> bool {
        match self {
            Self::Basic(bean) => bean.dyna_class().is_dyna_property(name),
            Self::Lazy(bean) => bean.is_writeable(name),
            Self::Wrap(bean) => bean.is_writeable(name),
        }
    }

    #[inline]
    pub fn get(&mut self, name: &str) -> Result<Value, BeanError> {
        dispatch!(self, bean => bean.get(name))
    }

    #[inline]
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), BeanError> {
        dispatch!(self, bean => bean.set(name, value))
    }

    #[inline]
    pub fn get_indexed(&mut self, name: &str, index: usize) -> Result<Value, BeanError> {
        dispatch!(self, bean => bean.get_indexed(name, index))
    }

    #[inline]
    pub fn set_indexed(&mut self, name: &str, index: usize, value: Value) -> Result<(), BeanError> {
        dispatch!(self, bean => bean.set_indexed(name, index, value))
    }

    #[inline]
    pub fn get_mapped(&mut self, name: &str, key: &str) -> Result<Value, BeanError> {
        dispatch!(self, bean => bean.get_mapped(name, key))
    }

    #[inline]
    pub fn set_mapped(&mut self, name: &str, key: &str, value: Value) -> Result<(), BeanError> {
        dispatch!(self, bean => bean.set_mapped(name, key, value))
    }

    /// Returns `true` if the mapped property `name` holds `key`.
    ///
    /// Wrapped beans fail with [`BeanError::UnsupportedOperation`].
    pub fn contains(&self, name: &str, key: &str) -> Result<bool, BeanError> {
        match self {
            Self::Basic(bean) => bean.contains(name, key),
            Self::Lazy(bean) => Ok(bean.contains(name, key)),
            Self::Wrap(bean) => bean.contains(name, key),
        }
    }

    /// Removes `key` from the mapped property `name`.
    ///
    /// Wrapped beans fail with [`BeanError::UnsupportedOperation`].
    #[inline]
    pub fn remove(&mut self, name: &str, key: &str) -> Result<(), BeanError> {
        dispatch!(self, bean => bean.remove(name, key))
    }

    /// Number of elements held by a list, array or map property.
    ///
    /// Other and absent values count as `0`.
    pub fn size(&mut self, name: &str) -> Result<usize, BeanError> {
        if let Self::Lazy(bean) = self {
            return Ok(bean.size(name));
        }
        Ok(self.get(name)?.container_len().unwrap_or(0))
    }

    /// A new, empty container of the same schema and discipline.
    pub fn instantiate(&self) -> Result<Self, BeanError> {
        Ok(match self {
            Self::Basic(bean) => bean.dyna_class().new_instance(),
            Self::Lazy(bean) => Self::Lazy(bean.instantiate()),
            Self::Wrap(bean) => Self::Wrap(bean.instantiate()?),
        })
    }

    /// A snapshot of the stored values, or `None` for wrapped beans.
    pub fn stored_values(&self) -> Option<ValueMap> {
        match self {
            Self::Basic(bean) => Some(bean.values().clone()),
            Self::Lazy(bean) => Some(bean.map().borrow().clone()),
            Self::Wrap(_) => None,
        }
    }
}

impl From<BasicDynaBean> for DynaBean {
    #[inline]
    fn from(bean: BasicDynaBean) -> Self {
        Self::Basic(bean)
    }
}

impl From<LazyDynaBean> for DynaBean {
    #[inline]
    fn from(bean: LazyDynaBean) -> Self {
        Self::Lazy(bean)
    }
}

impl From<WrapDynaBean> for DynaBean {
    #[inline]
    fn from(bean: WrapDynaBean) -> Self {
        Self::Wrap(bean)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::RefCell;

    use super::{DynaBean, DynaClass, DynaProperty, LazyDynaBean, WrapDynaBean};
    use crate::BeanError;
    use crate::fixtures::Person;
    use crate::value::{Primitive, Value, ValueType};

    fn wrapped() -> DynaBean {
        DynaBean::Wrap(WrapDynaBean::new(Rc::new(RefCell::new(Person::sample("Oslo")))))
    }

    #[test]
    fn adapter_delegates_to_accessors() {
        let mut bean = wrapped();
        assert_eq!(bean.get("name"), Ok("Ann".into()));
        bean.set("age", Value::I16(40)).unwrap();
        assert_eq!(bean.get("age"), Ok(Value::I32(40)));
        assert_eq!(bean.get_indexed("tags", 1), Ok("b".into()));
        bean.set_mapped("phone", "home", "1".into()).unwrap();
        assert_eq!(bean.get_mapped("phone", "home"), Ok("1".into()));
        assert!(matches!(
            bean.set("missing", Value::Null),
            Err(BeanError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn adapter_rejects_contains_and_remove() {
        let mut bean = wrapped();
        assert!(matches!(
            bean.contains("phone", "home"),
            Err(BeanError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            bean.remove("phone", "home"),
            Err(BeanError::UnsupportedOperation { .. })
        ));
        assert!(bean.stored_values().is_none());
    }

    #[test]
    fn adapter_schema() {
        let bean = wrapped();
        let class = bean.dyna_class();
        assert_eq!(class.name(), "Person");
        assert!(class.is_restricted());
        assert_eq!(
            bean.property("tags").map(|p| p.element_type()),
            Some(ValueType::Str)
        );
        assert!(bean.property_names().iter().any(|name| name == "id"));
        assert!(bean.is_readable("id"));
        assert!(!bean.is_writeable("id"));

        let fresh = bean.instantiate().unwrap();
        let DynaBean::Wrap(fresh) = fresh else {
            panic!("expected an adapter");
        };
        assert_eq!(fresh.get("name"), Ok(Value::Null));
    }

    #[test]
    fn fixed_schema_instances() {
        let class = Rc::new(DynaClass::with_properties(
            "Row",
            [DynaProperty::new("n", ValueType::Primitive(Primitive::I32))],
        ));
        let mut row = class.new_instance();
        assert!(row.is_writeable("n"));
        assert!(!row.is_readable("x"));
        row.set("n", Value::I32(1)).unwrap();

        let mut other = row.instantiate().unwrap();
        assert_eq!(other.get("n"), Ok(Value::I32(0)));
        assert!(Rc::ptr_eq(other.dyna_class(), row.dyna_class()));
        assert_eq!(row.size("n"), Ok(0));
    }

    #[test]
    fn lazy_through_enum() {
        let mut bean = DynaBean::from(LazyDynaBean::new());
        bean.set_indexed("list", 0, "x".into()).unwrap();
        assert_eq!(bean.get_indexed("list", 0), Ok("x".into()));
        assert_eq!(bean.size("list"), Ok(1));

        bean.set_indexed("list", 5, "y".into()).unwrap();
        assert_eq!(bean.size("list"), Ok(6));
        assert_eq!(bean.get_indexed("list", 3), Ok(Value::Null));
        assert_eq!(bean.get_indexed("list", 5), Ok("y".into()));

        assert_eq!(bean.contains("attrs", "k"), Ok(false));
        bean.dyna_class().set_restricted(true);
        assert!(matches!(
            bean.dyna_class().add("new"),
            Err(BeanError::RestrictedSchemaViolation { .. })
        ));
    }
}
