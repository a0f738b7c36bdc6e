use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::BeanError;
use crate::access::PropertyUtils;
use crate::dyna::{DynaClass, DynaProperty};
use crate::info::BeanRef;
use crate::value::{Value, ValueType};

// -----------------------------------------------------------------------------
// WrapDynaBean

/// Presents an ordinary bean as a dynamic container.
///
/// Every access goes through the bean's own accessors. The schema lists
/// the properties discovered on the bean's class and cannot be changed.
#[derive(Debug, Clone)]
pub struct WrapDynaBean {
    bean: BeanRef,
    class: Rc<DynaClass>,
    props: PropertyUtils,
}

impl WrapDynaBean {
    /// Wraps `bean`, using a private resolver.
    #[inline]
    pub fn new(bean: BeanRef) -> Self {
        Self::with_utils(bean, PropertyUtils::new())
    }

    /// Wraps `bean`, resolving its properties with `props`.
    pub fn with_utils(bean: BeanRef, props: PropertyUtils) -> Self {
        let bean_class = bean.borrow().bean_class();
        let descriptors = props.class_descriptors(bean_class);
        let properties = descriptors.iter().map(|descriptor| {
            let ty = descriptor.property_type().cloned().unwrap_or(ValueType::Any);
            match descriptor.indexed_type() {
                Some(element) if !ty.is_array() => {
                    DynaProperty::new(descriptor.name(), ty).with_content_type(element.clone())
                }
                _ => DynaProperty::new(descriptor.name(), ty),
            }
        });
        let class = DynaClass::with_properties(String::from(bean_class.name()), properties);
        class.set_restricted(true);
        Self {
            bean,
            class: Rc::new(class),
            props,
        }
    }

    /// The wrapped bean.
    #[inline]
    pub fn instance(&self) -> &BeanRef {
        &self.bean
    }

    #[inline]
    pub fn dyna_class(&self) -> &Rc<DynaClass> {
        &self.class
    }

    #[inline]
    fn target(&self) -> Value {
        Value::Bean(Rc::clone(&self.bean))
    }

    #[inline]
    pub fn property(&self, name: &str) -> Option<DynaProperty> {
        self.class.property(name)
    }

    /// Names of the readable properties of the wrapped bean.
    pub fn property_names(&self) -> Vec<String> {
        let class = self.bean.borrow().bean_class();
        self.props
            .class_descriptors(class)
            .iter()
            .filter(|descriptor| descriptor.read_method().is_some())
            .map(|descriptor| descriptor.name().into())
            .collect()
    }

    #[inline]
    pub fn is_readable(&self, name: &str) -> bool {
        self.props.is_readable(&self.target(), name)
    }

    #[inline]
    pub fn is_writeable(&self, name: &str) -> bool {
        self.props.is_writeable(&self.target(), name)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Result<Value, BeanError> {
        self.props.get_simple_property(&self.target(), name)
    }

    #[inline]
    pub fn set(&self, name: &str, value: Value) -> Result<(), BeanError> {
        self.props.set_simple_property(&self.target(), name, value)
    }

    #[inline]
    pub fn get_indexed(&self, name: &str, index: usize) -> Result<Value, BeanError> {
        self.props.get_indexed_property_at(&self.target(), name, index)
    }

    #[inline]
    pub fn set_indexed(&self, name: &str, index: usize, value: Value) -> Result<(), BeanError> {
        self.props
            .set_indexed_property_at(&self.target(), name, index, value)
    }

    #[inline]
    pub fn get_mapped(&self, name: &str, key: &str) -> Result<Value, BeanError> {
        self.props.get_mapped_property_key(&self.target(), name, key)
    }

    #[inline]
    pub fn set_mapped(&self, name: &str, key: &str, value: Value) -> Result<(), BeanError> {
        self.props
            .set_mapped_property_key(&self.target(), name, key, value)
    }

    fn unsupported(&self, operation: &str) -> BeanError {
        BeanError::UnsupportedOperation {
            operation: operation.into(),
            target: self.class.name().into(),
        }
    }

    /// Always fails: ordinary beans cannot enumerate mapped keys.
    pub fn contains(&self, _name: &str, _key: &str) -> Result<bool, BeanError> {
        Err(self.unsupported("contains"))
    }

    /// Always fails: ordinary beans cannot remove mapped keys.
    pub fn remove(&self, _name: &str, _key: &str) -> Result<(), BeanError> {
        Err(self.unsupported("remove"))
    }

    /// Wraps a new instance of the wrapped bean's class.
    pub fn instantiate(&self) -> Result<Self, BeanError> {
        let class = self.bean.borrow().bean_class();
        let bean = class.instantiate()?;
        Ok(Self::with_utils(bean, self.props.clone()))
    }
}
