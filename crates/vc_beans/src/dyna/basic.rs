use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;

use crate::BeanError;
use crate::dyna::{DynaClass, DynaProperty};
use crate::value::{Value, ValueMap};

// -----------------------------------------------------------------------------
// BasicDynaBean

/// A container whose properties are fixed by a shared [`DynaClass`].
#[derive(Debug, Clone)]
pub struct BasicDynaBean {
    class: Rc<DynaClass>,
    values: ValueMap,
}

impl BasicDynaBean {
    #[inline]
    pub fn new(class: Rc<DynaClass>) -> Self {
        Self {
            class,
            values: ValueMap::default(),
        }
    }

    #[inline]
    pub fn dyna_class(&self) -> &Rc<DynaClass> {
        &self.class
    }

    /// The values assigned so far.
    #[inline]
    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    fn declared(&self, name: &str) -> Result<DynaProperty, BeanError> {
        self.class
            .property(name)
            .ok_or_else(|| BeanError::unknown(name, self.class.name()))
    }

    /// Reads `name`; an unassigned primitive property reads as its zero value.
    pub fn get(&self, name: &str) -> Result<Value, BeanError> {
        let property = self.declared(name)?;
        Ok(match self.values.get(name) {
            Some(value) if !value.is_null() => value.clone(),
            _ => property.ty().zero_value(),
        })
    }

    pub fn set(&mut self, name: &str, value: Value) -> Result<(), BeanError> {
        let property = self.declared(name)?;
        let value = property.ty().coerce(name, value)?;
        self.values.insert(name.into(), value);
        Ok(())
    }

    fn collection(&self, name: &str, full: impl FnOnce() -> String) -> Result<Value, BeanError> {
        let value = self.get(name)?;
        if value.is_null() {
            return Err(BeanError::NullIntermediate {
                path: name.into(),
                full: full(),
            });
        }
        Ok(value)
    }

    pub fn get_indexed(&self, name: &str, index: usize) -> Result<Value, BeanError> {
        self.collection(name, || format!("{name}[{index}]"))?
            .index_get(name, index)
    }

    pub fn set_indexed(&mut self, name: &str, index: usize, value: Value) -> Result<(), BeanError> {
        let element = self.declared(name)?.element_type();
        self.collection(name, || format!("{name}[{index}]"))?
            .index_set(name, index, value, &element)
    }

    pub fn get_mapped(&self, name: &str, key: &str) -> Result<Value, BeanError> {
        self.collection(name, || format!("{name}({key})"))?
            .key_get(name, key)
    }

    pub fn set_mapped(&mut self, name: &str, key: &str, value: Value) -> Result<(), BeanError> {
        let element = self.declared(name)?.element_type();
        let value = element.coerce(name, value)?;
        self.collection(name, || format!("{name}({key})"))?
            .key_set(name, key, value)
    }

    pub fn contains(&self, name: &str, key: &str) -> Result<bool, BeanError> {
        self.collection(name, || format!("{name}({key})"))?
            .key_contains(name, key)
    }

    pub fn remove(&mut self, name: &str, key: &str) -> Result<(), BeanError> {
        self.collection(name, || format!("{name}({key})"))?
            .key_remove(name, key)
    }
}

// -----------------------------------------------------------------------------
// Tests
