use alloc::format;
use alloc::string::{String, ToString};

use crate::BeanError;
use crate::descriptor::DescriptorCache;
use crate::info::{BeanClass, Method, capitalize};
use crate::value::ValueType;

// -----------------------------------------------------------------------------
// MappedPropertyDescriptor

/// The keyed accessors `getX(key)` / `setX(key, value)` of a property.
///
/// At least one side is present. When both are, the getter's return
/// type equals the setter's value parameter type.
#[derive(Debug, Clone)]
pub struct MappedPropertyDescriptor {
    name: String,
    value_type: ValueType,
    read: Option<Method>,
    write: Option<Method>,
}

impl MappedPropertyDescriptor {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type of the values stored under each key.
    #[inline]
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    #[inline]
    pub fn read_method(&self) -> Option<&Method> {
        self.read.as_ref()
    }

    #[inline]
    pub fn write_method(&self) -> Option<&Method> {
        self.write.as_ref()
    }

    /// Looks up the keyed accessors of `property` on `class`.
    ///
    /// Returns `Ok(None)` if neither accessor exists, and
    /// [`BeanError::DescriptorMismatch`] if both exist with different
    /// value types.
    pub(crate) fn discover(
        class: &'static BeanClass,
        property: &str,
        cache: &DescriptorCache,
    ) -> Result<Option<Self>, BeanError> {
        if property.is_empty() {
            return Ok(None);
        }
        let capitalized = capitalize(property);

        let read = cache
            .method(class, &format!("get{capitalized}"), 1, Some(&[ValueType::Str]))
            .filter(|read| read.return_type().is_some());
        let write = cache
            .method(class, &format!("set{capitalized}"), 2, Some(&[ValueType::Str]))
            .filter(|write| write.return_type().is_none());

        let value_type = match (&read, &write) {
            (None, None) => return Ok(None),
            (Some(read), Some(write)) => {
                let read_type = read.return_type();
                let write_type = write.params().get(1);
                if read_type != write_type {
                    let name = |ty: Option<&ValueType>| ty.map_or_else(|| "()".into(), ToString::to_string);
                    return Err(BeanError::DescriptorMismatch {
                        class: class.name().into(),
                        property: property.into(),
                        read: name(read_type),
                        write: name(write_type),
                    });
                }
                read_type.cloned()
            }
            (Some(read), None) => read.return_type().cloned(),
            (None, Some(write)) => write.params().get(1).cloned(),
        };

        Ok(Some(Self {
            name: property.into(),
            value_type: value_type.unwrap_or(ValueType::Any),
            read,
            write,
        }))
    }
}
