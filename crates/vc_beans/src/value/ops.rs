use crate::BeanError;
use crate::value::{Value, ValueType};

// -----------------------------------------------------------------------------
// Indexed

impl Value {
    /// Reads element `index` of a list or array held by `property`.
    pub(crate) fn index_get(&self, property: &str, index: usize) -> Result<Value, BeanError> {
        let (item, len) = match self {
            Self::List(list) => {
                let list = list.borrow();
                (list.get(index).cloned(), list.len())
            }
            Self::Array(array) => {
                let array = array.borrow();
                (array.get(index).cloned(), array.len())
            }
            _ => return Err(BeanError::not_indexed(property)),
        };
        item.ok_or_else(|| BeanError::IndexOutOfRange {
            property: property.into(),
            index,
            len,
        })
    }

    /// Replaces element `index` of a list or array held by `property`.
    ///
    /// Array elements are checked against the array's component type,
    /// list elements against `element`.
    pub(crate) fn index_set(
        &self,
        property: &str,
        index: usize,
        value: Value,
        element: &ValueType,
    ) -> Result<(), BeanError> {
        let out_of_range = |len| BeanError::IndexOutOfRange {
            property: property.into(),
            index,
            len,
        };
        match self {
            Self::List(list) => {
                let value = element.coerce(property, value)?;
                let mut list = list.borrow_mut();
                let len = list.len();
                *list.get_mut(index).ok_or_else(|| out_of_range(len))? = value;
                Ok(())
            }
            Self::Array(array) => {
                let component = array.borrow().component().clone();
                let value = component.coerce(property, value)?;
                let mut array = array.borrow_mut();
                let len = array.len();
                *array.get_mut(index).ok_or_else(|| out_of_range(len))? = value;
                Ok(())
            }
            _ => Err(BeanError::not_indexed(property)),
        }
    }
}

// -----------------------------------------------------------------------------
// Mapped

impl Value {
    /// Reads `key` of a map or map-backed bean held by `property`.
    ///
    /// An absent key reads as [`Value::Null`].
    pub(crate) fn key_get(&self, property: &str, key: &str) -> Result<Value, BeanError> {
        match self {
            Self::Map(map) => Ok(map.borrow().get(key).cloned().unwrap_or_default()),
            Self::Bean(bean) => bean
                .borrow()
                .map_storage()
                .map(|map| map.get(key).cloned().unwrap_or_default())
                .ok_or_else(|| BeanError::not_mapped(property)),
            _ => Err(BeanError::not_mapped(property)),
        }
    }

    /// Stores `value` under `key` of a map or map-backed bean held by `property`.
    pub(crate) fn key_set(&self, property: &str, key: &str, value: Value) -> Result<(), BeanError> {
        match self {
            Self::Map(map) => {
                map.borrow_mut().insert(key.into(), value);
                Ok(())
            }
            Self::Bean(bean) => match bean.borrow_mut().map_storage_mut() {
                Some(map) => {
                    map.insert(key.into(), value);
                    Ok(())
                }
                None => Err(BeanError::not_mapped(property)),
            },
            _ => Err(BeanError::not_mapped(property)),
        }
    }

    pub(crate) fn key_contains(&self, property: &str, key: &str) -> Result<bool, BeanError> {
        match self {
            Self::Map(map) => Ok(map.borrow().contains_key(key)),
            Self::Bean(bean) => bean
                .borrow()
                .map_storage()
                .map(|map| map.contains_key(key))
                .ok_or_else(|| BeanError::not_mapped(property)),
            _ => Err(BeanError::not_mapped(property)),
        }
    }

    pub(crate) fn key_remove(&self, property: &str, key: &str) -> Result<(), BeanError> {
        match self {
            Self::Map(map) => {
                map.borrow_mut().remove(key);
                Ok(())
            }
            Self::Bean(bean) => match bean.borrow_mut().map_storage_mut() {
                Some(map) => {
                    map.remove(key);
                    Ok(())
                }
                None => Err(BeanError::not_mapped(property)),
            },
            _ => Err(BeanError::not_mapped(property)),
        }
    }

    /// Returns `true` for maps and map-backed beans.
    pub(crate) fn is_keyed(&self) -> bool {
        match self {
            Self::Map(_) => true,
            Self::Bean(bean) => bean.borrow().map_storage().is_some(),
            _ => false,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::BeanError;
    use crate::value::{Primitive, Value, ValueType};

    #[test]
    fn index_bounds() {
        let list = Value::list([Value::I32(1)]);
        assert_eq!(list.index_get("xs", 0), Ok(Value::I32(1)));
        assert_eq!(
            list.index_get("xs", 1),
            Err(BeanError::IndexOutOfRange {
                property: "xs".into(),
                index: 1,
                len: 1
            })
        );
        assert!(matches!(
            Value::I32(3).index_get("n", 0),
            Err(BeanError::NotIndexed { .. })
        ));
    }

    #[test]
    fn array_elements_are_type_checked() {
        let ints = Value::array(ValueType::Primitive(Primitive::I64), [Value::I64(0)]);
        ints.index_set("ns", 0, Value::I8(5), &ValueType::Any).unwrap();
        assert_eq!(ints.index_get("ns", 0), Ok(Value::I64(5)));

        let err = ints.index_set("ns", 0, "x".into(), &ValueType::Any);
        assert!(matches!(err, Err(BeanError::ConversionFailure { .. })));
        let err = ints.index_set("ns", 0, Value::Null, &ValueType::Any);
        assert!(matches!(err, Err(BeanError::NullForPrimitive { .. })));
    }

    #[test]
    fn keyed_access() {
        let map = Value::map([("a", Value::I8(1))]);
        assert_eq!(map.key_get("m", "a"), Ok(Value::I8(1)));
        assert_eq!(map.key_get("m", "missing"), Ok(Value::Null));

        map.key_set("m", "b", "x".into()).unwrap();
        assert_eq!(map.key_contains("m", "b"), Ok(true));
        map.key_remove("m", "b").unwrap();
        assert_eq!(map.key_contains("m", "b"), Ok(false));

        assert!(matches!(
            Value::list([]).key_get("l", "a"),
            Err(BeanError::NotMapped { .. })
        ));
    }
}
