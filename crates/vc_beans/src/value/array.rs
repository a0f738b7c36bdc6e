use alloc::vec::Vec;

use crate::value::{Value, ValueType};

// -----------------------------------------------------------------------------
// TypedArray

/// A fixed-length sequence whose elements share a component type.
///
/// Unlike a list, an array never changes length in place; growing one
/// produces a new array, see [`TypedArray::grown`].
#[derive(Debug, Clone, PartialEq)]
pub struct TypedArray {
    component: ValueType,
    items: Vec<Value>,
}

impl TypedArray {
    #[inline]
    pub fn new(component: ValueType, items: Vec<Value>) -> Self {
        Self { component, items }
    }

    /// Creates an array of `len` zero values.
    pub fn filled(component: ValueType, len: usize) -> Self {
        let items = (0..len).map(|_| component.zero_value()).collect();
        Self { component, items }
    }

    #[inline]
    pub fn component(&self) -> &ValueType {
        &self.component
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.items.get_mut(index)
    }

    #[inline]
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    #[inline]
    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    /// Returns a copy of length `len` (never shorter than `self`).
    ///
    /// New slots hold a default instance of the component type.
    pub fn grown(&self, len: usize) -> Self {
        let mut items = Vec::with_capacity(len.max(self.items.len()));
        items.extend_from_slice(&self.items);
        while items.len() < len {
            items.push(self.component.default_instance());
        }
        Self {
            component: self.component.clone(),
            items,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypedArray;
    use crate::value::{Primitive, Value, ValueType};

    #[test]
    fn grown_keeps_elements_and_fills_defaults() {
        let ints = TypedArray::new(ValueType::Primitive(Primitive::I32), vec![Value::I32(4)]);
        let grown = ints.grown(3);

        assert_eq!(grown.items(), &[Value::I32(4), Value::I32(0), Value::I32(0)]);
        assert_eq!(ints.len(), 1);

        let strings = TypedArray::new(ValueType::Str, vec![]).grown(1);
        assert_eq!(strings.get(0), Some(&Value::Str("".into())));

        let urls = TypedArray::new(ValueType::Url, vec![]).grown(2);
        assert!(urls.items().iter().all(Value::is_null));
    }
}
