use alloc::rc::Rc;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use vc_utils::hash::HashMap;

use crate::BeanError;
use crate::convert::{
    ArrayConverter, BigIntConverter, BooleanConverter, CharConverter, ConversionPolicy, ConvertConfig,
    Converter, ConverterEntry, NumberConverter, PathConverter, StringConverter, TemporalConverter,
    UrlConverter,
};
use crate::value::{Primitive, TypedArray, Value, ValueType};

fn scalar_converter(kind: Primitive) -> Arc<dyn Converter> {
    match kind {
        Primitive::Bool => Arc::new(BooleanConverter),
        Primitive::Char => Arc::new(CharConverter),
        kind => Arc::new(NumberConverter::new(kind)),
    }
}

// -----------------------------------------------------------------------------
// ConvertRegistry

/// Maps destination types to converters.
///
/// A registry built with [`new`](Self::new) holds an entry for every
/// scalar type, its `Option<_>` form, and arrays of each. Types without
/// an entry are only assigned values they already accept, and strings
/// pass through unchanged.
///
/// # Examples
///
/// ```
/// use vc_beans::convert::{ConvertConfig, ConvertRegistry};
/// use vc_beans::value::{Primitive, Value, ValueType};
///
/// let i32_ty = ValueType::Primitive(Primitive::I32);
///
/// let lenient = ConvertRegistry::new();
/// assert_eq!(lenient.convert_str("123", &i32_ty).unwrap(), Value::I32(123));
/// assert_eq!(lenient.convert(&Value::Null, &i32_ty).unwrap(), Value::I32(0));
///
/// let strict = ConvertRegistry::with_config(ConvertConfig::strict());
/// assert!(strict.convert(&Value::Null, &i32_ty).is_err());
/// ```
#[derive(Clone)]
pub struct ConvertRegistry {
    entries: HashMap<ValueType, ConverterEntry>,
}

impl Default for ConvertRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvertRegistry {
    /// Creates a lenient registry with the default converters.
    #[inline]
    pub fn new() -> Self {
        Self::with_config(ConvertConfig::default())
    }

    /// Creates a registry with the default converters set up per `config`.
    pub fn with_config(config: ConvertConfig) -> Self {
        let mut registry = Self::empty();
        registry.register_defaults(config);
        registry
    }

    /// Creates a registry without converters.
    #[inline]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::default(),
        }
    }

    /// Registers the default converters, replacing existing entries for
    /// the same types.
    pub fn register_defaults(&mut self, config: ConvertConfig) {
        let lenient = config.policy == ConversionPolicy::Lenient;
        let mut put = |ty: ValueType, converter: Arc<dyn Converter>, default: Value| {
            let entry = ConverterEntry::from_parts(converter, lenient.then_some(default));
            self.entries.insert(ty, entry);
        };

        for kind in Primitive::ALL {
            let converter = scalar_converter(kind);
            let boxed = if config.default_null { Value::Null } else { kind.zero() };
            put(ValueType::Boxed(kind), Arc::clone(&converter), boxed);
            put(ValueType::Primitive(kind), converter, kind.zero());
        }

        let others: [(ValueType, Arc<dyn Converter>); 7] = [
            (ValueType::BigInt, Arc::new(BigIntConverter)),
            (ValueType::Str, Arc::new(StringConverter)),
            (ValueType::Date, Arc::new(TemporalConverter::date())),
            (ValueType::Time, Arc::new(TemporalConverter::time())),
            (ValueType::DateTime, Arc::new(TemporalConverter::date_time())),
            (ValueType::Url, Arc::new(UrlConverter)),
            (ValueType::Path, Arc::new(PathConverter)),
        ];
        let mut components: Vec<ValueType> = Primitive::ALL
            .into_iter()
            .flat_map(|kind| [ValueType::Primitive(kind), ValueType::Boxed(kind)])
            .collect();
        for (ty, converter) in others {
            components.push(ty.clone());
            put(ty, converter, Value::Null);
        }

        let arrays: Arc<dyn Converter> = Arc::new(ArrayConverter);
        for component in components {
            let empty = TypedArray::filled(component.clone(), config.default_array_size);
            let default = Value::Array(Rc::new(RefCell::new(empty)));
            put(ValueType::array_of(component), Arc::clone(&arrays), default);
        }
    }

    /// Registers `converter` for `ty` with the policy of the defaults:
    /// a lenient entry falls back to a default instance of `ty`.
    ///
    /// Returns the replaced entry.
    pub fn register(&mut self, ty: ValueType, converter: impl Converter) -> Option<ConverterEntry> {
        let strict = self.entries.get(&ty).is_some_and(ConverterEntry::is_strict);
        let entry = if strict {
            ConverterEntry::strict(converter)
        } else {
            let default = ty.zero_value();
            ConverterEntry::lenient(converter, default)
        };
        self.entries.insert(ty, entry)
    }

    /// Registers `converter` for `ty`, failing on absent or unparsable input.
    pub fn register_strict(&mut self, ty: ValueType, converter: impl Converter) -> Option<ConverterEntry> {
        self.entries.insert(ty, ConverterEntry::strict(converter))
    }

    /// Registers a prepared entry.
    #[inline]
    pub fn register_entry(&mut self, ty: ValueType, entry: ConverterEntry) -> Option<ConverterEntry> {
        self.entries.insert(ty, entry)
    }

    #[inline]
    pub fn deregister(&mut self, ty: &ValueType) -> Option<ConverterEntry> {
        self.entries.remove(ty)
    }

    /// Removes every entry.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn lookup(&self, ty: &ValueType) -> Option<&ConverterEntry> {
        self.entries.get(ty)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sets the value the entry for `ty` falls back to, making it lenient.
    ///
    /// Returns `false` if no entry is registered for `ty`.
    pub fn set_default_value(&mut self, ty: &ValueType, default: Value) -> bool {
        match self.entries.get_mut(ty) {
            Some(entry) => {
                entry.set_default_value(default);
                true
            }
            None => false,
        }
    }

    /// Renders `value` as a string.
    ///
    /// Lists and arrays render their first element; `null` and empty
    /// sequences render as `None`.
    pub fn convert_to_string(&self, value: &Value) -> Result<Option<String>, BeanError> {
        let first = match value {
            Value::Null => return Ok(None),
            Value::List(list) => list.borrow().first().cloned(),
            Value::Array(array) => array.borrow().get(0).cloned(),
            other => {
                let text = self.convert(other, &ValueType::Str)?;
                return Ok(text.into_string());
            }
        };
        match first {
            Some(item) => self.convert_to_string(&item),
            None => Ok(None),
        }
    }

    /// Converts `text` to `ty`; types without a converter receive `text`
    /// unchanged.
    pub fn convert_str(&self, text: &str, ty: &ValueType) -> Result<Value, BeanError> {
        let value = Value::from(text);
        match self.entries.get(ty) {
            Some(entry) => entry.apply(&value, ty, self),
            None => Ok(value),
        }
    }

    /// Converts every element of `texts` to the component type of `ty`
    /// (or `ty` itself if it is not an array type).
    pub fn convert_strs<S: AsRef<str>>(&self, texts: &[S], ty: &ValueType) -> Result<Value, BeanError> {
        let component = ty.component().unwrap_or(ty);
        let items = texts
            .iter()
            .map(|text| self.convert_str(text.as_ref(), component))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::array(component.clone(), items))
    }

    /// Converts `value` to `ty`.
    ///
    /// A value `ty` already accepts is only widened. Otherwise the
    /// registered converter runs; without one the conversion fails.
    pub fn convert(&self, value: &Value, ty: &ValueType) -> Result<Value, BeanError> {
        if *ty == ValueType::Any {
            return Ok(value.clone());
        }
        if !value.is_null() && ty.accepts(value) {
            return ty.coerce("value", value.clone());
        }
        match self.entries.get(ty) {
            Some(entry) => entry.apply(value, ty, self),
            None => ty.coerce("value", value.clone()),
        }
    }
}

impl fmt::Debug for ConvertRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertRegistry")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests
