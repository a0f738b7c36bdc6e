use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use log::debug;

use crate::BeanError;
use crate::access::{PropertyUtils, SegmentKind};
use crate::convert::ConvertRegistry;
use crate::value::{Value, ValueMap, ValueType};

/// `Ok(())` for errors meaning the property is absent or inaccessible.
fn skip_missing(name: &str, result: Result<(), BeanError>) -> Result<(), BeanError> {
    match result {
        Err(err) if err.is_missing_property() => {
            debug!("skipping `{name}`: {err}");
            Ok(())
        }
        other => other,
    }
}

fn sorted_entries(map: &ValueMap) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

// -----------------------------------------------------------------------------
// BeanUtils

/// Copies and populates properties, converting values to the
/// destination's declared types.
///
/// Combines a [`PropertyUtils`] for access with a [`ConvertRegistry`]
/// for conversions. String input is the common case: a
/// [`describe`](Self::describe) snapshot holds only strings and string
/// arrays and can be fed back through [`populate`](Self::populate).
///
/// # Examples
///
/// ```
/// use vc_beans::dyna::{DynaBean, LazyDynaBean};
/// use vc_beans::utils::BeanUtils;
/// use vc_beans::value::{Primitive, Value, ValueMap, ValueType};
///
/// let mut row = LazyDynaBean::new();
/// row.declare("count", ValueType::Primitive(Primitive::I32)).unwrap();
/// let row = Value::dyna(DynaBean::Lazy(row));
///
/// let utils = BeanUtils::new();
/// let mut input = ValueMap::default();
/// input.insert("count".into(), "12".into());
/// utils.populate(&row, &input).unwrap();
///
/// assert_eq!(utils.props().get_property(&row, "count").unwrap(), Value::I32(12));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BeanUtils {
    props: PropertyUtils,
    convert: ConvertRegistry,
}

impl BeanUtils {
    /// Creates an instance with a private descriptor cache and a lenient
    /// registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_parts(props: PropertyUtils, convert: ConvertRegistry) -> Self {
        Self { props, convert }
    }

    #[inline]
    pub fn props(&self) -> &PropertyUtils {
        &self.props
    }

    #[inline]
    pub fn convert(&self) -> &ConvertRegistry {
        &self.convert
    }

    #[inline]
    pub fn convert_mut(&mut self) -> &mut ConvertRegistry {
        &mut self.convert
    }

    // -------------------------------------------------------------------------
    // Copy

    /// Copies every readable property of `orig` to the same-named
    /// property of `dest`, converting values to the destination types.
    ///
    /// Properties `dest` lacks or cannot write are skipped; conversion
    /// failures are not.
    pub fn copy_properties(&self, dest: &Value, orig: &Value) -> Result<(), BeanError> {
        if dest.is_null() || orig.is_null() {
            return Err(BeanError::NullTarget);
        }
        let described = self.props.describe(orig)?;
        for (name, value) in sorted_entries(&described) {
            if !self.props.is_writeable(dest, name) {
                debug!("skipping `{name}`: not writeable");
                continue;
            }
            skip_missing(name, self.copy_property(dest, name, value.clone()))?;
        }
        Ok(())
    }

    /// Writes `value` to the property at `path`, converted to its
    /// declared type.
    pub fn copy_property(&self, dest: &Value, path: &str, value: Value) -> Result<(), BeanError> {
        let (parent, segment) = self.props.resolve_parent(dest, path)?;
        let value = match self.target_type(dest, &parent, path)? {
            Some(ty) => self.convert_to(&value, &ty)?,
            None => value,
        };
        self.props.set_segment(&parent, &segment, value)
    }

    /// Converts `value` for a slot of type `ty`. Null is kept for slots
    /// that can hold it.
    fn convert_to(&self, value: &Value, ty: &ValueType) -> Result<Value, BeanError> {
        if value.is_null() && !ty.is_primitive() {
            return Ok(Value::Null);
        }
        self.convert.convert(value, ty)
    }

    /// The declared type of `path`, or `None` when values are stored
    /// as given.
    fn target_type(&self, bean: &Value, parent: &Value, path: &str) -> Result<Option<ValueType>, BeanError> {
        if matches!(parent, Value::Map(_)) {
            return Ok(None);
        }
        Ok(self.props.property_type(bean, path)?.filter(|ty| *ty != ValueType::Any))
    }

    // -------------------------------------------------------------------------
    // Populate

    /// Sets every entry of `properties` through [`set_property`](Self::set_property).
    ///
    /// Entries naming absent or read-only properties are skipped.
    pub fn populate(&self, bean: &Value, properties: &ValueMap) -> Result<(), BeanError> {
        if bean.is_null() {
            return Err(BeanError::NullTarget);
        }
        for (name, value) in sorted_entries(properties) {
            skip_missing(name, self.set_property(bean, name, value.clone()))?;
        }
        Ok(())
    }

    /// Writes `value` to the property at `path`, converting strings and
    /// string arrays.
    ///
    /// A single string written to an array property becomes a
    /// one-element array. A string array written to anything else,
    /// including one element of an indexed property, contributes its
    /// first element.
    pub fn set_property(&self, bean: &Value, path: &str, value: Value) -> Result<(), BeanError> {
        let (parent, segment) = self.props.resolve_parent(bean, path)?;
        let Some(ty) = self.target_type(bean, &parent, path)? else {
            return self.props.set_segment(&parent, &segment, value);
        };

        let whole_array = ty.is_array() && matches!(segment.kind, SegmentKind::Simple);
        let strings = value.string_items();
        let converted = match (&value, strings) {
            (Value::Str(text), _) if whole_array => self.convert.convert_strs(&[text.as_str()], &ty)?,
            (Value::Str(text), _) => self.convert.convert_str(text, &ty)?,
            (_, Some(items)) if whole_array => self.convert.convert(&Value::list(items), &ty)?,
            (_, Some(items)) => {
                let first = items.into_iter().next().unwrap_or_default();
                self.convert.convert(&first, &ty)?
            }
            (value, None) => self.convert_to(value, &ty)?,
        };
        self.props.set_segment(&parent, &segment, converted)
    }

    // -------------------------------------------------------------------------
    // Read as strings

    /// Every readable property of `bean`, rendered as a string or, for
    /// lists and arrays, a string array.
    pub fn describe(&self, bean: &Value) -> Result<ValueMap, BeanError> {
        let described = self.props.describe(bean)?;
        let mut out = ValueMap::default();
        for (name, value) in described {
            let rendered = match &value {
                Value::List(_) | Value::Array(_) => self.strings(&value)?,
                _ => self.string(&value)?,
            };
            out.insert(name, rendered);
        }
        Ok(out)
    }

    fn string(&self, value: &Value) -> Result<Value, BeanError> {
        Ok(self.convert.convert_to_string(value)?.into())
    }

    fn strings(&self, value: &Value) -> Result<Value, BeanError> {
        let items: Vec<Value> = match value {
            Value::Null => return Ok(Value::Null),
            Value::List(list) => list.borrow().clone(),
            Value::Array(array) => array.borrow().items().to_vec(),
            other => vec![other.clone()],
        };
        let items = items
            .iter()
            .map(|item| self.string(item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::array(ValueType::Str, items))
    }

    /// The property at `path` as a string.
    pub fn get_property(&self, bean: &Value, path: &str) -> Result<Option<String>, BeanError> {
        let value = self.props.get_property(bean, path)?;
        self.convert.convert_to_string(&value)
    }

    /// The property `name` as a string array; `null` stays `null`.
    pub fn get_array_property(&self, bean: &Value, name: &str) -> Result<Value, BeanError> {
        let value = self.props.get_property(bean, name)?;
        self.strings(&value)
    }

    /// An indexed property given as `name[index]`, as a string.
    pub fn get_indexed_property(&self, bean: &Value, expr: &str) -> Result<Option<String>, BeanError> {
        let value = self.props.get_indexed_property(bean, expr)?;
        self.convert.convert_to_string(&value)
    }

    /// A mapped property given as `name(key)`, as a string.
    pub fn get_mapped_property(&self, bean: &Value, expr: &str) -> Result<Option<String>, BeanError> {
        let value = self.props.get_mapped_property(bean, expr)?;
        self.convert.convert_to_string(&value)
    }

    // -------------------------------------------------------------------------
    // Clone

    /// A new instance of `bean`'s class holding copies of its properties.
    ///
    /// Nested beans and containers are shared, not cloned.
    pub fn clone_bean(&self, bean: &Value) -> Result<Value, BeanError> {
        let fresh = match bean {
            Value::Null => return Err(BeanError::NullTarget),
            Value::Map(map) => return Ok(Value::map(map.borrow().clone())),
            Value::Bean(inner) => Value::Bean(inner.borrow().bean_class().instantiate()?),
            Value::Dyna(inner) => Value::dyna(inner.borrow().instantiate()?),
            other => {
                return Err(BeanError::UnsupportedOperation {
                    operation: "clone_bean".into(),
                    target: other.type_name(),
                });
            }
        };
        self.copy_properties(&fresh, bean)?;
        Ok(fresh)
    }
}

// -----------------------------------------------------------------------------
// Tests
