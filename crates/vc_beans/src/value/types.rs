use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::BeanError;
use crate::dyna::{DynaBean, LazyDynaBean};
use crate::info::BeanClass;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Primitive

/// The non-nullable scalar kinds.
///
/// A property declared with a primitive type never holds [`Value::Null`],
/// it reads as [`Primitive::zero`] until assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl Primitive {
    /// Every primitive kind, in declaration order.
    pub const ALL: [Primitive; 8] = [
        Self::Bool,
        Self::Char,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::F32,
        Self::F64,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    #[inline]
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// The value a primitive slot holds before it is assigned.
    pub const fn zero(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Char => Value::Char('\0'),
            Self::I8 => Value::I8(0),
            Self::I16 => Value::I16(0),
            Self::I32 => Value::I32(0),
            Self::I64 => Value::I64(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
        }
    }

    /// Returns `true` if every value of `self` is exactly representable as `to`.
    pub const fn widens_to(self, to: Primitive) -> bool {
        use Primitive::*;
        matches!(
            (self, to),
            (I8, I16 | I32 | I64 | F32 | F64)
                | (I16, I32 | I64 | F32 | F64)
                | (I32, I64 | F64)
                | (F32, F64)
                | (Char, I32 | I64)
        )
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Converts `value` to the primitive kind `to` without losing information.
pub(crate) fn widen(value: &Value, to: Primitive) -> Option<Value> {
    use Primitive as P;
    use Value as V;

    Some(match (value, to) {
        (V::Bool(v), P::Bool) => V::Bool(*v),
        (V::Char(v), P::Char) => V::Char(*v),
        (V::Char(v), P::I32) => V::I32(u32::from(*v) as i32),
        (V::Char(v), P::I64) => V::I64(u32::from(*v).into()),
        (V::I8(v), P::I8) => V::I8(*v),
        (V::I8(v), P::I16) => V::I16((*v).into()),
        (V::I8(v), P::I32) => V::I32((*v).into()),
        (V::I8(v), P::I64) => V::I64((*v).into()),
        (V::I8(v), P::F32) => V::F32((*v).into()),
        (V::I8(v), P::F64) => V::F64((*v).into()),
        (V::I16(v), P::I16) => V::I16(*v),
        (V::I16(v), P::I32) => V::I32((*v).into()),
        (V::I16(v), P::I64) => V::I64((*v).into()),
        (V::I16(v), P::F32) => V::F32((*v).into()),
        (V::I16(v), P::F64) => V::F64((*v).into()),
        (V::I32(v), P::I32) => V::I32(*v),
        (V::I32(v), P::I64) => V::I64((*v).into()),
        (V::I32(v), P::F64) => V::F64((*v).into()),
        (V::I64(v), P::I64) => V::I64(*v),
        (V::F32(v), P::F32) => V::F32(*v),
        (V::F32(v), P::F64) => V::F64((*v).into()),
        (V::F64(v), P::F64) => V::F64(*v),
        _ => return None,
    })
}

fn widen_big(value: &Value) -> Option<Value> {
    Some(Value::I128(match value {
        Value::I8(v) => (*v).into(),
        Value::I16(v) => (*v).into(),
        Value::I32(v) => (*v).into(),
        Value::I64(v) => (*v).into(),
        Value::I128(v) => *v,
        _ => return None,
    }))
}

// -----------------------------------------------------------------------------
// ValueType

/// The declared type of a property slot.
///
/// `Primitive` slots reject [`Value::Null`]; `Boxed` slots hold the same
/// kinds but accept it. `Any` accepts every value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Any,
    Primitive(Primitive),
    Boxed(Primitive),
    BigInt,
    Str,
    Date,
    Time,
    DateTime,
    Url,
    Path,
    List,
    Map,
    Array(Box<ValueType>),
    Bean(&'static BeanClass),
    Dyna,
}

impl ValueType {
    #[inline]
    pub fn array_of(component: ValueType) -> Self {
        Self::Array(Box::new(component))
    }

    #[inline]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    #[inline]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Returns `true` for array and list types.
    #[inline]
    pub const fn is_indexed(&self) -> bool {
        matches!(self, Self::Array(_) | Self::List)
    }

    #[inline]
    pub const fn is_mapped(&self) -> bool {
        matches!(self, Self::Map)
    }

    /// The component type of an array type.
    #[inline]
    pub fn component(&self) -> Option<&ValueType> {
        match self {
            Self::Array(component) => Some(component),
            _ => None,
        }
    }

    /// The scalar kind of a primitive or boxed type.
    #[inline]
    pub const fn primitive(&self) -> Option<Primitive> {
        match self {
            Self::Primitive(p) | Self::Boxed(p) => Some(*p),
            _ => None,
        }
    }

    /// The value an unassigned slot of this type reads as.
    pub fn zero_value(&self) -> Value {
        match self {
            Self::Primitive(p) => p.zero(),
            _ => Value::Null,
        }
    }

    /// A fresh default instance of this type, or [`Value::Null`] when
    /// the type has no sensible default.
    pub fn default_instance(&self) -> Value {
        match self {
            Self::Primitive(p) => p.zero(),
            Self::Str => Value::Str(String::new()),
            Self::List => Value::list(Vec::new()),
            Self::Map => Value::map(Vec::<(String, Value)>::new()),
            Self::Array(component) => Value::array((**component).clone(), Vec::new()),
            Self::Bean(class) => class.instantiate().map(Value::Bean).unwrap_or_default(),
            Self::Dyna => Value::Dyna(DynaBean::Lazy(LazyDynaBean::new()).into_ref()),
            _ => Value::Null,
        }
    }

    /// Returns `true` if a slot of type `self` can hold every value of type `other`.
    pub fn is_assignable_from(&self, other: &ValueType) -> bool {
        match (self, other) {
            (Self::Any, _) => true,
            (Self::Array(a), Self::Array(b)) => a.is_assignable_from(b),
            (Self::Bean(a), Self::Bean(b)) => b.is_subclass_of(a),
            (a, b) => a == b,
        }
    }

    /// Returns `true` if `value` can be stored in a slot of this type,
    /// possibly after a lossless widening.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => !self.is_primitive(),
            (Self::Any, _) => true,
            (Self::Primitive(p) | Self::Boxed(p), v) => v
                .primitive_kind()
                .is_some_and(|kind| kind == *p || kind.widens_to(*p)),
            (Self::BigInt, v) => {
                matches!(v, Value::I128(_)) || v.primitive_kind().is_some_and(Primitive::is_integer)
            }
            (Self::Str, Value::Str(_))
            | (Self::Date, Value::Date(_))
            | (Self::Time, Value::Time(_))
            | (Self::DateTime, Value::DateTime(_))
            | (Self::Url, Value::Url(_))
            | (Self::Path, Value::Path(_))
            | (Self::List, Value::List(_))
            | (Self::Map, Value::Map(_))
            | (Self::Dyna, Value::Dyna(_)) => true,
            (Self::Array(component), Value::Array(array)) => {
                component.is_assignable_from(array.borrow().component())
            }
            (Self::Bean(class), Value::Bean(bean)) => bean.borrow().bean_class().is_subclass_of(class),
            _ => false,
        }
    }

    /// Checks `value` against this type before it is stored in `property`.
    ///
    /// Widens numeric values to the declared kind.
    pub fn coerce(&self, property: &str, value: Value) -> Result<Value, BeanError> {
        if value.is_null() {
            return if self.is_primitive() {
                Err(BeanError::NullForPrimitive {
                    property: property.into(),
                    ty: self.to_string(),
                })
            } else {
                Ok(Value::Null)
            };
        }

        let converted = match self {
            Self::Primitive(p) | Self::Boxed(p) => widen(&value, *p),
            Self::BigInt => widen_big(&value),
            _ if self.accepts(&value) => return Ok(value),
            _ => None,
        };

        converted.ok_or_else(|| {
            BeanError::conversion(
                value.type_name(),
                self.to_string(),
                format!("property `{property}` does not accept this value"),
            )
        })
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.pad("any"),
            Self::Primitive(p) => f.pad(p.name()),
            Self::Boxed(p) => write!(f, "Option<{}>", p.name()),
            Self::BigInt => f.pad("i128"),
            Self::Str => f.pad("String"),
            Self::Date => f.pad("NaiveDate"),
            Self::Time => f.pad("NaiveTime"),
            Self::DateTime => f.pad("NaiveDateTime"),
            Self::Url => f.pad("Url"),
            Self::Path => f.pad("PathBuf"),
            Self::List => f.pad("List"),
            Self::Map => f.pad("Map"),
            Self::Array(component) => write!(f, "[{component}]"),
            Self::Bean(class) => f.pad(class.name()),
            Self::Dyna => f.pad("DynaBean"),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Primitive, ValueType};
    use crate::BeanError;
    use crate::value::Value;

    #[test]
    fn widening_is_lossless_only() {
        let long = ValueType::Primitive(Primitive::I64);
        assert_eq!(long.coerce("n", Value::I32(7)), Ok(Value::I64(7)));

        let int = ValueType::Primitive(Primitive::I32);
        assert!(matches!(
            int.coerce("n", Value::I64(7)),
            Err(BeanError::ConversionFailure { .. })
        ));
        assert!(matches!(
            int.coerce("n", Value::Str("7".into())),
            Err(BeanError::ConversionFailure { .. })
        ));

        let float = ValueType::Boxed(Primitive::F64);
        assert_eq!(float.coerce("f", Value::F32(0.5)), Ok(Value::F64(0.5)));
        assert_eq!(ValueType::BigInt.coerce("b", Value::I8(-3)), Ok(Value::I128(-3)));
    }

    #[test]
    fn null_into_primitive_slot() {
        let int = ValueType::Primitive(Primitive::I32);
        assert!(matches!(
            int.coerce("age", Value::Null),
            Err(BeanError::NullForPrimitive { .. })
        ));

        let boxed = ValueType::Boxed(Primitive::I32);
        assert_eq!(boxed.coerce("age", Value::Null), Ok(Value::Null));
    }

    #[test]
    fn array_component_assignability() {
        let strings = ValueType::array_of(ValueType::Str);
        let anys = ValueType::array_of(ValueType::Any);

        assert!(anys.is_assignable_from(&strings));
        assert!(!strings.is_assignable_from(&anys));
        assert!(strings.accepts(&Value::array(ValueType::Str, ["a".into()])));
        assert!(!strings.accepts(&Value::array(ValueType::Any, [])));
    }

    #[test]
    fn display_names() {
        assert_eq!(ValueType::Primitive(Primitive::I32).to_string(), "i32");
        assert_eq!(ValueType::Boxed(Primitive::Bool).to_string(), "Option<bool>");
        assert_eq!(ValueType::array_of(ValueType::Str).to_string(), "[String]");
    }
}
