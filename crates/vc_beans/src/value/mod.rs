//! Dynamically typed property values.
//!
//! [`Value`] is what flows through every accessor: scalars are held
//! inline, containers and beans are shared handles. Cloning a
//! `Value::List` clones the handle, not the list, so writes through a
//! nested path are visible to every holder of the same handle.
//!
//! [`ValueType`] describes what a property slot may hold and performs
//! the assignment checks, see [`ValueType::coerce`].

// -----------------------------------------------------------------------------
// Modules

mod array;
mod ops;
mod serde;
mod types;

// -----------------------------------------------------------------------------
// Exports

pub use array::TypedArray;
pub use types::{Primitive, ValueType};

pub(crate) use types::widen;

// -----------------------------------------------------------------------------
// Value

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::Any;
use core::cell::RefCell;
use core::fmt;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use url::Url;
use vc_utils::hash::HashMap;

use crate::BeanError;
use crate::dyna::{DynaBean, DynaRef};
use crate::info::{Bean, BeanRef};

/// String-keyed storage used by map values and map-backed beans.
pub type ValueMap = HashMap<String, Value>;

/// ISO 8601 layout used to render date-times.
pub(crate) const ISO_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Shared handle to a growable list.
pub type ListRef = Rc<RefCell<Vec<Value>>>;

/// Shared handle to a typed, fixed-length array.
pub type ArrayRef = Rc<RefCell<TypedArray>>;

/// Shared handle to a string-keyed map.
pub type MapRef = Rc<RefCell<ValueMap>>;

/// A property value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    F32(f32),
    F64(f64),
    Str(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Url(Url),
    Path(PathBuf),
    List(ListRef),
    Array(ArrayRef),
    Map(MapRef),
    Bean(BeanRef),
    Dyna(DynaRef),
}

impl Value {
    /// Creates a new list value.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::List(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    /// Creates a new map value.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let map: ValueMap = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::Map(Rc::new(RefCell::new(map)))
    }

    /// Creates a new array value.
    ///
    /// Elements are stored as given, callers are expected to pass values
    /// the component type accepts.
    pub fn array(component: ValueType, items: impl IntoIterator<Item = Value>) -> Self {
        let array = TypedArray::new(component, items.into_iter().collect());
        Self::Array(Rc::new(RefCell::new(array)))
    }

    /// Moves `bean` behind a shared handle.
    pub fn bean<T: Bean>(bean: T) -> Self {
        Self::Bean(Rc::new(RefCell::new(bean)))
    }

    /// Moves a dynamic container behind a shared handle.
    pub fn dyna(bean: DynaBean) -> Self {
        Self::Dyna(bean.into_ref())
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The scalar kind of this value, if it is a primitive scalar.
    pub const fn primitive_kind(&self) -> Option<Primitive> {
        Some(match self {
            Self::Bool(_) => Primitive::Bool,
            Self::Char(_) => Primitive::Char,
            Self::I8(_) => Primitive::I8,
            Self::I16(_) => Primitive::I16,
            Self::I32(_) => Primitive::I32,
            Self::I64(_) => Primitive::I64,
            Self::F32(_) => Primitive::F32,
            Self::F64(_) => Primitive::F64,
            _ => return None,
        })
    }

    /// The type of the value itself.
    ///
    /// Scalars report their boxed type; `Null` reports [`ValueType::Any`].
    pub fn runtime_type(&self) -> ValueType {
        if let Some(kind) = self.primitive_kind() {
            return ValueType::Boxed(kind);
        }
        match self {
            Self::I128(_) => ValueType::BigInt,
            Self::Str(_) => ValueType::Str,
            Self::Date(_) => ValueType::Date,
            Self::Time(_) => ValueType::Time,
            Self::DateTime(_) => ValueType::DateTime,
            Self::Url(_) => ValueType::Url,
            Self::Path(_) => ValueType::Path,
            Self::List(_) => ValueType::List,
            Self::Map(_) => ValueType::Map,
            Self::Array(array) => ValueType::array_of(array.borrow().component().clone()),
            Self::Bean(bean) => ValueType::Bean(bean.borrow().bean_class()),
            Self::Dyna(_) => ValueType::Dyna,
            _ => ValueType::Any,
        }
    }

    /// Type name used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Self::Null => "null".into(),
            Self::Bool(_) => "bool".into(),
            Self::Char(_) => "char".into(),
            Self::I8(_) => "i8".into(),
            Self::I16(_) => "i16".into(),
            Self::I32(_) => "i32".into(),
            Self::I64(_) => "i64".into(),
            Self::F32(_) => "f32".into(),
            Self::F64(_) => "f64".into(),
            _ => self.runtime_type().to_string(),
        }
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(v) => Some(*v),
            _ => None,
        }
    }

    /// Any integer value that fits in `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I8(v) => Some((*v).into()),
            Self::I16(v) => Some((*v).into()),
            Self::I32(v) => Some((*v).into()),
            Self::I64(v) => Some(*v),
            Self::I128(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Any numeric value, possibly rounded.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some((*v).into()),
            Self::F64(v) => Some(*v),
            Self::I128(v) => Some(*v as f64),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bean(&self) -> Option<&BeanRef> {
        match self {
            Self::Bean(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_dyna(&self) -> Option<&DynaRef> {
        match self {
            Self::Dyna(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn into_string(self) -> Option<String> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Runs `f` on the concrete bean behind this value.
    ///
    /// Returns `None` if the value is not a bean of type `T`.
    pub fn with_bean<T: Bean, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let bean = self.as_bean()?.borrow();
        let any: &dyn Any = &*bean;
        any.downcast_ref::<T>().map(f)
    }

    /// Mutable version of [`with_bean`](Self::with_bean).
    pub fn with_bean_mut<T: Bean, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut bean = self.as_bean()?.borrow_mut();
        let any: &mut dyn Any = &mut *bean;
        any.downcast_mut::<T>().map(f)
    }

    /// The elements of a string array or of a list holding only strings.
    pub fn string_items(&self) -> Option<Vec<Value>> {
        let is_text = |v: &Value| matches!(v, Value::Str(_) | Value::Null);
        match self {
            Self::Array(array) => {
                let array = array.borrow();
                (*array.component() == ValueType::Str).then(|| array.items().to_vec())
            }
            Self::List(list) => {
                let list = list.borrow();
                list.iter().all(is_text).then(|| list.clone())
            }
            _ => None,
        }
    }

    /// Number of elements of a list, array or map.
    pub fn container_len(&self) -> Option<usize> {
        match self {
            Self::List(list) => Some(list.borrow().len()),
            Self::Array(array) => Some(array.borrow().len()),
            Self::Map(map) => Some(map.borrow().len()),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Equality

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::I128(a), Self::I128(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a == b,
            (Self::F64(a), Self::F64(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Url(a), Self::Url(b)) => a == b,
            (Self::Path(a), Self::Path(b)) => a == b,
            (Self::List(a), Self::List(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Self::Map(a), Self::Map(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Self::Bean(a), Self::Bean(b)) => Rc::ptr_eq(a, b),
            (Self::Dyna(a), Self::Dyna(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// -----------------------------------------------------------------------------
// Display

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        fmt::Display::fmt(item, f)?;
    }
    f.write_str("]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.pad("null"),
            Self::Bool(v) => fmt::Display::fmt(v, f),
            Self::Char(v) => fmt::Display::fmt(v, f),
            Self::I8(v) => fmt::Display::fmt(v, f),
            Self::I16(v) => fmt::Display::fmt(v, f),
            Self::I32(v) => fmt::Display::fmt(v, f),
            Self::I64(v) => fmt::Display::fmt(v, f),
            Self::I128(v) => fmt::Display::fmt(v, f),
            Self::F32(v) => fmt::Display::fmt(v, f),
            Self::F64(v) => fmt::Display::fmt(v, f),
            Self::Str(v) => f.pad(v),
            Self::Date(v) => fmt::Display::fmt(v, f),
            Self::Time(v) => fmt::Display::fmt(v, f),
            Self::DateTime(v) => fmt::Display::fmt(&v.format(ISO_DATE_TIME), f),
            Self::Url(v) => f.pad(v.as_str()),
            Self::Path(v) => fmt::Display::fmt(&v.display(), f),
            Self::List(list) => write_seq(f, &list.borrow()),
            Self::Array(array) => write_seq(f, array.borrow().items()),
            Self::Map(map) => {
                let map = map.borrow();
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                f.write_str("{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={}", map[key])?;
                }
                f.write_str("}")
            }
            Self::Bean(bean) => write!(f, "{}@{:p}", bean.borrow().bean_class().name(), Rc::as_ptr(bean)),
            Self::Dyna(bean) => write!(f, "{}@{:p}", bean.borrow().dyna_class().name(), Rc::as_ptr(bean)),
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    f32 => F32,
    f64 => F64,
    String => Str,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    Url => Url,
    PathBuf => Path,
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(value: Vec<Value>) -> Self {
        Self::list(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

macro_rules! impl_try_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl TryFrom<Value> for $ty {
                type Error = BeanError;

                fn try_from(value: Value) -> Result<Self, Self::Error> {
                    match widen(&value, Primitive::$variant) {
                        Some(Value::$variant(v)) => Ok(v),
                        _ => Err(BeanError::conversion(
                            value.type_name(),
                            stringify!($ty),
                            "not losslessly convertible",
                        )),
                    }
                }
            }
        )*
    };
}

impl_try_from_value! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
}

impl TryFrom<Value> for String {
    type Error = BeanError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Str(v) => Ok(v),
            other => Err(BeanError::conversion(other.type_name(), "String", "not a string")),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
