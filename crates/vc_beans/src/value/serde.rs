use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use serde_core::ser::{self, SerializeMap, SerializeSeq};
use serde_core::{Serialize, Serializer};

use crate::value::{ISO_DATE_TIME, Value};

// -----------------------------------------------------------------------------
// Serialize

fn serialize_seq<S: Serializer>(serializer: S, items: &[Value]) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_seq(Some(items.len()))?;
    for item in items {
        state.serialize_element(item)?;
    }
    state.end()
}

fn serialize_entries<S: Serializer>(
    serializer: S,
    mut entries: Vec<(&String, &Value)>,
) -> Result<S::Ok, S::Error> {
    entries.sort_by(|a, b| a.0.cmp(b.0));
    let mut state = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        state.serialize_entry(key, value)?;
    }
    state.end()
}

/// Values serialize as their natural data model.
///
/// Temporal values, URLs and paths become strings; maps and dynamic
/// containers become maps with sorted keys. Beans and bean adapters are
/// rejected, enumerating their properties needs a
/// [`PropertyUtils`](crate::access::PropertyUtils), see
/// [`PropertyUtils::describe`](crate::access::PropertyUtils::describe).
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Char(v) => serializer.serialize_char(*v),
            Self::I8(v) => serializer.serialize_i8(*v),
            Self::I16(v) => serializer.serialize_i16(*v),
            Self::I32(v) => serializer.serialize_i32(*v),
            Self::I64(v) => serializer.serialize_i64(*v),
            Self::I128(v) => serializer.serialize_i128(*v),
            Self::F32(v) => serializer.serialize_f32(*v),
            Self::F64(v) => serializer.serialize_f64(*v),
            Self::Str(v) => serializer.serialize_str(v),
            Self::Date(v) => serializer.collect_str(v),
            Self::Time(v) => serializer.collect_str(v),
            Self::DateTime(v) => serializer.collect_str(&v.format(ISO_DATE_TIME)),
            Self::Url(v) => serializer.serialize_str(v.as_str()),
            Self::Path(v) => match v.to_str() {
                Some(path) => serializer.serialize_str(path),
                None => Err(ser::Error::custom("path contains invalid UTF-8 characters")),
            },
            Self::List(list) => serialize_seq(serializer, &list.borrow()),
            Self::Array(array) => serialize_seq(serializer, array.borrow().items()),
            Self::Map(map) => {
                let map = map.borrow();
                serialize_entries(serializer, map.iter().collect())
            }
            Self::Dyna(bean) => {
                let bean = bean.borrow();
                match bean.stored_values() {
                    Some(values) => serialize_entries(serializer, values.iter().collect()),
                    None => Err(ser::Error::custom(
                        "bean adapters cannot be serialized without a property resolver",
                    )),
                }
            }
            Self::Bean(bean) => Err(ser::Error::custom(format!(
                "bean `{}` cannot be serialized without a property resolver",
                bean.borrow().bean_class().name()
            ))),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
