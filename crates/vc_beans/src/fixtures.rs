//! Bean classes shared by the unit tests.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::BeanError;
use crate::info::{Bean, BeanClass, BeanClassCell, Method};
use crate::value::{Primitive, Value, ValueMap, ValueType};

fn out_of_range(property: &str, index: usize, len: usize) -> BeanError {
    BeanError::IndexOutOfRange {
        property: property.into(),
        index,
        len,
    }
}

// -----------------------------------------------------------------------------
// Address

#[derive(Debug, Default, Clone)]
pub(crate) struct Address {
    pub city: Option<String>,
}

impl Address {
    pub fn class() -> &'static BeanClass {
        static CELL: BeanClassCell = BeanClassCell::new();
        CELL.get_or_init(|| {
            BeanClass::builder::<Address>("Address")
                .constructor(Address::default)
                .property(
                    "city",
                    ValueType::Str,
                    |a| a.city.clone().into(),
                    |a, v| {
                        a.city = v.into_string();
                        Ok(())
                    },
                )
                .build()
        })
    }
}

impl Bean for Address {
    fn bean_class(&self) -> &'static BeanClass {
        Self::class()
    }
}

// -----------------------------------------------------------------------------
// Person

/// `name`, `age`, `active` (read through `isActive`), `tags` with
/// indexed accessors, a nested `address`, a read-only `id`, a list
/// `notes` and the mapped `phone`.
#[derive(Debug)]
pub(crate) struct Person {
    pub id: i64,
    pub name: Option<String>,
    pub age: i32,
    pub active: bool,
    pub tags: Vec<String>,
    pub address: Value,
    pub notes: Value,
    pub phones: ValueMap,
}

impl Default for Person {
    fn default() -> Self {
        Self {
            id: 0,
            name: None,
            age: 0,
            active: false,
            tags: Vec::new(),
            address: Value::Null,
            notes: Value::list([]),
            phones: ValueMap::default(),
        }
    }
}

impl Person {
    pub fn class() -> &'static BeanClass {
        static CELL: BeanClassCell = BeanClassCell::new();
        CELL.get_or_init(|| {
            let tags = ValueType::array_of(ValueType::Str);
            BeanClass::builder::<Person>("Person")
                .constructor(Person::default)
                .getter("id", ValueType::Primitive(Primitive::I64), |p| Value::I64(p.id))
                .property(
                    "name",
                    ValueType::Str,
                    |p| p.name.clone().into(),
                    |p, v| {
                        p.name = v.into_string();
                        Ok(())
                    },
                )
                .property(
                    "age",
                    ValueType::Primitive(Primitive::I32),
                    |p| Value::I32(p.age),
                    |p, v| {
                        p.age = v.try_into()?;
                        Ok(())
                    },
                )
                .property(
                    "active",
                    ValueType::Primitive(Primitive::Bool),
                    |p| Value::Bool(p.active),
                    |p, v| {
                        p.active = v.try_into()?;
                        Ok(())
                    },
                )
                .property(
                    "tags",
                    tags,
                    |p| Value::array(ValueType::Str, p.tags.iter().map(|t| t.as_str().into())),
                    |p, v| {
                        p.tags = match v.as_array() {
                            Some(array) => array
                                .borrow()
                                .items()
                                .iter()
                                .map(|item| item.as_str().unwrap_or_default().into())
                                .collect(),
                            None => Vec::new(),
                        };
                        Ok(())
                    },
                )
                .indexed_getter("tags", ValueType::Str, |p, i| {
                    p.tags
                        .get(i)
                        .map(|t| Value::from(t.as_str()))
                        .ok_or_else(|| out_of_range("tags", i, p.tags.len()))
                })
                .indexed_setter("tags", ValueType::Str, |p, i, v| {
                    let len = p.tags.len();
                    let slot = p.tags.get_mut(i).ok_or_else(|| out_of_range("tags", i, len))?;
                    *slot = v.into_string().unwrap_or_default();
                    Ok(())
                })
                .property(
                    "address",
                    Address::class().value_type(),
                    |p| p.address.clone(),
                    |p, v| {
                        p.address = v;
                        Ok(())
                    },
                )
                .getter("notes", ValueType::List, |p| p.notes.clone())
                .mapped_getter("phone", ValueType::Str, |p, key| {
                    p.phones.get(key).cloned().unwrap_or_default()
                })
                .mapped_setter("phone", ValueType::Str, |p, key, v| {
                    p.phones.insert(key.into(), v);
                    Ok(())
                })
                .build()
        })
    }

    /// A populated person living in `city`.
    pub fn sample(city: &str) -> Self {
        Self {
            id: 42,
            name: Some("Ann".into()),
            age: 31,
            active: true,
            tags: vec!["a".into(), "b".into()],
            address: Value::bean(Address {
                city: Some(city.into()),
            }),
            ..Self::default()
        }
    }
}

impl Bean for Person {
    fn bean_class(&self) -> &'static BeanClass {
        Self::class()
    }
}

// -----------------------------------------------------------------------------
// Employee

/// Extends [`Person`] with `salary`.
#[derive(Debug, Default)]
pub(crate) struct Employee {
    pub person: Person,
    pub salary: Option<i64>,
}

impl Employee {
    pub fn class() -> &'static BeanClass {
        static CELL: BeanClassCell = BeanClassCell::new();
        CELL.get_or_init(|| {
            BeanClass::builder::<Employee>("Employee")
                .extends(Person::class())
                .constructor(Employee::default)
                .property(
                    "salary",
                    ValueType::Boxed(Primitive::I64),
                    |e| e.salary.into(),
                    |e, v| {
                        e.salary = if v.is_null() { None } else { Some(v.try_into()?) };
                        Ok(())
                    },
                )
                .build()
        })
    }
}

impl Bean for Employee {
    fn bean_class(&self) -> &'static BeanClass {
        Self::class()
    }

    fn ancestor(&self, type_id: TypeId) -> Option<&dyn Any> {
        (type_id == TypeId::of::<Person>()).then_some(&self.person as &dyn Any)
    }

    fn ancestor_mut(&mut self, type_id: TypeId) -> Option<&mut dyn Any> {
        (type_id == TypeId::of::<Person>()).then_some(&mut self.person as &mut dyn Any)
    }
}

// -----------------------------------------------------------------------------
// Interfaces

pub(crate) trait Attributed {}

/// Publicly declares the `attribute` mapped accessors.
pub(crate) fn attributed() -> &'static BeanClass {
    static CELL: BeanClassCell = BeanClassCell::new();
    CELL.get_or_init(|| {
        BeanClass::interface::<dyn Attributed>("Attributed")
            .method(Method::declaration("getAttribute", vec![ValueType::Str], Some(ValueType::Str)))
            .method(Method::declaration(
                "setAttribute",
                vec![ValueType::Str, ValueType::Str],
                None,
            ))
            .build()
    })
}

pub(crate) trait Labelled {}

/// Provides a default `getLabel(key)` body.
pub(crate) fn labelled() -> &'static BeanClass {
    static CELL: BeanClassCell = BeanClassCell::new();
    CELL.get_or_init(|| {
        BeanClass::interface::<dyn Labelled>("Labelled")
            .method(Method::new(
                "getLabel",
                vec![ValueType::Str],
                Some(ValueType::Str),
                |bean, args| {
                    let key = args.first().and_then(Value::as_str).unwrap_or_default();
                    Ok(Value::Str(format!("{}:{key}", bean.bean_class().name())))
                },
            ))
            .build()
    })
}

// -----------------------------------------------------------------------------
// Agent

/// A private class: only the accessors declared by [`attributed`] are
/// reachable, `codename` is not.
#[derive(Debug, Default)]
pub(crate) struct Agent {
    pub codename: Option<String>,
    pub attributes: ValueMap,
}

impl Bean for Agent {
    fn bean_class(&self) -> &'static BeanClass {
        static CELL: BeanClassCell = BeanClassCell::new();
        CELL.get_or_init(|| {
            BeanClass::builder::<Agent>("Agent")
                .private()
                .implements(attributed())
                .constructor(Agent::default)
                .property(
                    "codename",
                    ValueType::Str,
                    |a| a.codename.clone().into(),
                    |a, v| {
                        a.codename = v.into_string();
                        Ok(())
                    },
                )
                .mapped_getter("attribute", ValueType::Str, |a, key| {
                    a.attributes.get(key).cloned().unwrap_or_default()
                })
                .mapped_setter("attribute", ValueType::Str, |a, key, v| {
                    a.attributes.insert(key.into(), v);
                    Ok(())
                })
                .build()
        })
    }
}

// -----------------------------------------------------------------------------
// Badge

/// Implements [`labelled`] and inherits its `label` accessor.
#[derive(Debug, Default)]
pub(crate) struct Badge {
    pub number: i32,
}

impl Bean for Badge {
    fn bean_class(&self) -> &'static BeanClass {
        static CELL: BeanClassCell = BeanClassCell::new();
        CELL.get_or_init(|| {
            BeanClass::builder::<Badge>("Badge")
                .implements(labelled())
                .property(
                    "number",
                    ValueType::Primitive(Primitive::I32),
                    |b| Value::I32(b.number),
                    |b, v| {
                        b.number = v.try_into()?;
                        Ok(())
                    },
                )
                .build()
        })
    }
}

// -----------------------------------------------------------------------------
// Config

/// A map-backed bean that declares `version`.
#[derive(Debug, Default)]
pub(crate) struct Config {
    pub version: i32,
    pub entries: ValueMap,
}

impl Bean for Config {
    fn bean_class(&self) -> &'static BeanClass {
        static CELL: BeanClassCell = BeanClassCell::new();
        CELL.get_or_init(|| {
            BeanClass::builder::<Config>("Config")
                .constructor(Config::default)
                .property(
                    "version",
                    ValueType::Primitive(Primitive::I32),
                    |c| Value::I32(c.version),
                    |c, v| {
                        c.version = v.try_into()?;
                        Ok(())
                    },
                )
                .build()
        })
    }

    fn map_storage(&self) -> Option<&ValueMap> {
        Some(&self.entries)
    }

    fn map_storage_mut(&mut self) -> Option<&mut ValueMap> {
        Some(&mut self.entries)
    }
}

// -----------------------------------------------------------------------------
// Ledger

/// Declares keyed accessors whose value types disagree.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    pub entries: ValueMap,
}

impl Bean for Ledger {
    fn bean_class(&self) -> &'static BeanClass {
        static CELL: BeanClassCell = BeanClassCell::new();
        CELL.get_or_init(|| {
            BeanClass::builder::<Ledger>("Ledger")
                .mapped_getter("entry", ValueType::Str, |l, key| {
                    l.entries.get(key).cloned().unwrap_or_default()
                })
                .mapped_setter("entry", ValueType::Primitive(Primitive::I32), |l, key, v| {
                    l.entries.insert(key.into(), v);
                    Ok(())
                })
                .build()
        })
    }
}

// -----------------------------------------------------------------------------
// Rack

/// Declares an indexed setter ahead of keyed accessors of the same name.
#[derive(Debug, Default)]
pub(crate) struct Rack {
    pub slots: Vec<Value>,
    pub labels: ValueMap,
}

impl Bean for Rack {
    fn bean_class(&self) -> &'static BeanClass {
        static CELL: BeanClassCell = BeanClassCell::new();
        CELL.get_or_init(|| {
            BeanClass::builder::<Rack>("Rack")
                .indexed_setter("slot", ValueType::Str, |r, index, v| {
                    if r.slots.len() <= index {
                        r.slots.resize(index + 1, Value::Null);
                    }
                    r.slots[index] = v;
                    Ok(())
                })
                .mapped_getter("slot", ValueType::Str, |r, key| {
                    r.labels.get(key).cloned().unwrap_or_default()
                })
                .mapped_setter("slot", ValueType::Str, |r, key, v| {
                    r.labels.insert(key.into(), v);
                    Ok(())
                })
                .build()
        })
    }
}
