//! Runtime metadata of bean types.
//!
//! A [`Bean`] is an ordinary Rust value that describes itself through a
//! static [`BeanClass`]: its name, its visibility, its ancestors and the
//! interfaces it implements, and the [`Method`]s it declares. Property
//! discovery in [`descriptor`](crate::descriptor) works only from this
//! metadata, by accessor naming conventions (`getX`, `isX`, `setX`).
//!
//! Classes are usually built once with [`BeanClass::builder`] and kept
//! in a [`BeanClassCell`].
//!
//! # Examples
//!
//! ```
//! use vc_beans::info::{Bean, BeanClass, BeanClassCell};
//! use vc_beans::value::{Value, ValueType};
//!
//! #[derive(Debug, Default)]
//! struct Point {
//!     x: i64,
//! }
//!
//! impl Bean for Point {
//!     fn bean_class(&self) -> &'static BeanClass {
//!         static CELL: BeanClassCell = BeanClassCell::new();
//!         CELL.get_or_init(|| {
//!             BeanClass::builder::<Point>("Point")
//!                 .constructor(Point::default)
//!                 .property(
//!                     "x",
//!                     ValueType::Boxed(vc_beans::value::Primitive::I64),
//!                     |p| Value::I64(p.x),
//!                     |p, v| {
//!                         p.x = v.try_into()?;
//!                         Ok(())
//!                     },
//!                 )
//!                 .build()
//!         })
//!     }
//! }
//!
//! let class = Point::default().bean_class();
//! assert!(class.declared_method("getX", &[]).is_some());
//! assert!(class.declared_method("setX", &[ValueType::Boxed(vc_beans::value::Primitive::I64)]).is_some());
//! ```

// -----------------------------------------------------------------------------
// Modules

mod bean;
mod builder;
mod class;
mod method;

// -----------------------------------------------------------------------------
// Exports

pub use bean::{Bean, BeanRef};
pub use builder::BeanClassBuilder;
pub use class::{BeanClass, BeanClassCell, Constructor};
pub use method::{Invoker, Method};

pub(crate) use builder::INDEX_TYPE;

use alloc::string::String;

/// `name` with its first character upper-cased, as used in accessor names.
pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derives a property name from the tail of an accessor name.
///
/// `"Name"` becomes `"name"`, but `"URL"` stays `"URL"` since both
/// leading characters are upper case.
pub(crate) fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => name.into(),
        (Some(first), _) => first.to_lowercase().chain(name[first.len_utf8()..].chars()).collect(),
        (None, _) => String::new(),
    }
}
