//! Property access by path.
//!
//! A path addresses a property of an object graph with a compact syntax:
//!
//! - Simple: `name`
//! - Nested: `a.b.c`, each segment resolved on the result of the previous one
//! - Indexed: `name[2]`, an element of a list, array, or indexed property
//! - Mapped: `name(key)`, a value of a map or mapped property
//!
//! Segments combine freely: `a.b[2].c(k)`. Keys may contain dots, a
//! `.` only separates segments outside of brackets and parentheses.
//!
//! [`PropertyPath`] is the parsed form. [`PropertyUtils`] resolves paths
//! against [`Value`](crate::value::Value)s holding beans, dynamic
//! containers or maps.
//!
//! # Examples
//!
//! ```
//! use vc_beans::access::PropertyUtils;
//! use vc_beans::value::Value;
//!
//! let utils = PropertyUtils::new();
//! let root = Value::map([(
//!     "users",
//!     Value::list([Value::map([("name", Value::from("ann"))])]),
//! )]);
//!
//! assert_eq!(utils.get_property(&root, "users[0].name").unwrap(), Value::from("ann"));
//!
//! utils.set_property(&root, "users[0].name", "bob".into()).unwrap();
//! assert_eq!(utils.get_property(&root, "users[0].name").unwrap(), Value::from("bob"));
//! ```

// -----------------------------------------------------------------------------
// Modules

mod path;
mod property_utils;

// -----------------------------------------------------------------------------
// Exports

pub use path::{ParseError, PropertyPath, Segment, SegmentKind};
pub use path::{INDEXED_END, INDEXED_START, MAPPED_END, MAPPED_START, NESTED};
pub use path::{has_nested, index, is_indexed, is_mapped, key, next, property_name, remove, split_last};
pub use path::{last_separator, next_separator};
pub use property_utils::PropertyUtils;
