//! Property access for object graphs by path expressions.
//!
//! - [`value`]: the dynamically typed [`Value`](value::Value) and its type descriptors.
//! - [`info`]: bean metadata, the [`Bean`](info::Bean) trait and [`BeanClass`](info::BeanClass).
//! - [`descriptor`]: accessor discovery and its cache.
//! - [`dyna`]: schema-described dynamic containers.
//! - [`access`]: path grammar and [`PropertyUtils`](access::PropertyUtils).
//! - [`convert`]: the conversion registry.
//! - [`utils`]: [`BeanUtils`](utils::BeanUtils), copying and populating with conversion.
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod access;
pub mod convert;
pub mod descriptor;
pub mod dyna;
pub mod error;
pub mod info;
pub mod utils;
pub mod value;

#[cfg(test)]
mod fixtures;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use error::BeanError;
