//! Bulk copy and string-driven population of properties.

mod bean_utils;

pub use bean_utils::BeanUtils;
