//! Property discovery over [`BeanClass`](crate::info::BeanClass) metadata.
//!
//! - [`PropertyDescriptor`]: the simple and indexed accessors of one property.
//! - [`MappedPropertyDescriptor`]: the keyed accessors `getX(key)` / `setX(key, value)`.
//! - [`DescriptorCache`]: memoizes both per class, plus individual method lookups.

// -----------------------------------------------------------------------------
// Modules

mod cache;
mod lookup;
mod mapped;
mod property;

// -----------------------------------------------------------------------------
// Exports

pub use cache::{DescriptorCache, MethodKey};
pub use mapped::MappedPropertyDescriptor;
pub use property::{ClassDescriptors, PropertyDescriptor};
