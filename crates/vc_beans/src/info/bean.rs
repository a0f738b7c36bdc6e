use alloc::format;
use alloc::rc::Rc;
use core::any::{Any, TypeId, type_name};
use core::cell::RefCell;
use core::fmt;

use crate::BeanError;
use crate::info::BeanClass;
use crate::value::ValueMap;

// -----------------------------------------------------------------------------
// Bean

/// Shared handle to a bean of any class.
pub type BeanRef = Rc<RefCell<dyn Bean>>;

/// A value whose properties are described by a [`BeanClass`].
///
/// Implementations only need [`bean_class`](Bean::bean_class). Types
/// that embed their parent class by composition expose it through
/// [`ancestor`](Bean::ancestor) so that inherited accessors can reach
/// it. Types backed by a string-keyed store expose that store through
/// [`map_storage`](Bean::map_storage); their properties then resolve
/// by key unless the class declares an accessor.
pub trait Bean: Any + fmt::Debug + 'static {
    fn bean_class(&self) -> &'static BeanClass;

    /// The embedded ancestor value of type `type_id`, if any.
    fn ancestor(&self, type_id: TypeId) -> Option<&dyn Any> {
        let _ = type_id;
        None
    }

    /// Mutable version of [`ancestor`](Bean::ancestor).
    fn ancestor_mut(&mut self, type_id: TypeId) -> Option<&mut dyn Any> {
        let _ = type_id;
        None
    }

    fn map_storage(&self) -> Option<&ValueMap> {
        None
    }

    fn map_storage_mut(&mut self) -> Option<&mut ValueMap> {
        None
    }
}

fn mismatch<T>(class: &str) -> BeanError {
    BeanError::Invocation {
        method: type_name::<T>().into(),
        reason: format!("bean of class `{class}` is not a `{}`", type_name::<T>()),
    }
}

/// Views `bean` as `T`, either directly or through an embedded ancestor.
pub(super) fn downcast_ref<T: Bean>(bean: &dyn Bean) -> Result<&T, BeanError> {
    let any: &dyn Any = bean;
    if let Some(this) = any.downcast_ref::<T>() {
        return Ok(this);
    }
    bean.ancestor(TypeId::of::<T>())
        .and_then(<dyn Any>::downcast_ref::<T>)
        .ok_or_else(|| mismatch::<T>(bean.bean_class().name()))
}

/// Mutable version of [`downcast_ref`].
pub(super) fn downcast_mut<T: Bean>(bean: &mut dyn Bean) -> Result<&mut T, BeanError> {
    let class = bean.bean_class();
    if (&*bean as &dyn Any).is::<T>() {
        let any: &mut dyn Any = bean;
        return any.downcast_mut::<T>().ok_or_else(|| mismatch::<T>(class.name()));
    }
    bean.ancestor_mut(TypeId::of::<T>())
        .and_then(<dyn Any>::downcast_mut::<T>)
        .ok_or_else(|| mismatch::<T>(class.name()))
}
