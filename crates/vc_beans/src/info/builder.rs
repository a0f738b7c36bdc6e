use alloc::borrow::Cow;
use alloc::format;
use alloc::rc::Rc;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::any::TypeId;
use core::cell::RefCell;
use core::marker::PhantomData;

use crate::BeanError;
use crate::info::bean::{downcast_mut, downcast_ref};
use crate::info::{Bean, BeanClass, BeanRef, Constructor, Method, capitalize};
use crate::value::{Primitive, Value, ValueType};

/// Parameter type of the index argument of indexed accessors.
pub(crate) const INDEX_TYPE: ValueType = ValueType::Primitive(Primitive::I32);

fn index_arg(method: &str, args: &[Value]) -> Result<usize, BeanError> {
    match args.first() {
        Some(Value::I32(index)) => usize::try_from(*index).map_err(|_| BeanError::Invocation {
            method: method.into(),
            reason: format!("negative index {index}"),
        }),
        _ => Err(BeanError::Invocation {
            method: method.into(),
            reason: "missing index argument".into(),
        }),
    }
}

fn key_arg<'a>(method: &str, args: &'a [Value]) -> Result<&'a str, BeanError> {
    match args.first() {
        Some(Value::Str(key)) => Ok(key),
        _ => Err(BeanError::Invocation {
            method: method.into(),
            reason: "missing key argument".into(),
        }),
    }
}

// -----------------------------------------------------------------------------
// BeanClassBuilder

/// Builder of a [`BeanClass`].
///
/// The typed helpers (`getter`, `setter`, `indexed_getter`, ...) are
/// shorthands that name the method after the property and wrap a
/// closure over the concrete bean type `T`.
pub struct BeanClassBuilder<T: ?Sized> {
    name: Cow<'static, str>,
    type_id: TypeId,
    public: bool,
    interface: bool,
    parent: Option<&'static BeanClass>,
    interfaces: Vec<&'static BeanClass>,
    methods: Vec<Method>,
    constructor: Option<Constructor>,
    marker: PhantomData<fn(&T)>,
}

impl<T: ?Sized + 'static> BeanClassBuilder<T> {
    pub(super) fn new(name: Cow<'static, str>, interface: bool) -> Self {
        Self {
            name,
            type_id: TypeId::of::<T>(),
            public: true,
            interface,
            parent: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            constructor: None,
            marker: PhantomData,
        }
    }

    /// Marks the class as not publicly accessible.
    ///
    /// Methods of a non-public class are only reachable through a public
    /// declaration on an interface or a public ancestor.
    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn extends(mut self, parent: &'static BeanClass) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn implements(mut self, interface: &'static BeanClass) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn build(self) -> BeanClass {
        BeanClass {
            name: self.name,
            type_id: self.type_id,
            public: self.public,
            interface: self.interface,
            parent: self.parent,
            interfaces: self.interfaces.into_boxed_slice(),
            methods: self.methods.into_boxed_slice(),
            constructor: self.constructor,
        }
    }
}

impl<T: Bean> BeanClassBuilder<T> {
    pub fn constructor(mut self, constructor: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.constructor = Some(Arc::new(move || -> BeanRef { Rc::new(RefCell::new(constructor())) }));
        self
    }

    /// Adds `getX()`, or `isX()` for primitive `bool` properties.
    pub fn getter(
        self,
        property: &str,
        ty: ValueType,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        let prefix = match ty {
            ValueType::Primitive(Primitive::Bool) => "is",
            _ => "get",
        };
        let name = format!("{prefix}{}", capitalize(property));
        self.method(Method::new(name, Vec::<ValueType>::new(), Some(ty), move |bean, _| {
            Ok(get(downcast_ref::<T>(bean)?))
        }))
    }

    /// Adds `setX(value)`.
    ///
    /// The value passed to `set` has already been checked against `ty`.
    pub fn setter(
        self,
        property: &str,
        ty: ValueType,
        set: impl Fn(&mut T, Value) -> Result<(), BeanError> + Send + Sync + 'static,
    ) -> Self {
        let name = format!("set{}", capitalize(property));
        self.method(Method::new(name, vec![ty], None, move |bean, args| {
            let value = args.first().cloned().unwrap_or_default();
            set(downcast_mut::<T>(bean)?, value)?;
            Ok(Value::Null)
        }))
    }

    /// Adds both [`getter`](Self::getter) and [`setter`](Self::setter).
    pub fn property(
        self,
        property: &str,
        ty: ValueType,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
        set: impl Fn(&mut T, Value) -> Result<(), BeanError> + Send + Sync + 'static,
    ) -> Self {
        self.getter(property, ty.clone(), get).setter(property, ty, set)
    }

    /// Adds `getX(index)`.
    pub fn indexed_getter(
        self,
        property: &str,
        element: ValueType,
        get: impl Fn(&T, usize) -> Result<Value, BeanError> + Send + Sync + 'static,
    ) -> Self {
        let name = format!("get{}", capitalize(property));
        let method = name.clone();
        self.method(Method::new(name, vec![INDEX_TYPE], Some(element), move |bean, args| {
            get(downcast_ref::<T>(bean)?, index_arg(&method, args)?)
        }))
    }

    /// Adds `setX(index, value)`.
    pub fn indexed_setter(
        self,
        property: &str,
        element: ValueType,
        set: impl Fn(&mut T, usize, Value) -> Result<(), BeanError> + Send + Sync + 'static,
    ) -> Self {
        let name = format!("set{}", capitalize(property));
        let method = name.clone();
        self.method(Method::new(name, vec![INDEX_TYPE, element], None, move |bean, args| {
            let index = index_arg(&method, args)?;
            let value = args.get(1).cloned().unwrap_or_default();
            set(downcast_mut::<T>(bean)?, index, value)?;
            Ok(Value::Null)
        }))
    }

    /// Adds `getX(key)`.
    pub fn mapped_getter(
        self,
        property: &str,
        ty: ValueType,
        get: impl Fn(&T, &str) -> Value + Send + Sync + 'static,
    ) -> Self {
        let name = format!("get{}", capitalize(property));
        let method = name.clone();
        self.method(Method::new(name, vec![ValueType::Str], Some(ty), move |bean, args| {
            Ok(get(downcast_ref::<T>(bean)?, key_arg(&method, args)?))
        }))
    }

    /// Adds `setX(key, value)`.
    pub fn mapped_setter(
        self,
        property: &str,
        ty: ValueType,
        set: impl Fn(&mut T, &str, Value) -> Result<(), BeanError> + Send + Sync + 'static,
    ) -> Self {
        let name = format!("set{}", capitalize(property));
        let method = name.clone();
        self.method(Method::new(name, vec![ValueType::Str, ty], None, move |bean, args| {
            let key = key_arg(&method, args)?;
            let value = args.get(1).cloned().unwrap_or_default();
            set(downcast_mut::<T>(bean)?, key, value)?;
            Ok(Value::Null)
        }))
    }
}
