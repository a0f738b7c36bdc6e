use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::format;
use alloc::sync::Arc;
use core::fmt;

use crate::BeanError;
use crate::info::{Bean, BeanRef};
use crate::value::{Value, ValueType};

// -----------------------------------------------------------------------------
// Method

/// The body of a [`Method`].
pub type Invoker = Arc<dyn Fn(&mut dyn Bean, &[Value]) -> Result<Value, BeanError> + Send + Sync>;

/// A method declared by a [`BeanClass`](crate::info::BeanClass).
///
/// A method without a body is a declaration, typically found on an
/// interface. Invoking it fails; introspection still uses it as the
/// public declaration of a signature.
#[derive(Clone)]
pub struct Method {
    name: Cow<'static, str>,
    params: Box<[ValueType]>,
    ret: Option<ValueType>,
    public: bool,
    invoker: Option<Invoker>,
}

impl Method {
    /// Creates a public method with a body.
    ///
    /// `ret` is `None` for methods returning nothing.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        params: impl Into<Box<[ValueType]>>,
        ret: Option<ValueType>,
        invoker: impl Fn(&mut dyn Bean, &[Value]) -> Result<Value, BeanError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params: params.into(),
            ret,
            public: true,
            invoker: Some(Arc::new(invoker)),
        }
    }

    /// Creates a public method without a body.
    pub fn declaration(
        name: impl Into<Cow<'static, str>>,
        params: impl Into<Box<[ValueType]>>,
        ret: Option<ValueType>,
    ) -> Self {
        Self {
            name: name.into(),
            params: params.into(),
            ret,
            public: true,
            invoker: None,
        }
    }

    /// Marks the method as not publicly accessible.
    #[inline]
    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    /// A publicly accessible copy sharing this method's body.
    #[inline]
    pub(crate) fn exposed(&self) -> Self {
        Self {
            public: true,
            ..self.clone()
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn return_type(&self) -> Option<&ValueType> {
        self.ret.as_ref()
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.public
    }

    #[inline]
    pub fn has_body(&self) -> bool {
        self.invoker.is_some()
    }

    #[inline]
    pub fn same_signature(&self, other: &Method) -> bool {
        self.name == other.name && self.params == other.params
    }

    /// Calls the method on `target`.
    ///
    /// The bean is mutably borrowed for the duration of the call.
    pub fn invoke(&self, target: &BeanRef, args: &[Value]) -> Result<Value, BeanError> {
        let failure = |reason: &str| BeanError::Invocation {
            method: self.name.as_ref().into(),
            reason: reason.into(),
        };

        let invoker = self.invoker.as_ref().ok_or_else(|| failure("method has no body"))?;
        if args.len() != self.params.len() {
            let reason = format!("expected {} arguments, got {}", self.params.len(), args.len());
            return Err(failure(reason.as_str()));
        }
        let mut bean = target
            .try_borrow_mut()
            .map_err(|_| failure("bean is already borrowed"))?;
        invoker(&mut *bean, args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("ret", &self.ret)
            .field("public", &self.public)
            .field("has_body", &self.invoker.is_some())
            .finish()
    }
}
