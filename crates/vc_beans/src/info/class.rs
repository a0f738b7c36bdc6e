use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::TypeId;
use core::hash::{Hash, Hasher};
use core::{fmt, iter};
use std::sync::OnceLock;

use crate::BeanError;
use crate::info::{Bean, BeanClassBuilder, BeanRef, Method};
use crate::value::ValueType;

// -----------------------------------------------------------------------------
// BeanClass

/// Creates a fresh instance of a class.
pub type Constructor = Arc<dyn Fn() -> BeanRef + Send + Sync>;

/// Runtime metadata of a bean type.
///
/// Two classes are equal when they describe the same Rust type.
pub struct BeanClass {
    pub(super) name: Cow<'static, str>,
    pub(super) type_id: TypeId,
    pub(super) public: bool,
    pub(super) interface: bool,
    pub(super) parent: Option<&'static BeanClass>,
    pub(super) interfaces: Box<[&'static BeanClass]>,
    pub(super) methods: Box<[Method]>,
    pub(super) constructor: Option<Constructor>,
}

impl BeanClass {
    /// Starts building the class of bean type `T`.
    #[inline]
    pub fn builder<T: Bean>(name: impl Into<Cow<'static, str>>) -> BeanClassBuilder<T> {
        BeanClassBuilder::new(name.into(), false)
    }

    /// Starts building an interface identified by the marker type `T`.
    ///
    /// Interfaces are never instantiated; they carry public method
    /// declarations and optional default bodies.
    #[inline]
    pub fn interface<T: ?Sized + 'static>(name: impl Into<Cow<'static, str>>) -> BeanClassBuilder<T> {
        BeanClassBuilder::new(name.into(), true)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.public
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        self.interface
    }

    #[inline]
    pub fn parent(&self) -> Option<&'static BeanClass> {
        self.parent
    }

    /// Interfaces implemented directly by this class.
    #[inline]
    pub fn interfaces(&self) -> &[&'static BeanClass] {
        &self.interfaces
    }

    /// Methods declared by this class, not including inherited ones.
    #[inline]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// The method declared by this class with the given signature.
    pub fn declared_method(&self, name: &str, params: &[ValueType]) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.name() == name && m.params() == params)
    }

    /// This class followed by its parent chain.
    pub fn ancestors(&'static self) -> impl Iterator<Item = &'static BeanClass> {
        iter::successors(Some(self), |class| class.parent)
    }

    /// Returns `true` if `self` is `other`, extends it, or implements it.
    pub fn is_subclass_of(&self, other: &BeanClass) -> bool {
        self.type_id == other.type_id
            || self.parent.is_some_and(|parent| parent.is_subclass_of(other))
            || self.interfaces.iter().any(|iface| iface.is_subclass_of(other))
    }

    #[inline]
    pub fn can_instantiate(&self) -> bool {
        self.constructor.is_some()
    }

    /// Creates a fresh instance through the registered constructor.
    pub fn instantiate(&self) -> Result<BeanRef, BeanError> {
        match &self.constructor {
            Some(constructor) => Ok(constructor()),
            None => Err(BeanError::Instantiation {
                class: self.name.as_ref().into(),
            }),
        }
    }

    /// The declared type of this class.
    #[inline]
    pub fn value_type(&'static self) -> ValueType {
        ValueType::Bean(self)
    }
}

impl PartialEq for BeanClass {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for BeanClass {}

impl Hash for BeanClass {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for BeanClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanClass")
            .field("name", &self.name)
            .field("public", &self.public)
            .field("interface", &self.interface)
            .field("parent", &self.parent.map(BeanClass::name))
            .field("methods", &self.methods.len())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// BeanClassCell

/// Lazily initialized storage for a `'static` [`BeanClass`].
///
/// # Examples
///
/// ```
/// use vc_beans::info::{BeanClass, BeanClassCell};
///
/// #[derive(Debug)]
/// struct Empty;
/// impl vc_beans::info::Bean for Empty {
///     fn bean_class(&self) -> &'static BeanClass {
///         static CELL: BeanClassCell = BeanClassCell::new();
///         CELL.get_or_init(|| BeanClass::builder::<Empty>("Empty").build())
///     }
/// }
/// ```
pub struct BeanClassCell(OnceLock<BeanClass>);

impl BeanClassCell {
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored class, building it with `f` on first use.
    #[inline]
    pub fn get_or_init(&'static self, f: impl FnOnce() -> BeanClass) -> &'static BeanClass {
        self.0.get_or_init(f)
    }
}
