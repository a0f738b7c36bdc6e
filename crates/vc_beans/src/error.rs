use alloc::string::String;

use thiserror::Error;

use crate::access::ParseError;

// -----------------------------------------------------------------------------
// Error

/// Errors produced while resolving, converting or copying properties.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum BeanError {
    #[error("unknown property `{property}` on `{target}`")]
    UnknownProperty { property: String, target: String },

    #[error("property `{property}` of `{target}` has no getter")]
    NotReadable { property: String, target: String },

    #[error("property `{property}` of `{target}` has no setter")]
    NotWriteable { property: String, target: String },

    #[error("property `{property}` is not indexed")]
    NotIndexed { property: String },

    #[error("property `{property}` is not mapped")]
    NotMapped { property: String },

    #[error("index {index} out of range for `{property}` of length {len}")]
    IndexOutOfRange {
        property: String,
        index: usize,
        len: usize,
    },

    #[error("null value at `{path}` while resolving `{full}`")]
    NullIntermediate { path: String, full: String },

    #[error("no bean specified")]
    NullTarget,

    #[error("cannot convert `{from_type}` to `{to_type}`: {reason}")]
    ConversionFailure {
        from_type: String,
        to_type: String,
        reason: String,
    },

    #[error("cannot assign null to primitive property `{property}` of type `{ty}`")]
    NullForPrimitive { property: String, ty: String },

    #[error("cannot change restricted class `{class}` while adding or removing `{property}`")]
    RestrictedSchemaViolation { class: String, property: String },

    #[error("mapped property `{property}` of `{class}`: getter returns `{read}` but setter takes `{write}`")]
    DescriptorMismatch {
        class: String,
        property: String,
        read: String,
        write: String,
    },

    #[error("`{operation}` is not supported by `{target}`")]
    UnsupportedOperation { operation: String, target: String },

    #[error(transparent)]
    InvalidPath(#[from] ParseError),

    #[error("class `{class}` cannot be instantiated without a constructor")]
    Instantiation { class: String },

    #[error("failed to invoke `{method}`: {reason}")]
    Invocation { method: String, reason: String },
}

impl BeanError {
    /// Returns `true` for errors that mean "this property is not there",
    /// which bulk copy operations skip.
    #[inline]
    pub fn is_missing_property(&self) -> bool {
        matches!(
            self,
            Self::UnknownProperty { .. } | Self::NotReadable { .. } | Self::NotWriteable { .. }
        )
    }

    pub(crate) fn unknown(property: &str, target: impl Into<String>) -> Self {
        Self::UnknownProperty {
            property: property.into(),
            target: target.into(),
        }
    }

    pub(crate) fn not_indexed(property: &str) -> Self {
        Self::NotIndexed {
            property: property.into(),
        }
    }

    pub(crate) fn not_mapped(property: &str) -> Self {
        Self::NotMapped {
            property: property.into(),
        }
    }

    pub(crate) fn conversion(
        from_type: impl Into<String>,
        to_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ConversionFailure {
            from_type: from_type.into(),
            to_type: to_type.into(),
            reason: reason.into(),
        }
    }
}
