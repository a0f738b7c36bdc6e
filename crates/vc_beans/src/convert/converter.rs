use alloc::sync::Arc;
use core::fmt;

use log::debug;

use crate::BeanError;
use crate::convert::ConvertRegistry;
use crate::value::{Value, ValueType};

// -----------------------------------------------------------------------------
// Converter

/// Produces a value of a destination type from an arbitrary value,
/// usually a string.
///
/// `registry` is the registry the converter was looked up in, for
/// converters that delegate element conversions.
pub trait Converter: fmt::Debug + Send + Sync + 'static {
    fn convert(&self, value: &Value, target: &ValueType, registry: &ConvertRegistry) -> Result<Value, BeanError>;
}

// -----------------------------------------------------------------------------
// Config

/// How registered converters treat absent or unparsable input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConversionPolicy {
    /// Fall back to the entry's default value.
    #[default]
    Lenient,
    /// Fail with [`BeanError::ConversionFailure`].
    Strict,
}

/// Settings applied by [`ConvertRegistry::register_defaults`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertConfig {
    pub policy: ConversionPolicy,
    /// Lenient `Option<_>` entries default to `null` instead of zero.
    pub default_null: bool,
    /// Length of the default value of lenient array entries.
    pub default_array_size: usize,
}

impl ConvertConfig {
    #[inline]
    pub const fn strict() -> Self {
        Self {
            policy: ConversionPolicy::Strict,
            default_null: false,
            default_array_size: 0,
        }
    }
}

// -----------------------------------------------------------------------------
// ConverterEntry

/// A registered converter with its fallback behavior.
#[derive(Debug, Clone)]
pub struct ConverterEntry {
    converter: Arc<dyn Converter>,
    default: Option<Value>,
}

impl ConverterEntry {
    /// An entry that returns `default` for absent or unparsable input.
    pub fn lenient(converter: impl Converter, default: Value) -> Self {
        Self {
            converter: Arc::new(converter),
            default: Some(default),
        }
    }

    /// An entry that fails on absent or unparsable input.
    pub fn strict(converter: impl Converter) -> Self {
        Self {
            converter: Arc::new(converter),
            default: None,
        }
    }

    #[inline]
    pub(crate) fn from_parts(converter: Arc<dyn Converter>, default: Option<Value>) -> Self {
        Self { converter, default }
    }

    #[inline]
    pub fn converter(&self) -> &Arc<dyn Converter> {
        &self.converter
    }

    #[inline]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[inline]
    pub fn is_strict(&self) -> bool {
        self.default.is_none()
    }

    #[inline]
    pub fn set_default_value(&mut self, default: Value) {
        self.default = Some(default);
    }

    /// Makes the entry strict.
    #[inline]
    pub fn clear_default_value(&mut self) {
        self.default = None;
    }

    /// Converts `value` to `target`, applying the fallback rules.
    pub fn apply(&self, value: &Value, target: &ValueType, registry: &ConvertRegistry) -> Result<Value, BeanError> {
        if value.is_null() {
            return match &self.default {
                Some(default) => Ok(default.clone()),
                None => Err(BeanError::conversion("null", target.to_string(), "no value specified")),
            };
        }
        match self.converter.convert(value, target, registry) {
            Ok(converted) => Ok(converted),
            Err(err) => match &self.default {
                Some(default) => {
                    debug!("conversion of `{value}` to `{target}` failed, using default: {err}");
                    Ok(default.clone())
                }
                None => Err(err),
            },
        }
    }
}
