//! Conversion of strings and loosely typed values to property types.
//!
//! A [`ConvertRegistry`] maps each destination [`ValueType`] to a
//! [`ConverterEntry`]: a [`Converter`] plus the value to fall back to
//! when the input is absent or cannot be parsed. Strict entries have no
//! fallback and fail instead, see [`ConversionPolicy`].
//!
//! [`ValueType`]: crate::value::ValueType

// -----------------------------------------------------------------------------
// Modules

mod array;
mod converter;
mod location;
mod number;
mod registry;
mod temporal;
mod text;

// -----------------------------------------------------------------------------
// Exports

pub use array::ArrayConverter;
pub use converter::{ConversionPolicy, ConvertConfig, Converter, ConverterEntry};
pub use location::{PathConverter, UrlConverter};
pub use number::{BigIntConverter, NumberConverter};
pub use registry::ConvertRegistry;
pub use temporal::TemporalConverter;
pub use text::{BooleanConverter, CharConverter, StringConverter};
