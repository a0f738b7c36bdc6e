use alloc::format;
use alloc::string::ToString;

use crate::BeanError;
use crate::convert::{ConvertRegistry, Converter};
use crate::value::{Value, ValueType};

// -----------------------------------------------------------------------------
// BooleanConverter

/// Converts strings such as `yes`, `off` or `1` to `bool`.
///
/// Matching is case-insensitive; numbers convert by comparison with zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BooleanConverter;

impl BooleanConverter {
    const TRUE: [&'static str; 5] = ["true", "yes", "y", "on", "1"];
    const FALSE: [&'static str; 5] = ["false", "no", "n", "off", "0"];
}

impl Converter for BooleanConverter {
    fn convert(&self, value: &Value, target: &ValueType, _registry: &ConvertRegistry) -> Result<Value, BeanError> {
        if let Some(v) = value.as_bool() {
            return Ok(Value::Bool(v));
        }
        if let Some(v) = value.as_i64() {
            return Ok(Value::Bool(v != 0));
        }
        let text = value.to_string();
        let text = text.trim();
        if Self::TRUE.iter().any(|t| t.eq_ignore_ascii_case(text)) {
            Ok(Value::Bool(true))
        } else if Self::FALSE.iter().any(|t| t.eq_ignore_ascii_case(text)) {
            Ok(Value::Bool(false))
        } else {
            Err(BeanError::conversion(
                value.type_name(),
                target.to_string(),
                format!("`{text}` is not a boolean"),
            ))
        }
    }
}

// -----------------------------------------------------------------------------
// CharConverter

/// Takes the first character of the input's string form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharConverter;

impl Converter for CharConverter {
    fn convert(&self, value: &Value, target: &ValueType, _registry: &ConvertRegistry) -> Result<Value, BeanError> {
        if let Some(v) = value.as_char() {
            return Ok(Value::Char(v));
        }
        value
            .to_string()
            .chars()
            .next()
            .map(Value::Char)
            .ok_or_else(|| BeanError::conversion(value.type_name(), target.to_string(), "empty string"))
    }
}

// -----------------------------------------------------------------------------
// StringConverter

/// Renders any value with its [`Display`](core::fmt::Display) form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringConverter;

impl Converter for StringConverter {
    fn convert(&self, value: &Value, _target: &ValueType, _registry: &ConvertRegistry) -> Result<Value, BeanError> {
        Ok(match value {
            Value::Null => Value::Null,
            Value::Str(v) => Value::Str(v.clone()),
            other => Value::Str(other.to_string()),
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{BooleanConverter, CharConverter, StringConverter};
    use crate::convert::{ConvertRegistry, Converter};
    use crate::value::{Primitive, Value, ValueType};

    #[test]
    fn boolean_words() {
        let registry = ConvertRegistry::new();
        let ty = ValueType::Primitive(Primitive::Bool);
        for (text, expected) in [("Yes", true), ("on", true), ("1", true), ("N", false), ("off", false)] {
            assert_eq!(
                BooleanConverter.convert(&text.into(), &ty, &registry),
                Ok(Value::Bool(expected)),
                "{text}"
            );
        }
        assert!(BooleanConverter.convert(&"maybe".into(), &ty, &registry).is_err());
    }

    #[test]
    fn char_and_string() {
        let registry = ConvertRegistry::new();
        let ty = ValueType::Primitive(Primitive::Char);
        assert_eq!(CharConverter.convert(&"xyz".into(), &ty, &registry), Ok(Value::Char('x')));
        assert!(CharConverter.convert(&"".into(), &ty, &registry).is_err());

        assert_eq!(
            StringConverter.convert(&Value::I32(5), &ValueType::Str, &registry),
            Ok("5".into())
        );
    }
}
