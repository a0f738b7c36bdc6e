use alloc::format;
use alloc::string::{String, ToString};

use crate::BeanError;
use crate::convert::{ConvertRegistry, Converter};
use crate::value::{Primitive, Value, ValueType};

fn failure(value: &Value, target: &ValueType, reason: impl Into<String>) -> BeanError {
    BeanError::conversion(value.type_name(), target.to_string(), reason)
}

/// An integer or float read from `value`, before range checks.
enum Number {
    Int(i128),
    Float(f64),
}

fn read_number(value: &Value) -> Option<Number> {
    Some(match value {
        Value::Bool(v) => Number::Int(i128::from(*v)),
        Value::I8(v) => Number::Int((*v).into()),
        Value::I16(v) => Number::Int((*v).into()),
        Value::I32(v) => Number::Int((*v).into()),
        Value::I64(v) => Number::Int((*v).into()),
        Value::I128(v) => Number::Int(*v),
        Value::F32(v) => Number::Float((*v).into()),
        Value::F64(v) => Number::Float(*v),
        Value::Str(s) => {
            let s = s.trim();
            match s.parse::<i128>() {
                Ok(v) => Number::Int(v),
                Err(_) => Number::Float(s.parse::<f64>().ok()?),
            }
        }
        _ => return None,
    })
}

/// Truncates a finite float to an integer.
fn truncate(v: f64) -> Option<i128> {
    // i128 covers every float that fits the narrower targets
    (v.is_finite() && v.abs() < 1.0e38).then_some(v.trunc() as i128)
}

// -----------------------------------------------------------------------------
// NumberConverter

/// Converts strings, booleans and numbers to one numeric kind.
///
/// Integer targets truncate fractional input; values outside the
/// target's range fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberConverter {
    kind: Primitive,
}

impl NumberConverter {
    #[inline]
    pub const fn new(kind: Primitive) -> Self {
        Self { kind }
    }

    #[inline]
    pub const fn kind(&self) -> Primitive {
        self.kind
    }
}

impl Converter for NumberConverter {
    fn convert(&self, value: &Value, target: &ValueType, _registry: &ConvertRegistry) -> Result<Value, BeanError> {
        let Some(number) = read_number(value) else {
            return Err(failure(value, target, format!("`{value}` is not a number")));
        };
        let out_of_range = || failure(value, target, format!("`{value}` is out of range"));

        if self.kind.is_float() {
            let v = match number {
                Number::Int(v) => v as f64,
                Number::Float(v) => v,
            };
            return match self.kind {
                Primitive::F32 if v.is_finite() && v.abs() > f64::from(f32::MAX) => Err(out_of_range()),
                Primitive::F32 => Ok(Value::F32(v as f32)),
                _ => Ok(Value::F64(v)),
            };
        }

        let v = match number {
            Number::Int(v) => v,
            Number::Float(v) => truncate(v).ok_or_else(out_of_range)?,
        };
        match self.kind {
            Primitive::I8 => i8::try_from(v).map(Value::I8).map_err(|_| out_of_range()),
            Primitive::I16 => i16::try_from(v).map(Value::I16).map_err(|_| out_of_range()),
            Primitive::I32 => i32::try_from(v).map(Value::I32).map_err(|_| out_of_range()),
            Primitive::I64 => i64::try_from(v).map(Value::I64).map_err(|_| out_of_range()),
            kind => Err(failure(value, target, format!("`{}` is not numeric", kind.name()))),
        }
    }
}

// -----------------------------------------------------------------------------
// BigIntConverter

/// Converts strings and integers to `i128`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BigIntConverter;

impl Converter for BigIntConverter {
    fn convert(&self, value: &Value, target: &ValueType, _registry: &ConvertRegistry) -> Result<Value, BeanError> {
        match read_number(value) {
            Some(Number::Int(v)) => Ok(Value::I128(v)),
            Some(Number::Float(v)) => truncate(v)
                .map(Value::I128)
                .ok_or_else(|| failure(value, target, format!("`{value}` is out of range"))),
            None => Err(failure(value, target, format!("`{value}` is not a number"))),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{BigIntConverter, NumberConverter};
    use crate::BeanError;
    use crate::convert::{ConvertRegistry, Converter};
    use crate::value::{Primitive, Value, ValueType};

    fn convert(kind: Primitive, value: Value) -> Result<Value, BeanError> {
        NumberConverter::new(kind).convert(&value, &ValueType::Primitive(kind), &ConvertRegistry::new())
    }

    #[test]
    fn parse_strings() {
        assert_eq!(convert(Primitive::I32, "123".into()), Ok(Value::I32(123)));
        assert_eq!(convert(Primitive::I64, " -7 ".into()), Ok(Value::I64(-7)));
        assert_eq!(convert(Primitive::F64, "2.5".into()), Ok(Value::F64(2.5)));
        assert_eq!(convert(Primitive::I16, "2.9".into()), Ok(Value::I16(2)));
        assert!(matches!(
            convert(Primitive::I32, "abc".into()),
            Err(BeanError::ConversionFailure { .. })
        ));
    }

    #[test]
    fn range_checks() {
        assert_eq!(convert(Primitive::I8, Value::I64(127)), Ok(Value::I8(127)));
        assert!(convert(Primitive::I8, Value::I64(128)).is_err());
        assert!(convert(Primitive::F32, Value::F64(1.0e300)).is_err());
        assert_eq!(convert(Primitive::I32, Value::Bool(true)), Ok(Value::I32(1)));
    }

    #[test]
    fn big_integers() {
        let value = BigIntConverter
            .convert(
                &"170141183460469231731687303715884105727".into(),
                &ValueType::BigInt,
                &ConvertRegistry::new(),
            )
            .unwrap();
        assert_eq!(value, Value::I128(i128::MAX));
    }
}
