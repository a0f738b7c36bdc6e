use alloc::borrow::Cow;
use alloc::format;
use alloc::string::ToString;
use alloc::vec::Vec;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::BeanError;
use crate::convert::{ConvertRegistry, Converter};
use crate::value::{Value, ValueType};

/// Date-time layout with a space instead of `T`, also read by default.
const SPACED_DATE_TIME: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Temporal {
    Date,
    Time,
    DateTime,
}

// -----------------------------------------------------------------------------
// TemporalConverter

/// Converts strings to dates, times or date-times.
///
/// Without patterns, strings are read in ISO 8601 form, date-times also
/// with a space separator. With
/// [`with_patterns`](Self::with_patterns), each `chrono` format string is
/// tried in order.
///
/// Date-times also convert to their date or time part, and dates to
/// midnight of that day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalConverter {
    kind: Temporal,
    patterns: Vec<Cow<'static, str>>,
}

impl TemporalConverter {
    #[inline]
    pub const fn date() -> Self {
        Self {
            kind: Temporal::Date,
            patterns: Vec::new(),
        }
    }

    #[inline]
    pub const fn time() -> Self {
        Self {
            kind: Temporal::Time,
            patterns: Vec::new(),
        }
    }

    #[inline]
    pub const fn date_time() -> Self {
        Self {
            kind: Temporal::DateTime,
            patterns: Vec::new(),
        }
    }

    /// Replaces the accepted formats, e.g. `"%d/%m/%Y"`.
    pub fn with_patterns<P>(mut self, patterns: impl IntoIterator<Item = P>) -> Self
    where
        P: Into<Cow<'static, str>>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    pub fn patterns(&self) -> &[Cow<'static, str>] {
        &self.patterns
    }

    fn parse(&self, text: &str) -> Option<Value> {
        if self.patterns.is_empty() {
            return match self.kind {
                Temporal::Date => text.parse().ok().map(Value::Date),
                Temporal::Time => text.parse().ok().map(Value::Time),
                Temporal::DateTime => text
                    .parse::<NaiveDateTime>()
                    .or_else(|_| NaiveDateTime::parse_from_str(text, SPACED_DATE_TIME))
                    .ok()
                    .map(Value::DateTime),
            };
        }
        self.patterns.iter().find_map(|pattern| match self.kind {
            Temporal::Date => NaiveDate::parse_from_str(text, pattern).ok().map(Value::Date),
            Temporal::Time => NaiveTime::parse_from_str(text, pattern).ok().map(Value::Time),
            Temporal::DateTime => NaiveDateTime::parse_from_str(text, pattern)
                .ok()
                .map(Value::DateTime),
        })
    }
}

impl Converter for TemporalConverter {
    fn convert(&self, value: &Value, target: &ValueType, _registry: &ConvertRegistry) -> Result<Value, BeanError> {
        let converted = match (self.kind, value) {
            (Temporal::Date, Value::Date(_))
            | (Temporal::Time, Value::Time(_))
            | (Temporal::DateTime, Value::DateTime(_)) => Some(value.clone()),
            (Temporal::Date, Value::DateTime(v)) => Some(Value::Date(v.date())),
            (Temporal::Time, Value::DateTime(v)) => Some(Value::Time(v.time())),
            (Temporal::DateTime, Value::Date(v)) => Some(Value::DateTime(v.and_time(NaiveTime::MIN))),
            (_, Value::Str(text)) => self.parse(text.trim()),
            _ => None,
        };
        converted.ok_or_else(|| {
            BeanError::conversion(
                value.type_name(),
                target.to_string(),
                format!("`{value}` does not match the accepted formats"),
            )
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::TemporalConverter;
    use crate::convert::{ConvertRegistry, Converter};
    use crate::value::{Value, ValueType};

    #[test]
    fn iso_and_patterns() {
        let registry = ConvertRegistry::new();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let iso = TemporalConverter::date();
        assert_eq!(iso.convert(&"2024-03-01".into(), &ValueType::Date, &registry), Ok(Value::Date(date)));
        assert!(iso.convert(&"01/03/2024".into(), &ValueType::Date, &registry).is_err());

        let custom = TemporalConverter::date().with_patterns(["%d/%m/%Y", "%Y%m%d"]);
        assert_eq!(custom.convert(&"01/03/2024".into(), &ValueType::Date, &registry), Ok(Value::Date(date)));
        assert_eq!(custom.convert(&"20240301".into(), &ValueType::Date, &registry), Ok(Value::Date(date)));
    }

    #[test]
    fn between_kinds() {
        let registry = ConvertRegistry::new();
        let at = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();

        let time = TemporalConverter::time()
            .convert(&Value::DateTime(at), &ValueType::Time, &registry)
            .unwrap();
        assert_eq!(time, Value::Time(NaiveTime::from_hms_opt(10, 30, 0).unwrap()));
    }

    #[test]
    fn rendered_values_read_back() {
        let registry = ConvertRegistry::new();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let at = date.and_hms_milli_opt(10, 30, 0, 250).unwrap();

        let cases = [
            (TemporalConverter::date(), ValueType::Date, Value::Date(date)),
            (TemporalConverter::time(), ValueType::Time, Value::Time(at.time())),
            (TemporalConverter::date_time(), ValueType::DateTime, Value::DateTime(at)),
        ];
        for (converter, ty, value) in cases {
            let text = Value::from(value.to_string().as_str());
            assert_eq!(converter.convert(&text, &ty, &registry), Ok(value));
        }

        assert_eq!(Value::DateTime(at).to_string(), "2024-03-01T10:30:00.250");
        assert_eq!(
            TemporalConverter::date_time().convert(&"2024-03-01 10:30:00.250".into(), &ValueType::DateTime, &registry),
            Ok(Value::DateTime(at))
        );
    }
}
