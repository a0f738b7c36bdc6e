use alloc::format;
use alloc::string::ToString;
use std::path::PathBuf;

use url::Url;

use crate::BeanError;
use crate::convert::{ConvertRegistry, Converter};
use crate::value::{Value, ValueType};

// -----------------------------------------------------------------------------
// UrlConverter

/// Parses absolute URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlConverter;

impl Converter for UrlConverter {
    fn convert(&self, value: &Value, target: &ValueType, _registry: &ConvertRegistry) -> Result<Value, BeanError> {
        match value {
            Value::Url(url) => Ok(Value::Url(url.clone())),
            Value::Str(text) => Url::parse(text.trim()).map(Value::Url).map_err(|err| {
                BeanError::conversion(value.type_name(), target.to_string(), format!("`{text}`: {err}"))
            }),
            other => Err(BeanError::conversion(
                other.type_name(),
                target.to_string(),
                "expected a string",
            )),
        }
    }
}

// -----------------------------------------------------------------------------
// PathConverter

/// Converts strings to file system paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathConverter;

impl Converter for PathConverter {
    fn convert(&self, value: &Value, target: &ValueType, _registry: &ConvertRegistry) -> Result<Value, BeanError> {
        match value {
            Value::Path(path) => Ok(Value::Path(path.clone())),
            Value::Str(text) => Ok(Value::Path(PathBuf::from(text))),
            Value::Url(url) => url.to_file_path().map(Value::Path).map_err(|()| {
                BeanError::conversion(value.type_name(), target.to_string(), format!("`{url}` is not a file URL"))
            }),
            other => Err(BeanError::conversion(
                other.type_name(),
                target.to_string(),
                "expected a string",
            )),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{PathConverter, UrlConverter};
    use crate::convert::{ConvertRegistry, Converter};
    use crate::value::{Value, ValueType};

    #[test]
    fn urls() {
        let registry = ConvertRegistry::new();
        let url = UrlConverter
            .convert(&"https://example.com/a?b=1".into(), &ValueType::Url, &registry)
            .unwrap();
        assert_eq!(url.to_string(), "https://example.com/a?b=1");
        assert!(UrlConverter.convert(&"not a url".into(), &ValueType::Url, &registry).is_err());
    }

    #[test]
    fn paths() {
        let registry = ConvertRegistry::new();
        let path = PathConverter
            .convert(&"/tmp/data.txt".into(), &ValueType::Path, &registry)
            .unwrap();
        assert_eq!(path, Value::Path("/tmp/data.txt".into()));
    }
}
