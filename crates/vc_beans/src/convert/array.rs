use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use crate::BeanError;
use crate::convert::{ConvertRegistry, Converter};
use crate::value::{Value, ValueType};

/// Splits a delimited list such as `{a, "b, c", d}` into its elements.
///
/// Braces around the whole list are optional. Elements are separated by
/// commas, trimmed, and may be quoted with `"` or `'` to keep commas and
/// surrounding blanks.
fn split_elements(text: &str) -> Vec<String> {
    let text = text.trim();
    let text = text
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(text);
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut quoted = false;

    for c in text.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                if current.trim().is_empty() {
                    current.clear();
                }
                quote = Some(c);
                quoted = true;
            }
            (None, ',') => {
                out.push(finish(&mut current, quoted));
                quoted = false;
            }
            (None, c) if quoted && c.is_whitespace() => {}
            (None, c) => current.push(c),
        }
    }
    out.push(finish(&mut current, quoted));
    out
}

fn finish(current: &mut String, quoted: bool) -> String {
    let element = core::mem::take(current);
    if quoted { element } else { element.trim().to_string() }
}

// -----------------------------------------------------------------------------
// ArrayConverter

/// Converts lists, arrays and delimited strings to typed arrays.
///
/// Elements are converted with the registry's converter for the
/// component type. A scalar becomes a one-element array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArrayConverter;

impl Converter for ArrayConverter {
    fn convert(&self, value: &Value, target: &ValueType, registry: &ConvertRegistry) -> Result<Value, BeanError> {
        let component = target.component().unwrap_or(&ValueType::Any);
        let items: Vec<Value> = match value {
            Value::List(list) => list.borrow().clone(),
            Value::Array(array) => array.borrow().items().to_vec(),
            Value::Str(text) => split_elements(text).into_iter().map(Value::Str).collect(),
            other => vec![other.clone()],
        };
        let items = items
            .iter()
            .map(|item| registry.convert(item, component))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::array(component.clone(), items))
    }
}

// -----------------------------------------------------------------------------
// Tests
