//! JSON import documents: an array of objects, or a single object.

use serde_json::Value;

use super::ImportError;

/// Splits a JSON document into rows numbered from 1.
///
/// Elements are returned as-is; a non-object element becomes a row error
/// later rather than failing the whole file.
pub fn parse_rows(input: &str) -> Result<Vec<(usize, Value)>, ImportError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    match serde_json::from_str::<Value>(input)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(i, item)| (i + 1, item))
            .collect()),
        object @ Value::Object(_) => Ok(vec![(1, object)]),
        _ => Err(ImportError::JsonShape),
    }
}
