//! Upstream payload decoding.
//!
//! The upstream is a JSON array of country objects. Field names are matched
//! case-insensitively at every level: keys are folded to lowercase before the
//! typed decode, so `"Name"`, `"NAME"` and `"name"` all land on the same
//! field. When two keys fold to the same name only one of them survives.

use serde_json::{Map, Value};

use crate::country::CountryRecord;
use crate::error::ParseError;

/// Decodes an upstream payload into country records.
///
/// An empty array is an empty list. A top-level `null` is an error rather
/// than an empty list: it means the upstream answered but had nothing usable.
/// `null` entries inside the array are skipped.
pub fn parse(payload: &[u8]) -> Result<Vec<CountryRecord>, ParseError> {
    let value: Value = serde_json::from_slice(payload)?;
    let records: Option<Vec<Option<CountryRecord>>> = serde_json::from_value(fold_keys(value))?;

    let records = records.ok_or(ParseError::Empty)?;
    Ok(records.into_iter().flatten().collect())
}

fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), fold_keys(v)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(fold_keys).collect()),
        other => other,
    }
}
