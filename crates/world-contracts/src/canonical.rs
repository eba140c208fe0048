//! Canonical JSON serialization.
//!
//! Two semantically identical values always serialize to identical bytes:
//! object keys are sorted at every level, pretty output uses a fixed 2-space
//! indent and ends with a single newline.

use crate::error::ContractError;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Rebuild `value` with object keys in lexicographic order at every level.
///
/// Insertion order is sorted order, so the result is canonical whether or not
/// `serde_json` keeps insertion order.
pub fn sort_json_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            let mut sorted = Map::new();
            for key in keys {
                if let Some(item) = map.get(key) {
                    sorted.insert(key.clone(), sort_json_value(item));
                }
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_json_value).collect()),
        _ => value.clone(),
    }
}

/// Compact canonical form: sorted keys, no insignificant whitespace.
pub fn canonical_json_compact(value: &Value) -> String {
    // Serializing a `Value` cannot fail: keys are strings and numbers are finite.
    serde_json::to_string(&sort_json_value(value)).unwrap_or_default()
}

/// Pretty canonical form used for every artifact written to disk.
pub fn canonical_json_pretty<T: Serialize>(value: &T) -> Result<String, ContractError> {
    let raw = serde_json::to_value(value).map_err(|e| ContractError::Serialize(e.to_string()))?;
    let mut rendered = serde_json::to_string_pretty(&sort_json_value(&raw))
        .map_err(|e| ContractError::Serialize(e.to_string()))?;
    rendered.push('\n');
    Ok(rendered)
}

/// Lowercase hex SHA-256 of raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let hash = Sha256::digest(bytes);
    format!("{hash:x}")
}

/// SHA-256 of the compact canonical form of `value`.
pub fn stable_hash(value: &Value) -> String {
    sha256_hex(canonical_json_compact(value).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pretty_output_sorts_nested_keys() {
        let value = json!({"b": {"z": 1, "a": 2}, "a": [ {"y": true, "x": null} ]});
        let rendered = canonical_json_pretty(&value).expect("value should serialize");
        assert_eq!(
            rendered,
            "{\n  \"a\": [\n    {\n      \"x\": null,\n      \"y\": true\n    }\n  ],\n  \"b\": {\n    \"a\": 2,\n    \"z\": 1\n  }\n}\n"
        );
    }

    #[test]
    fn compact_output_has_no_whitespace() {
        let value = json!({"shot_id": "s_shot_000", "duration_sec": 3.0});
        assert_eq!(
            canonical_json_compact(&value),
            r#"{"duration_sec":3.0,"shot_id":"s_shot_000"}"#
        );
    }

    #[test]
    fn stable_hash_ignores_key_order() {
        let left = json!({"a": 1, "b": 2});
        let right = json!({"b": 2, "a": 1});
        assert_eq!(stable_hash(&left), stable_hash(&right));
        assert_eq!(stable_hash(&left).len(), 64);
    }

    #[test]
    fn sha256_of_empty_input_is_known_constant() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
