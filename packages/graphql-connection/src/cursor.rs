//! Opaque cursors.
//!
//! A cursor is the standard base64 encoding of a JSON object whose values are
//! scalars (`null`, booleans, numbers, strings). Anything else decodes to
//! `None`, which callers treat as "no positional constraint".

use crate::source::Record;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

pub type Cursor = String;

/// Sort-key values of a single record, keyed by field name.
pub type CursorData = BTreeMap<String, Value>;

/// Encode cursor data into an opaque cursor.
pub fn encode(data: &CursorData) -> Cursor {
    // A map of strings to JSON values always serializes.
    let json = serde_json::to_string(data).unwrap_or_default();
    STANDARD.encode(json)
}

/// Decode an opaque cursor, returning `None` for anything that is not a
/// cursor produced by [`encode`].
pub fn decode(cursor: Option<&str>) -> Option<CursorData> {
    let cursor = cursor?;
    if cursor.is_empty() {
        return None;
    }

    let bytes = match STANDARD.decode(cursor) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Ignoring cursor {cursor:?}: {e}");
            return None;
        }
    };

    let data: CursorData = match serde_json::from_slice(&bytes) {
        Ok(data) => data,
        Err(e) => {
            debug!("Ignoring cursor {cursor:?}: {e}");
            return None;
        }
    };

    if !data.values().all(is_scalar) {
        debug!("Ignoring cursor {cursor:?}: non-scalar sort key");
        return None;
    }

    Some(data)
}

/// Pick the given fields out of a record. Missing fields are recorded as `null`.
pub fn cursor_data(record: &Record, fields: &[String]) -> CursorData {
    fields
        .iter()
        .map(|field| {
            let value = record.get(field).cloned().unwrap_or(Value::Null);
            (field.clone(), value)
        })
        .collect()
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn data(value: Value) -> CursorData {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_reverses_encode() {
        let cases = vec![
            data(json!({ "id": 1 })),
            data(json!({ "name": "Ada", "age": 36 })),
            data(json!({ "deleted": false, "score": 1.5, "parent": null })),
            data(json!({})),
        ];

        for case in cases {
            assert_eq!(decode(Some(&encode(&case))), Some(case));
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let mut a = CursorData::new();
        a.insert("b".to_string(), json!(2));
        a.insert("a".to_string(), json!(1));

        let mut b = CursorData::new();
        b.insert("a".to_string(), json!(1));
        b.insert("b".to_string(), json!(2));

        assert_eq!(encode(&a), encode(&b));
        assert_eq!(encode(&a), STANDARD.encode(r#"{"a":1,"b":2}"#));
    }

    #[test]
    fn test_malformed_cursors_decode_to_none() {
        let not_base64 = "%%%";
        let not_json = STANDARD.encode("id=1");
        let not_object = STANDARD.encode("[1,2]");
        let nested = STANDARD.encode(r#"{"id":{"$gt":1}}"#);
        let list_value = STANDARD.encode(r#"{"id":[1]}"#);
        let not_utf8 = STANDARD.encode([0xffu8, 0xfe, 0xfd]);

        assert_eq!(decode(None), None);
        assert_eq!(decode(Some("")), None);
        assert_eq!(decode(Some(not_base64)), None);
        assert_eq!(decode(Some(&not_json)), None);
        assert_eq!(decode(Some(&not_object)), None);
        assert_eq!(decode(Some(&nested)), None);
        assert_eq!(decode(Some(&list_value)), None);
        assert_eq!(decode(Some(&not_utf8)), None);
    }

    #[test]
    fn test_cursor_data_picks_unique_fields() {
        let record = json!({ "id": 7, "name": "Grace", "age": 85 });
        let fields = vec!["age".to_string(), "id".to_string(), "missing".to_string()];

        assert_eq!(
            cursor_data(&record, &fields),
            data(json!({ "age": 85, "id": 7, "missing": null }))
        );
    }
}
