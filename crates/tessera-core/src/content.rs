//! Canonical encoding of document content.
//!
//! Document content is structured data (JSON-shaped: maps, arrays, strings,
//! numbers, booleans, null). The payload of a commit is the canonical CBOR
//! encoding of this content, so two logically equal documents always produce
//! the same payload bytes and the same payload hash.

use ciborium::value::Value as CborValue;
use serde_json::Value as JsonValue;

use crate::canonical::encode_value_to;
use crate::error::CoreError;

/// Encode document content to canonical payload bytes.
pub fn canonical_content_bytes(content: &JsonValue) -> Result<Vec<u8>, CoreError> {
    let cbor = json_to_cbor(content)?;
    let mut buf = Vec::new();
    encode_value_to(&mut buf, &cbor);
    Ok(buf)
}

/// Decode payload bytes back into document content.
pub fn decode_content(bytes: &[u8]) -> Result<JsonValue, CoreError> {
    let cursor = std::io::Cursor::new(bytes);
    let cbor: CborValue =
        ciborium::from_reader(cursor).map_err(|e| CoreError::DecodingError(e.to_string()))?;
    cbor_to_json(&cbor)
}

fn json_to_cbor(value: &JsonValue) -> Result<CborValue, CoreError> {
    Ok(match value {
        JsonValue::Null => CborValue::Null,
        JsonValue::Bool(b) => CborValue::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CborValue::Integer(i.into())
            } else if let Some(u) = n.as_u64() {
                CborValue::Integer(u.into())
            } else if let Some(f) = n.as_f64() {
                CborValue::Float(f)
            } else {
                return Err(CoreError::EncodingError(format!(
                    "unrepresentable number: {}",
                    n
                )));
            }
        }
        JsonValue::String(s) => CborValue::Text(s.clone()),
        JsonValue::Array(arr) => {
            let items = arr.iter().map(json_to_cbor).collect::<Result<Vec<_>, _>>()?;
            CborValue::Array(items)
        }
        JsonValue::Object(map) => {
            let entries = map
                .iter()
                .map(|(k, v)| Ok((CborValue::Text(k.clone()), json_to_cbor(v)?)))
                .collect::<Result<Vec<_>, CoreError>>()?;
            CborValue::Map(entries)
        }
    })
}

fn cbor_to_json(value: &CborValue) -> Result<JsonValue, CoreError> {
    Ok(match value {
        CborValue::Null => JsonValue::Null,
        CborValue::Bool(b) => JsonValue::Bool(*b),
        CborValue::Integer(i) => {
            let n = i128::from(*i);
            if let Ok(i) = i64::try_from(n) {
                JsonValue::Number(i.into())
            } else if let Ok(u) = u64::try_from(n) {
                JsonValue::Number(u.into())
            } else {
                return Err(CoreError::DecodingError(format!(
                    "integer out of range: {}",
                    n
                )));
            }
        }
        CborValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .ok_or_else(|| CoreError::DecodingError("non-finite float".into()))?,
        CborValue::Text(s) => JsonValue::String(s.clone()),
        CborValue::Array(arr) => {
            let items = arr.iter().map(cbor_to_json).collect::<Result<Vec<_>, _>>()?;
            JsonValue::Array(items)
        }
        CborValue::Map(entries) => {
            let mut map = serde_json::Map::new();
            for (k, v) in entries {
                let key = match k {
                    CborValue::Text(s) => s.clone(),
                    _ => {
                        return Err(CoreError::DecodingError(
                            "non-text map key in content".into(),
                        ))
                    }
                };
                map.insert(key, cbor_to_json(v)?);
            }
            JsonValue::Object(map)
        }
        _ => {
            return Err(CoreError::DecodingError(
                "unsupported CBOR type in content".into(),
            ))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_roundtrip() {
        let content = json!({
            "title": "hello",
            "count": 42,
            "tags": ["a", "b"],
            "nested": { "flag": true, "nothing": null }
        });

        let bytes = canonical_content_bytes(&content).unwrap();
        let decoded = decode_content(&bytes).unwrap();
        assert_eq!(content, decoded);
    }

    #[test]
    fn test_content_encoding_deterministic() {
        let a = json!({ "b": 2, "a": 1, "c": 3 });
        let b = json!({ "a": 1, "c": 3, "b": 2 });

        let bytes_a = canonical_content_bytes(&a).unwrap();
        let bytes_b = canonical_content_bytes(&b).unwrap();
        assert_eq!(bytes_a, bytes_b);
    }

    #[test]
    fn test_key_ordering_by_encoded_bytes() {
        // Shorter keys encode before longer ones with the same prefix
        let content = json!({ "ab": 1, "a": 2 });
        let bytes = canonical_content_bytes(&content).unwrap();

        // Map of 2, then text "a" (0x61 'a'), then 2, then text "ab"
        assert_eq!(bytes[0], 0xa2);
        assert_eq!(bytes[1], 0x61);
        assert_eq!(bytes[2], b'a');
        assert_eq!(bytes[3], 0x02);
        assert_eq!(bytes[4], 0x62);
        assert_eq!(&bytes[5..7], b"ab");
    }

    #[test]
    fn test_negative_integer() {
        let content = json!({ "n": -42 });
        let bytes = canonical_content_bytes(&content).unwrap();
        let decoded = decode_content(&bytes).unwrap();
        assert_eq!(content, decoded);
    }

    #[test]
    fn test_float_roundtrip() {
        let content = json!({ "pi": 3.14159 });
        let bytes = canonical_content_bytes(&content).unwrap();
        let decoded = decode_content(&bytes).unwrap();
        assert_eq!(content, decoded);
    }

    #[test]
    fn test_empty_object() {
        let content = json!({});
        let bytes = canonical_content_bytes(&content).unwrap();
        assert_eq!(bytes, vec![0xa0]);
        assert_eq!(decode_content(&bytes).unwrap(), content);
    }
}
