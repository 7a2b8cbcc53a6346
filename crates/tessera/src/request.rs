//! Typed update requests.
//!
//! An update either replaces the whole content or merges a patch into the
//! current top-level object. The two are distinct variants so a caller
//! states which semantics it wants; there is no guessing from the payload
//! shape.

use serde_json::Value;

use crate::error::{Error, Result};

/// What an update should do to the document content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateRequest {
    /// Replace the content wholesale.
    Replace(Value),

    /// Shallow merge into the current top-level object: patch keys overwrite
    /// or extend the current keys. Both sides must be objects.
    Merge(Value),
}

impl UpdateRequest {
    /// Compute the new content from the current content.
    pub fn apply(&self, current: &Value) -> Result<Value> {
        match self {
            UpdateRequest::Replace(content) => Ok(content.clone()),
            UpdateRequest::Merge(patch) => {
                let patch_obj = patch.as_object().ok_or_else(|| {
                    Error::InvalidInput("merge patch must be an object".into())
                })?;
                let mut merged = current
                    .as_object()
                    .ok_or_else(|| {
                        Error::InvalidInput("cannot merge into non-object content".into())
                    })?
                    .clone();

                for (key, value) in patch_obj {
                    merged.insert(key.clone(), value.clone());
                }

                Ok(Value::Object(merged))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replace() {
        let current = json!({ "a": 1 });
        let request = UpdateRequest::Replace(json!({ "b": 2 }));
        assert_eq!(request.apply(&current).unwrap(), json!({ "b": 2 }));
    }

    #[test]
    fn test_merge_extends_and_overwrites() {
        let current = json!({ "a": 1, "b": 2 });
        let request = UpdateRequest::Merge(json!({ "b": 20, "c": 3 }));
        assert_eq!(
            request.apply(&current).unwrap(),
            json!({ "a": 1, "b": 20, "c": 3 })
        );
    }

    #[test]
    fn test_merge_is_shallow() {
        // Nested objects are overwritten, not merged
        let current = json!({ "nested": { "x": 1, "y": 2 } });
        let request = UpdateRequest::Merge(json!({ "nested": { "z": 3 } }));
        assert_eq!(
            request.apply(&current).unwrap(),
            json!({ "nested": { "z": 3 } })
        );
    }

    #[test]
    fn test_merge_rejects_non_objects() {
        let request = UpdateRequest::Merge(json!([1, 2]));
        assert!(matches!(
            request.apply(&json!({})),
            Err(Error::InvalidInput(_))
        ));

        let request = UpdateRequest::Merge(json!({ "a": 1 }));
        assert!(matches!(
            request.apply(&json!("text")),
            Err(Error::InvalidInput(_))
        ));
    }
}
