//! Pure structural validation.
//!
//! Validation has no side effects and collects every violated rule before
//! returning, so a caller can report all problems at once.

use serde_json::Value;

use crate::error::{SchemaError, Violation};
use crate::shape::{FieldKind, SchemaShape};

/// Validate content against a shape.
pub fn validate(content: &Value, shape: &SchemaShape) -> Result<(), SchemaError> {
    let mut violations = Vec::new();

    let object = match content.as_object() {
        Some(o) => o,
        None => {
            return Err(SchemaError(vec![Violation::new(
                "$",
                "content must be an object",
            )]))
        }
    };

    for name in &shape.required {
        if !object.contains_key(name) {
            violations.push(Violation::new(name, "required field is missing"));
        }
    }

    for (name, value) in object {
        match shape.rule(name) {
            Some(rule) => {
                if !kind_matches(value, rule.kind) {
                    violations.push(Violation::new(
                        name,
                        format!("expected {}, got {}", rule.kind.name(), kind_of(value)),
                    ));
                    continue;
                }
                if let Value::String(s) = value {
                    let len = s.chars().count();
                    if let Some(min) = rule.min_length {
                        if len < min {
                            violations.push(Violation::new(
                                name,
                                format!("string length {} below minimum {}", len, min),
                            ));
                        }
                    }
                    if let Some(max) = rule.max_length {
                        if len > max {
                            violations.push(Violation::new(
                                name,
                                format!("string length {} exceeds maximum {}", len, max),
                            ));
                        }
                    }
                }
            }
            None => {
                if shape.deny_unknown {
                    violations.push(Violation::new(name, "unknown field"));
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(SchemaError(violations))
    }
}

fn kind_matches(value: &Value, kind: FieldKind) -> bool {
    match kind {
        FieldKind::String => value.is_string(),
        // i64/u64 only; a float-valued 5.5 is not an integer
        FieldKind::Integer => value.is_i64() || value.is_u64(),
        FieldKind::Number => value.is_number(),
        FieldKind::Boolean => value.is_boolean(),
        FieldKind::Object => value.is_object(),
        FieldKind::Array => value.is_array(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::FieldRule;
    use serde_json::json;

    fn person_shape() -> SchemaShape {
        SchemaShape::builder()
            .required_field("name", FieldRule::of(FieldKind::String).max_length(150))
            .field("age", FieldRule::of(FieldKind::Integer))
            .build()
    }

    #[test]
    fn test_conforming_content_passes() {
        let shape = person_shape();
        validate(&json!({ "name": "Alice" }), &shape).unwrap();
        validate(&json!({ "name": "Alice", "age": 30 }), &shape).unwrap();
        // Unknown fields pass by default
        validate(&json!({ "name": "Alice", "extra": true }), &shape).unwrap();
    }

    #[test]
    fn test_missing_required_field() {
        let shape = person_shape();
        let err = validate(&json!({ "age": 30 }), &shape).unwrap_err();
        let violations = err.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "name");
    }

    #[test]
    fn test_wrong_kind() {
        let shape = person_shape();
        let err = validate(&json!({ "name": 42 }), &shape).unwrap_err();
        assert_eq!(err.violations()[0].field, "name");
        assert!(err.violations()[0].reason.contains("expected string"));
    }

    #[test]
    fn test_string_length_bounds() {
        let shape = SchemaShape::builder()
            .required_field(
                "code",
                FieldRule::of(FieldKind::String).min_length(2).max_length(4),
            )
            .build();

        validate(&json!({ "code": "ab" }), &shape).unwrap();
        validate(&json!({ "code": "abcd" }), &shape).unwrap();
        assert!(validate(&json!({ "code": "a" }), &shape).is_err());
        assert!(validate(&json!({ "code": "abcde" }), &shape).is_err());
    }

    #[test]
    fn test_collects_all_violations() {
        let shape = SchemaShape::builder()
            .required_field("name", FieldRule::of(FieldKind::String))
            .required_field("age", FieldRule::of(FieldKind::Integer))
            .build();

        let err = validate(&json!({ "age": "thirty" }), &shape).unwrap_err();
        // Missing "name" and mistyped "age" are both reported
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_deny_unknown() {
        let shape = SchemaShape::builder()
            .required_field("name", FieldRule::of(FieldKind::String))
            .deny_unknown()
            .build();

        let err = validate(&json!({ "name": "Alice", "extra": 1 }), &shape).unwrap_err();
        assert_eq!(err.violations()[0].field, "extra");
    }

    #[test]
    fn test_non_object_content_rejected() {
        let shape = person_shape();
        assert!(validate(&json!([1, 2, 3]), &shape).is_err());
        assert!(validate(&json!("text"), &shape).is_err());
    }

    #[test]
    fn test_integer_vs_number() {
        let shape = SchemaShape::builder()
            .required_field("count", FieldRule::of(FieldKind::Integer))
            .required_field("ratio", FieldRule::of(FieldKind::Number))
            .build();

        validate(&json!({ "count": 3, "ratio": 0.5 }), &shape).unwrap();
        // An integer is also a number
        validate(&json!({ "count": 3, "ratio": 2 }), &shape).unwrap();
        // A float is not an integer
        assert!(validate(&json!({ "count": 3.5, "ratio": 0.5 }), &shape).is_err());
    }
}
