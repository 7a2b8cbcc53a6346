//! The structural shape grammar.
//!
//! A shape describes the top-level object of a document: which fields exist,
//! their kinds, and per-field rules. Shapes are themselves stored as ordinary
//! documents, so they serialize as plain JSON-shaped content.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// The kind of value a field must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl FieldKind {
    /// Human-readable name, used in violation reasons.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Object => "object",
            FieldKind::Array => "array",
        }
    }
}

/// Rules for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// The required kind.
    pub kind: FieldKind,

    /// Minimum string length (strings only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    /// Maximum string length (strings only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl FieldRule {
    /// A rule requiring only a kind.
    pub fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            min_length: None,
            max_length: None,
        }
    }

    /// Set a minimum string length.
    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    /// Set a maximum string length.
    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }
}

/// A structural shape for document content.
///
/// Built with [`SchemaShape::builder`]; validated with
/// [`crate::validate::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaShape {
    /// Per-field rules, keyed by field name.
    pub fields: BTreeMap<String, FieldRule>,

    /// Fields that must be present.
    pub required: BTreeSet<String>,

    /// Reject fields the shape does not mention.
    #[serde(default)]
    pub deny_unknown: bool,
}

impl SchemaShape {
    /// Start building a shape.
    pub fn builder() -> SchemaShapeBuilder {
        SchemaShapeBuilder::default()
    }

    /// Look up the rule for a field.
    pub fn rule(&self, field: &str) -> Option<&FieldRule> {
        self.fields.get(field)
    }

    /// Whether a field is required.
    pub fn is_required(&self, field: &str) -> bool {
        self.required.contains(field)
    }
}

/// Builder for [`SchemaShape`].
#[derive(Debug, Default)]
pub struct SchemaShapeBuilder {
    fields: BTreeMap<String, FieldRule>,
    required: BTreeSet<String>,
    deny_unknown: bool,
}

impl SchemaShapeBuilder {
    /// Declare an optional field.
    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.insert(name.into(), rule);
        self
    }

    /// Declare a required field.
    pub fn required_field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        let name = name.into();
        self.required.insert(name.clone());
        self.fields.insert(name, rule);
        self
    }

    /// Reject fields not declared in the shape.
    pub fn deny_unknown(mut self) -> Self {
        self.deny_unknown = true;
        self
    }

    pub fn build(self) -> SchemaShape {
        SchemaShape {
            fields: self.fields,
            required: self.required,
            deny_unknown: self.deny_unknown,
        }
    }
}
