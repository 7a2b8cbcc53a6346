//! Error types for Tessera Schema.

use std::fmt;

use thiserror::Error;

/// One failed rule: which field, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The field the rule applies to.
    pub field: String,

    /// What went wrong.
    pub reason: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Content failed validation. Carries every violated rule, not just the
/// first.
#[derive(Debug, Error)]
#[error("content violates schema ({} violation(s))", .0.len())]
pub struct SchemaError(pub Vec<Violation>);

impl SchemaError {
    /// The violated rules.
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }
}
