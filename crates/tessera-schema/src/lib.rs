//! # Tessera Schema
//!
//! Structural shape validation for Tessera documents.
//!
//! This is deliberately not a JSON-Schema engine. The grammar is a small
//! structural shape: required fields, per-field kinds, and string length
//! bounds. Shapes serialize as ordinary document content, so they are stored
//! and versioned like any other document.

pub mod error;
pub mod shape;
pub mod validate;

pub use error::{SchemaError, Violation};
pub use shape::{FieldKind, FieldRule, SchemaShape, SchemaShapeBuilder};
pub use validate::validate;
