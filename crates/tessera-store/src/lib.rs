//! # Tessera Store
//!
//! Storage backends for Tessera commits and stream state.
//!
//! The [`Store`] trait is the persistence seam: the document engine is
//! written against it, and backends implement it. Two backends ship here:
//!
//! - [`SqliteStore`] - durable, file-backed (primary)
//! - [`MemoryStore`] - ephemeral, for tests
//!
//! The store enforces only position uniqueness (one commit per
//! (stream, seq)) and idempotent inserts. Ownership, signatures, and schema
//! rules are the engine's responsibility.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{InsertResult, Store};
