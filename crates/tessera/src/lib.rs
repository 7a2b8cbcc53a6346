//! # Tessera
//!
//! An identity-authenticated, versioned document store.
//!
//! ## Overview
//!
//! Tessera models mutable documents as append-only chains of signed commits:
//!
//! - **Identities** derive deterministically from 32-byte seeds and carry
//!   self-certifying `did:key` handles. No registry, no network.
//! - **Documents** are streams of commits. The stream id always resolves to
//!   the latest version; every commit id pins one version forever.
//! - **Ownership** is fixed at creation: only commits signed by the recorded
//!   owner are accepted.
//! - **Schemas** are optional structural shapes, stored as documents and
//!   enforced on every commit of streams that reference one.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use serde_json::json;
//! use tessera::{DocumentStore, Session, UpdateRequest};
//! use tessera::store::MemoryStore;
//!
//! async fn example() -> tessera::Result<()> {
//!     let docs = DocumentStore::new(MemoryStore::new());
//!     let session = Session::authenticated(tessera::Identity::generate());
//!
//!     let stream_id = docs
//!         .create_document(&session, json!({ "title": "hello" }), None)
//!         .await?;
//!
//!     docs.update(&session, &stream_id, UpdateRequest::Merge(json!({ "done": true })))
//!         .await?;
//!
//!     let doc = docs.load_document(&stream_id).await?;
//!     assert_eq!(doc.content["done"], true);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! Component crates are re-exported for convenience:
//!
//! - `tessera::core` - Commit primitives and canonical encoding
//! - `tessera::identity` - Seeds, identities, handles, resolution
//! - `tessera::schema` - Shape grammar and validation
//! - `tessera::store` - Storage backends

pub mod document;
pub mod engine;
pub mod error;
pub mod request;
pub mod session;

// Re-export component crates
pub use tessera_core as core;
pub use tessera_identity as identity;
pub use tessera_schema as schema;
pub use tessera_store as store;

// Re-export main types for convenience
pub use document::{Document, DocumentRef};
pub use engine::{DocumentStore, StoreConfig};
pub use error::{Error, Result};
pub use request::UpdateRequest;
pub use session::Session;

// Re-export commonly used component types
pub use tessera_core::{Commit, CommitId, CommitKind, Ed25519PublicKey, Keypair, StreamId};
pub use tessera_identity::{resolve, Identity, IdentityHandle, PublicDescriptor, Seed};
pub use tessera_schema::{FieldKind, FieldRule, SchemaShape};
