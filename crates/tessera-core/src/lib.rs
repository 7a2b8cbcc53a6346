//! # Tessera Core
//!
//! Pure primitives for Tessera: commits, streams, and canonicalization.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`Commit`] - One immutable, signed version of a document
//! - [`CommitId`] - Content-addressed identifier (Blake3 hash)
//! - [`StreamId`] - Stable identifier for a versioned document
//! - [`CommitKind`] - Genesis or update
//!
//! ## Canonicalization
//!
//! All commits and document content are encoded using deterministic CBOR.
//! See the [`canonical`] and [`content`] modules.

pub mod canonical;
pub mod commit;
pub mod content;
pub mod crypto;
pub mod error;
pub mod stream;
pub mod types;
pub mod validation;

pub use canonical::{canonical_bytes, canonical_header_bytes, decode_commit};
pub use commit::{Commit, CommitBuilder, CommitHeader, CommitKind, MAX_PAYLOAD_BYTES};
pub use content::{canonical_content_bytes, decode_content};
pub use crypto::{Blake3Hash, Ed25519PublicKey, Ed25519Signature, Keypair};
pub use error::{CoreError, ValidationError};
pub use stream::{StreamId, StreamState};
pub use types::CommitId;
pub use validation::{validate_commit, validate_commit_against_state, validate_commit_structure};
