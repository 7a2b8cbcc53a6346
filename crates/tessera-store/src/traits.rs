//! Store trait: the abstract interface for commit persistence.
//!
//! This trait keeps the document engine storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use tessera_core::{Commit, CommitId, Ed25519PublicKey, StreamId, StreamState};

use crate::error::Result;

/// Result of inserting a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Commit was inserted successfully.
    Inserted,
    /// Commit already exists (idempotent, not an error).
    AlreadyExists,
    /// Conflict: a different commit occupies the same stream position.
    Conflict {
        /// The existing commit id at this position.
        existing: CommitId,
    },
}

/// The Store trait: async interface for commit persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, `spawn_blocking` is used internally to avoid blocking the
/// runtime.
///
/// # Design Notes
///
/// - **Idempotent inserts**: Inserting the same commit twice returns
///   `AlreadyExists`.
/// - **Conflict detection**: Inserting a different commit at an occupied
///   (stream, seq) position returns `Conflict` with the existing id. This is
///   how last-writer-wins races surface to the losing writer.
/// - The store does NOT enforce ownership or schema rules; that is the
///   engine's job. It only guarantees position uniqueness and durability.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a commit into the store.
    ///
    /// `canonical` is the commit's canonical encoding, cached to avoid
    /// recomputation on read.
    async fn insert_commit(&self, commit: &Commit, canonical: &[u8]) -> Result<InsertResult>;

    /// Get a commit by its content-addressed id.
    async fn get_commit(&self, id: &CommitId) -> Result<Option<Commit>>;

    /// Get the ordered commit ids of a stream (`seq` ascending).
    async fn get_commit_ids(&self, stream_id: &StreamId) -> Result<Vec<(u64, CommitId)>>;

    /// Check if a commit exists by id.
    async fn has_commit(&self, id: &CommitId) -> Result<bool>;

    /// Get the state of a stream.
    async fn get_stream_state(&self, stream_id: &StreamId) -> Result<Option<StreamState>>;

    /// Update or insert stream state.
    async fn upsert_stream_state(&self, state: &StreamState) -> Result<()>;

    /// List all streams, optionally filtered by owner.
    async fn list_streams(&self, owner: Option<&Ed25519PublicKey>) -> Result<Vec<StreamId>>;
}
