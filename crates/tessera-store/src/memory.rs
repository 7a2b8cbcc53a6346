//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use tessera_core::{Commit, CommitId, Ed25519PublicKey, StreamId, StreamState};

use crate::error::Result;
use crate::traits::{InsertResult, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Commits indexed by id.
    commits: HashMap<CommitId, Commit>,

    /// Position index: (stream_id, seq) -> commit_id.
    positions: HashMap<(StreamId, u64), CommitId>,

    /// Stream states.
    streams: HashMap<StreamId, StreamState>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_commit(&self, commit: &Commit, _canonical: &[u8]) -> Result<InsertResult> {
        let mut inner = self.inner.write().await;

        let commit_id = commit.compute_id();
        let stream_id = *commit.stream_id();
        let seq = commit.seq();

        if inner.commits.contains_key(&commit_id) {
            return Ok(InsertResult::AlreadyExists);
        }

        if let Some(&existing) = inner.positions.get(&(stream_id, seq)) {
            return Ok(InsertResult::Conflict { existing });
        }

        inner.commits.insert(commit_id, commit.clone());
        inner.positions.insert((stream_id, seq), commit_id);

        Ok(InsertResult::Inserted)
    }

    async fn get_commit(&self, id: &CommitId) -> Result<Option<Commit>> {
        let inner = self.inner.read().await;
        Ok(inner.commits.get(id).cloned())
    }

    async fn get_commit_ids(&self, stream_id: &StreamId) -> Result<Vec<(u64, CommitId)>> {
        let inner = self.inner.read().await;

        let mut ids: Vec<(u64, CommitId)> = inner
            .positions
            .iter()
            .filter(|((sid, _), _)| sid == stream_id)
            .map(|((_, seq), id)| (*seq, *id))
            .collect();
        ids.sort_by_key(|(seq, _)| *seq);

        Ok(ids)
    }

    async fn has_commit(&self, id: &CommitId) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner.commits.contains_key(id))
    }

    async fn get_stream_state(&self, stream_id: &StreamId) -> Result<Option<StreamState>> {
        let inner = self.inner.read().await;
        Ok(inner.streams.get(stream_id).cloned())
    }

    async fn upsert_stream_state(&self, state: &StreamState) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.streams.insert(state.stream_id, state.clone());
        Ok(())
    }

    async fn list_streams(&self, owner: Option<&Ed25519PublicKey>) -> Result<Vec<StreamId>> {
        let inner = self.inner.read().await;

        let streams = match owner {
            Some(owner) => inner
                .streams
                .values()
                .filter(|s| &s.owner == owner)
                .map(|s| s.stream_id)
                .collect(),
            None => inner.streams.keys().copied().collect(),
        };

        Ok(streams)
    }
}
