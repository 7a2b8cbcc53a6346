//! The document engine: the ownership and versioning contract.
//!
//! `DocumentStore` ties identity, schema, and persistence together. It is
//! the only component that mutates history, and it enforces, in order:
//! authentication, existence, ownership, schema. The storage backend only
//! guarantees position uniqueness; everything above that lives here.

use serde_json::Value;

use tessera_core::{
    canonical_bytes, canonical_content_bytes, decode_content, validate_commit, Commit,
    CommitBuilder, CommitId, CommitKind, Ed25519PublicKey, StreamId, StreamState,
};
use tessera_identity::IdentityHandle;
use tessera_schema::SchemaShape;
use tessera_store::{InsertResult, Store};

use crate::document::{Document, DocumentRef};
use crate::error::{Error, Result};
use crate::request::UpdateRequest;
use crate::session::Session;

/// Configuration for the document engine.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Re-verify locally built commits before inserting them.
    pub verify_on_submit: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            verify_on_submit: true,
        }
    }
}

/// The document store engine, generic over the storage backend.
///
/// Every operation takes `&self`; independent documents' operations may run
/// in parallel. Concurrent updates to one stream are last-writer-wins: the
/// losing writer gets [`Error::Conflict`].
pub struct DocumentStore<S: Store> {
    store: S,
    config: StoreConfig,
}

impl<S: Store> DocumentStore<S> {
    /// Create an engine with default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, StoreConfig::default())
    }

    /// Create an engine with explicit configuration.
    pub fn with_config(store: S, config: StoreConfig) -> Self {
        Self { store, config }
    }

    /// The underlying storage backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a new document owned by the session identity.
    ///
    /// If `schema` is given, the content is validated first and nothing is
    /// persisted on violation. The schema reference is fixed for the
    /// lifetime of the stream.
    pub async fn create_document(
        &self,
        session: &Session,
        content: Value,
        schema: Option<CommitId>,
    ) -> Result<StreamId> {
        let (stream_id, _) = self.create_document_inner(session, content, schema).await?;
        Ok(stream_id)
    }

    /// Publish a schema shape as an immutable document.
    ///
    /// Returns the genesis commit id, which is what documents reference:
    /// commit ids are immutable by construction, so the referenced shape can
    /// never change underneath them.
    pub async fn create_schema(&self, session: &Session, shape: &SchemaShape) -> Result<CommitId> {
        let content = serde_json::to_value(shape)
            .map_err(|e| Error::InvalidInput(format!("unserializable shape: {}", e)))?;
        let (_, commit_id) = self.create_document_inner(session, content, None).await?;
        Ok(commit_id)
    }

    async fn create_document_inner(
        &self,
        session: &Session,
        content: Value,
        schema: Option<CommitId>,
    ) -> Result<(StreamId, CommitId)> {
        let identity = session.require_identity()?;

        if let Some(schema_id) = schema {
            let shape = self.load_shape(&schema_id).await?;
            tessera_schema::validate(&content, &shape)?;
        }

        let payload =
            canonical_content_bytes(&content).map_err(|e| Error::InvalidInput(e.to_string()))?;

        let nonce = fresh_nonce();
        let owner = identity.public_key();
        let stream_id = StreamId::derive(&owner, &nonce);
        let now = now_millis();

        let mut builder = CommitBuilder::new(owner, stream_id, 1)
            .timestamp(now)
            .kind(CommitKind::Genesis)
            .nonce(nonce)
            .payload(payload);
        if let Some(schema_id) = schema {
            builder = builder.schema(schema_id);
        }
        let commit = builder.sign(identity.keypair());

        let commit_id = self.submit(&commit).await?;

        let state = StreamState::new(stream_id, owner, schema, commit_id, now);
        self.store.upsert_stream_state(&state).await?;

        tracing::info!(stream = %stream_id, commit = %commit_id, "document created");
        Ok((stream_id, commit_id))
    }

    /// Load the latest version of a document.
    pub async fn load_document(&self, stream_id: &StreamId) -> Result<Document> {
        let state = self.require_stream(stream_id).await?;
        let commit = self.require_commit(&state.head_commit_id).await?;
        self.assemble(commit, &state).await
    }

    /// Load one exact version, pinned forever to a commit id.
    pub async fn load_commit(&self, commit_id: &CommitId) -> Result<Document> {
        let commit = self.require_commit(commit_id).await?;
        let state = self.require_stream(commit.stream_id()).await?;
        self.assemble(commit, &state).await
    }

    /// Load by either kind of reference.
    pub async fn load(&self, reference: &DocumentRef) -> Result<Document> {
        match reference {
            DocumentRef::Stream(id) => self.load_document(id).await,
            DocumentRef::Commit(id) => self.load_commit(id).await,
        }
    }

    /// Append a new version to a document.
    ///
    /// The checks run in a fixed order: authentication, existence,
    /// ownership, schema. A rejected update leaves the history untouched.
    pub async fn update(
        &self,
        session: &Session,
        stream_id: &StreamId,
        request: UpdateRequest,
    ) -> Result<CommitId> {
        let identity = session.require_identity()?;
        let mut state = self.require_stream(stream_id).await?;

        if !state.is_owner(&identity.public_key()) {
            return Err(Error::OwnershipViolation {
                owner: IdentityHandle::from_public_key(state.owner),
                signer: *identity.handle(),
            });
        }

        let head = self.require_commit(&state.head_commit_id).await?;
        let current = decode_content(&head.payload)
            .map_err(|e| Error::Transport(tessera_store::StoreError::InvalidData(e.to_string())))?;
        let content = request.apply(&current)?;

        if let Some(schema_id) = state.schema_id {
            let shape = self.load_shape(&schema_id).await?;
            tessera_schema::validate(&content, &shape)?;
        }

        let payload =
            canonical_content_bytes(&content).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let now = now_millis();
        let seq = state.head_seq + 1;

        let commit = CommitBuilder::new(identity.public_key(), *stream_id, seq)
            .timestamp(now)
            .kind(CommitKind::Update)
            .prev(state.head_commit_id)
            .payload(payload)
            .sign(identity.keypair());

        let commit_id = self.submit(&commit).await?;

        if state.advance(seq, commit_id, now) {
            self.store.upsert_stream_state(&state).await?;
        }

        tracing::info!(stream = %stream_id, commit = %commit_id, seq, "document updated");
        Ok(commit_id)
    }

    /// The ordered commit history of a document.
    pub async fn document_log(&self, stream_id: &StreamId) -> Result<Vec<CommitId>> {
        self.require_stream(stream_id).await?;
        let ids = self.store.get_commit_ids(stream_id).await?;
        Ok(ids.into_iter().map(|(_, id)| id).collect())
    }

    /// List known streams, optionally filtered by owner.
    pub async fn list_streams(
        &self,
        owner: Option<&Ed25519PublicKey>,
    ) -> Result<Vec<StreamId>> {
        Ok(self.store.list_streams(owner).await?)
    }

    /// Validate (if configured) and insert a locally built commit.
    async fn submit(&self, commit: &Commit) -> Result<CommitId> {
        if self.config.verify_on_submit {
            validate_commit(commit)?;
        }

        let canonical = canonical_bytes(commit);
        let commit_id = commit.compute_id();

        match self.store.insert_commit(commit, &canonical).await? {
            InsertResult::Inserted | InsertResult::AlreadyExists => Ok(commit_id),
            InsertResult::Conflict { existing } => {
                tracing::warn!(
                    stream = %commit.stream_id(),
                    seq = commit.seq(),
                    existing = %existing,
                    "lost insert race"
                );
                Err(Error::Conflict {
                    stream_id: *commit.stream_id(),
                    seq: commit.seq(),
                })
            }
        }
    }

    async fn require_stream(&self, stream_id: &StreamId) -> Result<StreamState> {
        self.store
            .get_stream_state(stream_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("stream {}", stream_id)))
    }

    async fn require_commit(&self, commit_id: &CommitId) -> Result<Commit> {
        self.store
            .get_commit(commit_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("commit {}", commit_id)))
    }

    /// Load and decode a schema shape referenced by its genesis commit id.
    async fn load_shape(&self, schema_id: &CommitId) -> Result<SchemaShape> {
        let commit = self
            .store
            .get_commit(schema_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("schema commit {}", schema_id)))?;

        let content = decode_content(&commit.payload)
            .map_err(|e| Error::InvalidInput(format!("undecodable schema content: {}", e)))?;

        serde_json::from_value(content)
            .map_err(|e| Error::InvalidInput(format!("not a schema shape: {}", e)))
    }

    /// Build a document view from a commit and its stream state.
    async fn assemble(&self, commit: Commit, state: &StreamState) -> Result<Document> {
        let content = decode_content(&commit.payload)
            .map_err(|e| Error::Transport(tessera_store::StoreError::InvalidData(e.to_string())))?;

        let seq = commit.seq();
        let log: Vec<CommitId> = self
            .store
            .get_commit_ids(&state.stream_id)
            .await?
            .into_iter()
            .filter(|(s, _)| *s <= seq)
            .map(|(_, id)| id)
            .collect();

        Ok(Document {
            stream_id: state.stream_id,
            commit_id: commit.compute_id(),
            genesis_id: state.genesis_id,
            owner: state.owner,
            owner_handle: IdentityHandle::from_public_key(state.owner),
            schema_id: state.schema_id,
            content,
            seq,
            log,
        })
    }
}

/// A fresh per-document nonce from OS entropy.
fn fresh_nonce() -> [u8; 32] {
    use rand::RngCore;
    let mut nonce = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut nonce);
    nonce
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
