//! Commit: one immutable version of a document.
//!
//! A commit is a signed, content-addressed event. Once created, it cannot be
//! edited; a document changes by appending new commits to its stream.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_bytes, signed_message_from_parts};
use crate::crypto::{Blake3Hash, Ed25519PublicKey, Ed25519Signature, Keypair};
use crate::stream::StreamId;
use crate::types::CommitId;

/// The current commit schema version.
pub const COMMIT_VERSION: u8 = 1;

/// Maximum payload size in bytes.
pub const MAX_PAYLOAD_BYTES: usize = 256 * 1024;

/// Domain prefix hashed into every commit id.
pub const ID_DOMAIN: &[u8] = b"tessera/commit-id/v1:";

/// The kind of commit within a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CommitKind {
    /// First commit in a stream (seq=1). Fixes owner, nonce, and schema.
    Genesis = 0x0001,
    /// A content update appended to an existing stream.
    Update = 0x0002,
}

impl CommitKind {
    /// Convert to u16 for serialization.
    pub fn to_u16(self) -> u16 {
        self as u16
    }

    /// Try to parse from u16.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0001 => Some(Self::Genesis),
            0x0002 => Some(Self::Update),
            _ => None,
        }
    }

    /// Check if this is a genesis commit kind.
    pub fn is_genesis(self) -> bool {
        self == Self::Genesis
    }
}

/// The header of a commit, containing all metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitHeader {
    /// Schema version (currently 1).
    pub version: u8,

    /// The author's public key (32 bytes).
    pub author: Ed25519PublicKey,

    /// The stream this commit belongs to (32 bytes).
    pub stream_id: StreamId,

    /// Sequence number within the stream (1-indexed).
    pub seq: u64,

    /// Author-claimed timestamp (Unix milliseconds). Untrusted.
    pub timestamp: i64,

    /// The kind of commit.
    pub kind: CommitKind,

    /// Id of the previous commit in the stream (None iff genesis).
    pub prev_commit_id: Option<CommitId>,

    /// Schema reference (genesis only, optional).
    pub schema_id: Option<CommitId>,

    /// Per-document nonce used to derive the stream id (genesis only).
    pub nonce: Option<[u8; 32]>,

    /// Blake3 hash of the payload bytes.
    pub payload_hash: Blake3Hash,
}

/// A complete commit: header + payload + signature.
///
/// Serialized only through [`crate::canonical::canonical_bytes`]; there is
/// no serde form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// The commit header.
    pub header: CommitHeader,

    /// The payload: canonical encoding of the document content.
    pub payload: Bytes,

    /// Ed25519 signature over (sign_domain || canonical_header || payload).
    pub signature: Ed25519Signature,
}

impl Commit {
    /// Compute the commit ID: Blake3(ID_DOMAIN || canonical bytes).
    pub fn compute_id(&self) -> CommitId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ID_DOMAIN);
        hasher.update(&canonical_bytes(self));
        CommitId(*hasher.finalize().as_bytes())
    }

    /// Get the author's public key.
    pub fn author(&self) -> &Ed25519PublicKey {
        &self.header.author
    }

    /// Get the stream ID.
    pub fn stream_id(&self) -> &StreamId {
        &self.header.stream_id
    }

    /// Get the sequence number.
    pub fn seq(&self) -> u64 {
        self.header.seq
    }

    /// Get the commit kind.
    pub fn kind(&self) -> CommitKind {
        self.header.kind
    }

    /// Check if this is the genesis commit of its stream.
    pub fn is_genesis(&self) -> bool {
        self.header.kind == CommitKind::Genesis && self.header.seq == 1
    }
}

/// Builder for creating commits.
pub struct CommitBuilder {
    author: Ed25519PublicKey,
    stream_id: StreamId,
    seq: u64,
    timestamp: i64,
    kind: CommitKind,
    prev_commit_id: Option<CommitId>,
    schema_id: Option<CommitId>,
    nonce: Option<[u8; 32]>,
    payload: Bytes,
}

impl CommitBuilder {
    /// Start building a commit.
    pub fn new(author: Ed25519PublicKey, stream_id: StreamId, seq: u64) -> Self {
        Self {
            author,
            stream_id,
            seq,
            timestamp: 0,
            kind: CommitKind::Update,
            prev_commit_id: None,
            schema_id: None,
            nonce: None,
            payload: Bytes::new(),
        }
    }

    /// Set the timestamp.
    pub fn timestamp(mut self, ts: i64) -> Self {
        self.timestamp = ts;
        self
    }

    /// Set the kind.
    pub fn kind(mut self, kind: CommitKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the previous commit ID.
    pub fn prev(mut self, prev: CommitId) -> Self {
        self.prev_commit_id = Some(prev);
        self
    }

    /// Set the schema reference (genesis only).
    pub fn schema(mut self, schema_id: CommitId) -> Self {
        self.schema_id = Some(schema_id);
        self
    }

    /// Set the stream nonce (genesis only).
    pub fn nonce(mut self, nonce: [u8; 32]) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Set the payload.
    pub fn payload(mut self, p: impl Into<Bytes>) -> Self {
        self.payload = p.into();
        self
    }

    /// Build and sign the commit.
    pub fn sign(self, keypair: &Keypair) -> Commit {
        let payload_hash = Blake3Hash::hash(&self.payload);

        let header = CommitHeader {
            version: COMMIT_VERSION,
            author: self.author,
            stream_id: self.stream_id,
            seq: self.seq,
            timestamp: self.timestamp,
            kind: self.kind,
            prev_commit_id: self.prev_commit_id,
            schema_id: self.schema_id,
            nonce: self.nonce,
            payload_hash,
        };

        let message = signed_message_from_parts(&header, &self.payload);
        let signature = keypair.sign(&message);

        Commit {
            header,
            payload: self.payload,
            signature,
        }
    }
}
