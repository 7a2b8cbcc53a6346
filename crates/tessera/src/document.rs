//! The read view of a document.

use serde_json::Value;
use tessera_core::{CommitId, Ed25519PublicKey, StreamId};
use tessera_identity::IdentityHandle;

/// A reference to a document: by stream (latest) or by commit (pinned).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentRef {
    /// Resolves to the latest accepted commit of the stream.
    Stream(StreamId),
    /// Resolves to one exact immutable version, forever.
    Commit(CommitId),
}

impl From<StreamId> for DocumentRef {
    fn from(id: StreamId) -> Self {
        DocumentRef::Stream(id)
    }
}

impl From<CommitId> for DocumentRef {
    fn from(id: CommitId) -> Self {
        DocumentRef::Commit(id)
    }
}

/// One resolved version of a document.
///
/// Loading by stream id yields the latest version; loading by commit id
/// yields that exact version with `log` truncated to its history.
#[derive(Debug, Clone)]
pub struct Document {
    /// The stream this version belongs to.
    pub stream_id: StreamId,

    /// The commit this view is pinned to.
    pub commit_id: CommitId,

    /// The genesis commit of the stream.
    pub genesis_id: CommitId,

    /// The owner's public key, fixed at creation.
    pub owner: Ed25519PublicKey,

    /// The owner's handle, derived from the key.
    pub owner_handle: IdentityHandle,

    /// Schema reference set at creation, if any.
    pub schema_id: Option<CommitId>,

    /// The document content at this version.
    pub content: Value,

    /// Sequence number of this version (genesis = 1).
    pub seq: u64,

    /// Ordered commit ids up to and including this version.
    pub log: Vec<CommitId>,
}

impl Document {
    /// Whether this view is the genesis version.
    pub fn is_genesis(&self) -> bool {
        self.commit_id == self.genesis_id
    }
}
