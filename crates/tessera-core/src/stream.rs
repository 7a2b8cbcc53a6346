//! Stream: the stable address of a versioned document.
//!
//! A stream is owned by a single identity, fixed at creation. The stream
//! identifier always resolves to the latest accepted commit; individual
//! commit identifiers pin historical versions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::Ed25519PublicKey;
use crate::types::CommitId;

/// Domain prefix for stream identifier derivation.
pub const STREAM_ID_DOMAIN: &[u8] = b"tessera/stream-id/v1:";

/// A 32-byte stream identifier, stable across all versions of a document.
///
/// Derived from Blake3(domain || owner_pk || nonce) where the nonce is the
/// per-document value carried in the genesis commit header.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamId(pub [u8; 32]);

impl StreamId {
    /// Derive a stream ID from the owner's public key and a genesis nonce.
    pub fn derive(owner: &Ed25519PublicKey, nonce: &[u8; 32]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(STREAM_ID_DOMAIN);
        hasher.update(&owner.0);
        hasher.update(nonce);
        Self(*hasher.finalize().as_bytes())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StreamId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for StreamId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for StreamId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// State of a document stream: owner, schema reference, and head position.
///
/// The owner and schema reference are fixed at creation and never change.
/// Appends are strictly sequential: the head only advances by one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamState {
    /// The stream identifier.
    pub stream_id: StreamId,

    /// The owner's public key, recorded at creation. Immutable.
    pub owner: Ed25519PublicKey,

    /// Optional schema reference, recorded at creation. Immutable.
    pub schema_id: Option<CommitId>,

    /// The genesis commit id (seq 1).
    pub genesis_id: CommitId,

    /// Sequence number of the latest accepted commit.
    pub head_seq: u64,

    /// Commit id at head_seq.
    pub head_commit_id: CommitId,

    /// When this stream was created (local time, Unix ms).
    pub created_at: i64,

    /// When this stream state was last updated (local time, Unix ms).
    pub updated_at: i64,
}

impl StreamState {
    /// Create state for a newly created stream. The genesis commit is the head.
    pub fn new(
        stream_id: StreamId,
        owner: Ed25519PublicKey,
        schema_id: Option<CommitId>,
        genesis_id: CommitId,
        now: i64,
    ) -> Self {
        Self {
            stream_id,
            owner,
            schema_id,
            genesis_id,
            head_seq: 1,
            head_commit_id: genesis_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Advance the head to an accepted commit.
    ///
    /// Returns false (and leaves the state untouched) unless `seq` is exactly
    /// the next position.
    pub fn advance(&mut self, seq: u64, commit_id: CommitId, now: i64) -> bool {
        if seq != self.head_seq + 1 {
            return false;
        }
        self.head_seq = seq;
        self.head_commit_id = commit_id;
        self.updated_at = now;
        true
    }

    /// Check whether a public key is the recorded owner.
    pub fn is_owner(&self, key: &Ed25519PublicKey) -> bool {
        &self.owner == key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    #[test]
    fn test_stream_id_derivation_deterministic() {
        let keypair = Keypair::generate();
        let nonce = [0x07u8; 32];
        let id1 = StreamId::derive(&keypair.public_key(), &nonce);
        let id2 = StreamId::derive(&keypair.public_key(), &nonce);
        assert_eq!(id1, id2);

        let other_nonce = [0x08u8; 32];
        let id3 = StreamId::derive(&keypair.public_key(), &other_nonce);
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_stream_id_different_owners() {
        let kp1 = Keypair::generate();
        let kp2 = Keypair::generate();
        let nonce = [0x07u8; 32];

        let id1 = StreamId::derive(&kp1.public_key(), &nonce);
        let id2 = StreamId::derive(&kp2.public_key(), &nonce);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_stream_state_sequential_advance() {
        let keypair = Keypair::generate();
        let genesis = CommitId::from_bytes([1; 32]);
        let stream_id = StreamId::derive(&keypair.public_key(), &[0; 32]);
        let mut state = StreamState::new(stream_id, keypair.public_key(), None, genesis, 1000);

        assert_eq!(state.head_seq, 1);
        assert_eq!(state.head_commit_id, genesis);

        let c2 = CommitId::from_bytes([2; 32]);
        assert!(state.advance(2, c2, 1001));
        assert_eq!(state.head_seq, 2);
        assert_eq!(state.head_commit_id, c2);

        // Out-of-order append is rejected and the head is unchanged
        let c9 = CommitId::from_bytes([9; 32]);
        assert!(!state.advance(9, c9, 1002));
        assert_eq!(state.head_seq, 2);
        assert_eq!(state.head_commit_id, c2);

        // Re-advancing to an occupied position is rejected too
        assert!(!state.advance(2, c9, 1003));
        assert_eq!(state.head_commit_id, c2);
    }

    #[test]
    fn test_stream_state_is_owner() {
        let owner = Keypair::generate();
        let other = Keypair::generate();
        let stream_id = StreamId::derive(&owner.public_key(), &[0; 32]);
        let state = StreamState::new(
            stream_id,
            owner.public_key(),
            None,
            CommitId::from_bytes([1; 32]),
            1000,
        );

        assert!(state.is_owner(&owner.public_key()));
        assert!(!state.is_owner(&other.public_key()));
    }

    #[test]
    fn test_stream_id_hex_roundtrip() {
        let keypair = Keypair::generate();
        let id = StreamId::derive(&keypair.public_key(), &[0x42; 32]);
        let hex = id.to_hex();
        let recovered = StreamId::from_hex(&hex).unwrap();
        assert_eq!(id, recovered);
    }
}
