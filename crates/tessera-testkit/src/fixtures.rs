//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use serde_json::Value as JsonValue;

use tessera_core::{
    canonical_content_bytes, Commit, CommitBuilder, CommitId, CommitKind, Ed25519PublicKey,
    StreamId,
};
use tessera_identity::{Identity, IdentityHandle, Seed};
use tessera_store::MemoryStore;

/// A test fixture with an identity and memory store.
pub struct TestFixture {
    pub identity: Identity,
    pub store: MemoryStore,
}

impl TestFixture {
    /// Create a new test fixture with a random identity.
    pub fn new() -> Self {
        Self {
            identity: Identity::generate(),
            store: MemoryStore::new(),
        }
    }

    /// Create with a deterministic identity from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            identity: Identity::from_seed(&Seed::from_bytes(seed)),
            store: MemoryStore::new(),
        }
    }

    /// Get the identity's public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.identity.public_key()
    }

    /// Get the identity's handle.
    pub fn handle(&self) -> &IdentityHandle {
        self.identity.handle()
    }

    /// Derive the stream ID a genesis with this nonce would create.
    pub fn stream_id(&self, nonce: [u8; 32]) -> StreamId {
        StreamId::derive(&self.identity.public_key(), &nonce)
    }

    /// Create a genesis commit for the given nonce and content.
    pub fn make_genesis(&self, nonce: [u8; 32], content: &JsonValue) -> Commit {
        self.make_genesis_with_schema(nonce, content, None)
    }

    /// Create a genesis commit with an optional schema reference.
    pub fn make_genesis_with_schema(
        &self,
        nonce: [u8; 32],
        content: &JsonValue,
        schema_id: Option<CommitId>,
    ) -> Commit {
        let stream_id = self.stream_id(nonce);
        let payload = canonical_content_bytes(content).expect("encodable test content");
        let mut builder = CommitBuilder::new(self.identity.public_key(), stream_id, 1)
            .kind(CommitKind::Genesis)
            .timestamp(now_millis())
            .nonce(nonce)
            .payload(payload);
        if let Some(schema_id) = schema_id {
            builder = builder.schema(schema_id);
        }
        builder.sign(self.identity.keypair())
    }

    /// Create an update commit appending to an existing stream.
    pub fn make_update(
        &self,
        stream_id: StreamId,
        seq: u64,
        prev: CommitId,
        content: &JsonValue,
    ) -> Commit {
        let payload = canonical_content_bytes(content).expect("encodable test content");
        CommitBuilder::new(self.identity.public_key(), stream_id, seq)
            .kind(CommitKind::Update)
            .timestamp(now_millis())
            .prev(prev)
            .payload(payload)
            .sign(self.identity.keypair())
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessera_core::{canonical_bytes, validate_commit};
    use tessera_store::{InsertResult, Store};

    #[test]
    fn test_fixture_genesis() {
        let fixture = TestFixture::new();
        let commit = fixture.make_genesis([0x11; 32], &json!({ "hello": "world" }));

        assert_eq!(commit.seq(), 1);
        assert_eq!(commit.kind(), CommitKind::Genesis);
        assert!(commit.is_genesis());
        validate_commit(&commit).unwrap();
    }

    #[test]
    fn test_fixture_chain() {
        let fixture = TestFixture::new();
        let nonce = [0x22; 32];
        let stream_id = fixture.stream_id(nonce);

        let c1 = fixture.make_genesis(nonce, &json!({ "v": 1 }));
        let id1 = c1.compute_id();

        let c2 = fixture.make_update(stream_id, 2, id1, &json!({ "v": 2 }));
        let id2 = c2.compute_id();

        let c3 = fixture.make_update(stream_id, 3, id2, &json!({ "v": 3 }));

        assert_eq!(c2.header.prev_commit_id, Some(id1));
        assert_eq!(c3.header.prev_commit_id, Some(id2));
        validate_commit(&c2).unwrap();
        validate_commit(&c3).unwrap();
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_fixtures(3);

        // Each party has unique keys
        let pks: Vec<_> = parties.iter().map(|p| p.public_key()).collect();
        assert_ne!(pks[0], pks[1]);
        assert_ne!(pks[1], pks[2]);
        assert_ne!(pks[0], pks[2]);
    }

    #[test]
    fn test_seeded_fixture_deterministic() {
        let a = TestFixture::with_seed([0x07; 32]);
        let b = TestFixture::with_seed([0x07; 32]);
        assert_eq!(a.handle(), b.handle());
    }

    #[tokio::test]
    async fn test_fixture_store_accepts_chain() {
        let fixture = TestFixture::new();
        let nonce = [0x33; 32];
        let stream_id = fixture.stream_id(nonce);

        let c1 = fixture.make_genesis(nonce, &json!({ "v": 1 }));
        let id1 = c1.compute_id();
        let c2 = fixture.make_update(stream_id, 2, id1, &json!({ "v": 2 }));

        for c in [&c1, &c2] {
            let result = fixture
                .store
                .insert_commit(c, &canonical_bytes(c))
                .await
                .unwrap();
            assert_eq!(result, InsertResult::Inserted);
        }

        assert!(fixture.store.has_commit(&id1).await.unwrap());
        let ids = fixture.store.get_commit_ids(&stream_id).await.unwrap();
        assert_eq!(
            ids.iter().map(|(seq, _)| *seq).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }
}
