//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{json, Value as JsonValue};

use tessera_core::{
    canonical_content_bytes, Blake3Hash, Commit, CommitBuilder, CommitId, CommitKind,
    Ed25519PublicKey, Keypair, StreamId,
};
use tessera_schema::{FieldKind, FieldRule, SchemaShape};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random CommitId.
pub fn commit_id() -> impl Strategy<Value = CommitId> {
    any::<[u8; 32]>().prop_map(CommitId::from_bytes)
}

/// Generate a random StreamId.
pub fn stream_id() -> impl Strategy<Value = StreamId> {
    any::<[u8; 32]>().prop_map(StreamId::from_bytes)
}

/// Generate a random Blake3Hash.
pub fn blake3_hash() -> impl Strategy<Value = Blake3Hash> {
    any::<[u8; 32]>().prop_map(Blake3Hash)
}

/// Generate a random Ed25519PublicKey.
pub fn public_key() -> impl Strategy<Value = Ed25519PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate a stream nonce.
pub fn nonce() -> impl Strategy<Value = [u8; 32]> {
    any::<[u8; 32]>()
}

/// Generate a valid sequence number (1-indexed).
pub fn seq() -> impl Strategy<Value = u64> {
    1u64..=u64::MAX
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=i64::MAX / 2
}

/// Generate a field name.
pub fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}".prop_map(String::from)
}

/// Generate a leaf JSON value.
pub fn json_leaf() -> impl Strategy<Value = JsonValue> {
    prop_oneof![
        Just(JsonValue::Null),
        any::<bool>().prop_map(JsonValue::from),
        any::<i64>().prop_map(JsonValue::from),
        "[ -~]{0,32}".prop_map(JsonValue::from),
    ]
}

/// Generate a flat JSON object suitable as document content.
pub fn content() -> impl Strategy<Value = JsonValue> {
    prop::collection::btree_map(field_name(), json_leaf(), 0..8)
        .prop_map(|fields| json!(fields))
}

/// Generate a field rule.
pub fn field_rule() -> impl Strategy<Value = FieldRule> {
    let kind = prop_oneof![
        Just(FieldKind::String),
        Just(FieldKind::Integer),
        Just(FieldKind::Number),
        Just(FieldKind::Boolean),
        Just(FieldKind::Object),
        Just(FieldKind::Array),
    ];
    (kind, prop::option::of(0usize..16), prop::option::of(16usize..256)).prop_map(
        |(kind, min, max)| FieldRule {
            kind,
            min_length: min,
            max_length: max,
        },
    )
}

/// Generate a schema shape.
pub fn schema_shape() -> impl Strategy<Value = SchemaShape> {
    (
        prop::collection::btree_map(field_name(), field_rule(), 0..6),
        any::<bool>(),
    )
        .prop_map(|(fields, deny_unknown)| {
            let required = fields.keys().take(fields.len() / 2).cloned().collect();
            SchemaShape {
                fields,
                required,
                deny_unknown,
            }
        })
}

/// Parameters for generating a structurally valid commit.
#[derive(Debug, Clone)]
pub struct CommitParams {
    pub keypair: Keypair,
    pub nonce: [u8; 32],
    pub kind: CommitKind,
    pub seq: u64,
    pub timestamp: i64,
    pub content: JsonValue,
    pub prev_commit_id: Option<CommitId>,
    pub schema_id: Option<CommitId>,
}

impl Arbitrary for CommitParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(),
            nonce(),
            any::<bool>(),
            2u64..=1000u64,
            0i64..=1_900_000_000_000i64,
            content(),
            any::<[u8; 32]>(),
            prop::option::of(any::<[u8; 32]>()),
        )
            .prop_map(
                |(seed, nonce, genesis, seq, ts, content, prev, schema)| {
                    // Genesis and update commits carry disjoint optional fields
                    let kind = if genesis {
                        CommitKind::Genesis
                    } else {
                        CommitKind::Update
                    };
                    CommitParams {
                        keypair: Keypair::from_seed(&seed),
                        nonce,
                        kind,
                        seq: if genesis { 1 } else { seq },
                        timestamp: ts,
                        content,
                        prev_commit_id: if genesis {
                            None
                        } else {
                            Some(CommitId::from_bytes(prev))
                        },
                        schema_id: if genesis {
                            schema.map(CommitId::from_bytes)
                        } else {
                            None
                        },
                    }
                },
            )
            .boxed()
    }
}

/// Generate a signed commit from parameters.
pub fn commit_from_params(params: &CommitParams) -> Commit {
    let stream_id = StreamId::derive(&params.keypair.public_key(), &params.nonce);
    let payload = canonical_content_bytes(&params.content).expect("encodable content");

    let mut builder = CommitBuilder::new(params.keypair.public_key(), stream_id, params.seq)
        .kind(params.kind)
        .timestamp(params.timestamp)
        .payload(payload);

    match params.kind {
        CommitKind::Genesis => {
            builder = builder.nonce(params.nonce);
            if let Some(schema_id) = params.schema_id {
                builder = builder.schema(schema_id);
            }
        }
        CommitKind::Update => {
            if let Some(prev) = params.prev_commit_id {
                builder = builder.prev(prev);
            }
        }
    }

    builder.sign(&params.keypair)
}
