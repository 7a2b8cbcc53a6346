//! Canonical CBOR encoding for deterministic serialization.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//!
//! The canonical encoding is critical: it ensures that the same commit
//! produces identical bytes (and thus identical ids) across all platforms.

use ciborium::value::Value;

use crate::commit::{Commit, CommitHeader, CommitKind};
use crate::crypto::{Blake3Hash, Ed25519PublicKey, Ed25519Signature};
use crate::error::CoreError;
use crate::stream::StreamId;
use crate::types::CommitId;

/// Domain prefix for the signed message.
pub const SIGN_DOMAIN: &[u8] = b"tessera/commit-sign/v1";

/// Header field keys (integer keys for compact encoding).
///
/// Keys 0-23 encode as single bytes in CBOR.
mod keys {
    pub const VERSION: u64 = 0;
    pub const AUTHOR: u64 = 1;
    pub const STREAM_ID: u64 = 2;
    pub const SEQ: u64 = 3;
    pub const TIMESTAMP: u64 = 4;
    pub const KIND: u64 = 5;
    pub const PREV_COMMIT_ID: u64 = 6;
    pub const SCHEMA_ID: u64 = 7;
    pub const NONCE: u64 = 8;
    pub const PAYLOAD_HASH: u64 = 9;
}

/// Encode a commit header to canonical CBOR bytes.
pub fn canonical_header_bytes(header: &CommitHeader) -> Vec<u8> {
    let value = header_to_cbor_value(header);
    let mut buf = Vec::new();
    encode_value_to(&mut buf, &value);
    buf
}

/// Encode an entire commit to canonical bytes.
///
/// Format: canonical_header || payload || signature
pub fn canonical_bytes(commit: &Commit) -> Vec<u8> {
    let mut buf = canonical_header_bytes(&commit.header);
    buf.extend_from_slice(&commit.payload);
    buf.extend_from_slice(&commit.signature.0);
    buf
}

/// Construct the signed message (sign_domain || header || payload).
pub fn signed_message(commit: &Commit) -> Vec<u8> {
    signed_message_from_parts(&commit.header, &commit.payload)
}

/// Construct the signed message from header and payload.
pub fn signed_message_from_parts(header: &CommitHeader, payload: &[u8]) -> Vec<u8> {
    let header_bytes = canonical_header_bytes(header);
    let mut buf = Vec::with_capacity(SIGN_DOMAIN.len() + header_bytes.len() + payload.len());
    buf.extend_from_slice(SIGN_DOMAIN);
    buf.extend_from_slice(&header_bytes);
    buf.extend_from_slice(payload);
    buf
}

/// Convert a header to a CBOR Value (map with integer keys).
fn header_to_cbor_value(header: &CommitHeader) -> Value {
    let opt_id = |id: &Option<CommitId>| match id {
        Some(id) => Value::Bytes(id.0.to_vec()),
        None => Value::Null,
    };

    let entries = vec![
        (
            Value::Integer(keys::VERSION.into()),
            Value::Integer(header.version.into()),
        ),
        (
            Value::Integer(keys::AUTHOR.into()),
            Value::Bytes(header.author.0.to_vec()),
        ),
        (
            Value::Integer(keys::STREAM_ID.into()),
            Value::Bytes(header.stream_id.0.to_vec()),
        ),
        (
            Value::Integer(keys::SEQ.into()),
            Value::Integer(header.seq.into()),
        ),
        (
            Value::Integer(keys::TIMESTAMP.into()),
            Value::Integer(header.timestamp.into()),
        ),
        (
            Value::Integer(keys::KIND.into()),
            Value::Integer(header.kind.to_u16().into()),
        ),
        (
            Value::Integer(keys::PREV_COMMIT_ID.into()),
            opt_id(&header.prev_commit_id),
        ),
        (
            Value::Integer(keys::SCHEMA_ID.into()),
            opt_id(&header.schema_id),
        ),
        (
            Value::Integer(keys::NONCE.into()),
            match &header.nonce {
                Some(n) => Value::Bytes(n.to_vec()),
                None => Value::Null,
            },
        ),
        (
            Value::Integer(keys::PAYLOAD_HASH.into()),
            Value::Bytes(header.payload_hash.0.to_vec()),
        ),
    ];

    Value::Map(entries)
}

/// Recursively encode a CBOR value canonically.
pub(crate) fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => {
            encode_integer(buf, *i);
        }
        Value::Bytes(b) => {
            encode_bytes(buf, b);
        }
        Value::Text(s) => {
            encode_text(buf, s);
        }
        Value::Array(arr) => {
            encode_array(buf, arr);
        }
        Value::Map(entries) => {
            encode_map_canonical(buf, entries);
        }
        Value::Bool(b) => {
            buf.push(if *b { 0xf5 } else { 0xf4 });
        }
        Value::Null => {
            buf.push(0xf6);
        }
        Value::Float(f) => {
            // Fixed-width 64-bit floats: major 7, additional 27
            buf.push(0xfb);
            buf.extend_from_slice(&f.to_be_bytes());
        }
        _ => {
            panic!("unsupported CBOR value type");
        }
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n = i128::from(i);

    if n >= 0 {
        // Major type 0: unsigned integer
        encode_uint(buf, 0, n as u64);
    } else {
        // Major type 1: negative integer
        // CBOR encodes -1 as 0, -2 as 1, etc.
        let abs = (-1 - n) as u64;
        encode_uint(buf, 1, abs);
    }
}

/// Encode an unsigned integer with the given major type.
pub(crate) fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a byte string (major type 2).
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode an array (major type 4).
fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item);
    }
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
pub(crate) fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    // Encode all keys first to sort by encoded bytes
    let mut key_value_pairs: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_value_to(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    // Sort by encoded key bytes (lexicographic)
    key_value_pairs.sort_by(|a, b| a.0.cmp(&b.0));

    // Write map header
    encode_uint(buf, 5, key_value_pairs.len() as u64);

    // Write sorted key-value pairs
    for (key_bytes, value) in key_value_pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}

/// Decode a commit from canonical bytes.
pub fn decode_commit(bytes: &[u8]) -> Result<Commit, CoreError> {
    // Minimum size: header (variable) + 64 byte signature
    if bytes.len() < 64 {
        return Err(CoreError::MalformedCommit("too short".into()));
    }

    // Parse CBOR header
    let cursor = std::io::Cursor::new(bytes);
    let value: Value =
        ciborium::from_reader(cursor).map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let header = cbor_value_to_header(&value)?;

    // Calculate header length by re-encoding
    let header_len = canonical_header_bytes(&header).len();

    // Extract payload and signature
    let remaining = &bytes[header_len..];
    if remaining.len() < 64 {
        return Err(CoreError::MalformedCommit(
            "insufficient bytes for signature".into(),
        ));
    }

    // Payload is everything except the last 64 bytes
    let payload_len = remaining.len() - 64;
    let payload = remaining[..payload_len].to_vec();
    let sig_bytes: [u8; 64] = remaining[payload_len..]
        .try_into()
        .map_err(|_| CoreError::MalformedCommit("invalid signature length".into()))?;

    Ok(Commit {
        header,
        payload: payload.into(),
        signature: Ed25519Signature(sig_bytes),
    })
}

fn bytes32(b: &[u8], what: &str) -> Result<[u8; 32], CoreError> {
    b.try_into()
        .map_err(|_| CoreError::MalformedCommit(format!("invalid {} length", what)))
}

/// Convert a CBOR Value (map) back to a CommitHeader.
fn cbor_value_to_header(value: &Value) -> Result<CommitHeader, CoreError> {
    let map = match value {
        Value::Map(m) => m,
        _ => return Err(CoreError::MalformedCommit("expected map".into())),
    };

    // Helper to get a value by integer key
    let get = |key: u64| -> Option<&Value> {
        map.iter()
            .find(|(k, _)| matches!(k, Value::Integer(i) if i128::from(*i) == key as i128))
            .map(|(_, v)| v)
    };

    let get_int = |key: u64, what: &str| -> Result<i128, CoreError> {
        match get(key) {
            Some(Value::Integer(i)) => Ok(i128::from(*i)),
            _ => Err(CoreError::MalformedCommit(format!("missing {}", what))),
        }
    };

    let get_opt_id = |key: u64, what: &str| -> Result<Option<CommitId>, CoreError> {
        match get(key) {
            Some(Value::Bytes(b)) => Ok(Some(CommitId(bytes32(b, what)?))),
            Some(Value::Null) | None => Ok(None),
            _ => Err(CoreError::MalformedCommit(format!("invalid {}", what))),
        }
    };

    let version = get_int(keys::VERSION, "version")? as u8;

    let author = match get(keys::AUTHOR) {
        Some(Value::Bytes(b)) => Ed25519PublicKey(bytes32(b, "author")?),
        _ => return Err(CoreError::MalformedCommit("invalid author".into())),
    };

    let stream_id = match get(keys::STREAM_ID) {
        Some(Value::Bytes(b)) => StreamId(bytes32(b, "stream_id")?),
        _ => return Err(CoreError::MalformedCommit("invalid stream_id".into())),
    };

    let seq = get_int(keys::SEQ, "seq")? as u64;
    let timestamp = get_int(keys::TIMESTAMP, "timestamp")? as i64;

    let kind_raw = get_int(keys::KIND, "kind")?;
    let kind = CommitKind::from_u16(kind_raw as u16)
        .ok_or_else(|| CoreError::MalformedCommit(format!("invalid kind: {}", kind_raw)))?;

    let prev_commit_id = get_opt_id(keys::PREV_COMMIT_ID, "prev_commit_id")?;
    let schema_id = get_opt_id(keys::SCHEMA_ID, "schema_id")?;

    let nonce = match get(keys::NONCE) {
        Some(Value::Bytes(b)) => Some(bytes32(b, "nonce")?),
        Some(Value::Null) | None => None,
        _ => return Err(CoreError::MalformedCommit("invalid nonce".into())),
    };

    let payload_hash = match get(keys::PAYLOAD_HASH) {
        Some(Value::Bytes(b)) => Blake3Hash(bytes32(b, "payload_hash")?),
        _ => return Err(CoreError::MalformedCommit("invalid payload_hash".into())),
    };

    Ok(CommitHeader {
        version,
        author,
        stream_id,
        seq,
        timestamp,
        kind,
        prev_commit_id,
        schema_id,
        nonce,
        payload_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::CommitBuilder;
    use crate::crypto::Keypair;

    fn make_genesis(keypair: &Keypair) -> Commit {
        let nonce = [0x11u8; 32];
        let stream_id = StreamId::derive(&keypair.public_key(), &nonce);
        CommitBuilder::new(keypair.public_key(), stream_id, 1)
            .timestamp(1736870400000)
            .kind(CommitKind::Genesis)
            .nonce(nonce)
            .payload(b"hello".to_vec())
            .sign(keypair)
    }

    #[test]
    fn test_canonical_encoding_deterministic() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let commit = make_genesis(&keypair);

        let bytes1 = canonical_bytes(&commit);
        let bytes2 = canonical_bytes(&commit);
        assert_eq!(bytes1, bytes2);
    }

    #[test]
    fn test_canonical_header_deterministic() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let commit = make_genesis(&keypair);

        let h1 = canonical_header_bytes(&commit.header);
        let h2 = canonical_header_bytes(&commit.header);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_integer_encoding() {
        // Smallest encoding for various integer sizes
        let mut buf = Vec::new();

        // 0-23: single byte
        encode_uint(&mut buf, 0, 0);
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 23);
        assert_eq!(buf, vec![0x17]);

        // 24-255: two bytes
        buf.clear();
        encode_uint(&mut buf, 0, 24);
        assert_eq!(buf, vec![0x18, 24]);

        buf.clear();
        encode_uint(&mut buf, 0, 255);
        assert_eq!(buf, vec![0x18, 255]);

        // 256-65535: three bytes
        buf.clear();
        encode_uint(&mut buf, 0, 256);
        assert_eq!(buf, vec![0x19, 0x01, 0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 65535);
        assert_eq!(buf, vec![0x19, 0xff, 0xff]);
    }

    #[test]
    fn test_commit_roundtrip() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let nonce = [0x11u8; 32];
        let stream_id = StreamId::derive(&keypair.public_key(), &nonce);
        let schema = CommitId::from_bytes([0xcc; 32]);

        let commit = CommitBuilder::new(keypair.public_key(), stream_id, 1)
            .timestamp(1736870400000)
            .kind(CommitKind::Genesis)
            .nonce(nonce)
            .schema(schema)
            .payload(b"hello world".to_vec())
            .sign(&keypair);

        let bytes = canonical_bytes(&commit);
        let decoded = decode_commit(&bytes).unwrap();

        assert_eq!(commit.header, decoded.header);
        assert_eq!(commit.payload, decoded.payload);
        assert_eq!(commit.signature, decoded.signature);
    }

    #[test]
    fn test_update_roundtrip() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let stream_id = StreamId::derive(&keypair.public_key(), &[0x11; 32]);

        let commit = CommitBuilder::new(keypair.public_key(), stream_id, 2)
            .timestamp(1736870400000)
            .kind(CommitKind::Update)
            .prev(CommitId::from_bytes([0xab; 32]))
            .payload(b"updated".to_vec())
            .sign(&keypair);

        let bytes = canonical_bytes(&commit);
        let decoded = decode_commit(&bytes).unwrap();
        assert_eq!(commit, decoded);
    }

    #[test]
    fn test_commit_id_from_canonical_bytes() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let commit = make_genesis(&keypair);

        let id1 = commit.compute_id();

        // Compute ID manually from domain + canonical bytes
        let mut input = crate::commit::ID_DOMAIN.to_vec();
        input.extend_from_slice(&canonical_bytes(&commit));
        let id2 = CommitId(Blake3Hash::hash(&input).0);

        assert_eq!(id1, id2);
    }

    #[test]
    fn test_signed_message_has_domain_prefix() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let commit = make_genesis(&keypair);

        let message = signed_message(&commit);
        assert!(message.starts_with(SIGN_DOMAIN));
    }

    #[test]
    fn test_map_key_ordering() {
        // Integer keys must sort by encoded bytes
        let mut buf = Vec::new();
        let entries = vec![
            (Value::Integer(9.into()), Value::Integer(90.into())),
            (Value::Integer(0.into()), Value::Integer(0.into())),
            (Value::Integer(5.into()), Value::Integer(50.into())),
        ];
        encode_map_canonical(&mut buf, &entries);

        // Map header (3 entries)
        assert_eq!(buf[0], 0xa3);
        // Keys should be in order: 0, 5, 9
        assert_eq!(buf[1], 0x00); // key 0
        assert_eq!(buf[2], 0x00); // value 0
        assert_eq!(buf[3], 0x05); // key 5
        assert_eq!(buf[4], 0x18); // value 50 (>23)
        assert_eq!(buf[5], 50);
        assert_eq!(buf[6], 0x09); // key 9
        assert_eq!(buf[7], 0x18); // value 90 (>23)
        assert_eq!(buf[8], 90);
    }
}
