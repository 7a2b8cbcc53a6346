//! Commit validation.
//!
//! Validation is split in two layers:
//! - structural: a commit is well-formed and correctly signed on its own
//! - positional: a commit extends a known stream at exactly the next position
//!
//! Structural validation is stateless and can run anywhere; positional
//! validation needs the current stream state.

use crate::canonical::signed_message;
use crate::commit::{Commit, CommitKind, COMMIT_VERSION, MAX_PAYLOAD_BYTES};
use crate::crypto::Blake3Hash;
use crate::error::ValidationError;
use crate::stream::{StreamId, StreamState};

/// Validate a commit's structure and signature.
pub fn validate_commit(commit: &Commit) -> Result<(), ValidationError> {
    validate_commit_structure(commit)?;

    // Reject weak or malformed author keys before verifying
    commit.header.author.validate()?;

    let message = signed_message(commit);
    commit.header.author.verify(&message, &commit.signature)?;

    Ok(())
}

/// Validate commit structure without checking the signature.
pub fn validate_commit_structure(commit: &Commit) -> Result<(), ValidationError> {
    let header = &commit.header;

    if header.version != COMMIT_VERSION {
        return Err(ValidationError::UnsupportedVersion(header.version));
    }

    if commit.payload.len() > MAX_PAYLOAD_BYTES {
        return Err(ValidationError::PayloadTooLarge(commit.payload.len()));
    }

    let actual_hash = Blake3Hash::hash(&commit.payload);
    if actual_hash != header.payload_hash {
        return Err(ValidationError::PayloadHashMismatch);
    }

    match header.kind {
        CommitKind::Genesis => {
            if header.seq != 1 {
                return Err(ValidationError::InvalidSequence {
                    expected: 1,
                    got: header.seq,
                });
            }
            if header.prev_commit_id.is_some() {
                return Err(ValidationError::InvalidPrevCommit {
                    expected: None,
                    got: header.prev_commit_id,
                });
            }
            let nonce = header.nonce.ok_or(ValidationError::MissingNonce)?;

            // The stream id is bound to the author key and nonce
            let derived = StreamId::derive(&header.author, &nonce);
            if derived != header.stream_id {
                return Err(ValidationError::StructuralError(
                    "stream id does not match author and nonce".into(),
                ));
            }
        }
        CommitKind::Update => {
            if header.seq < 2 {
                return Err(ValidationError::InvalidSequence {
                    expected: 2,
                    got: header.seq,
                });
            }
            if header.prev_commit_id.is_none() {
                return Err(ValidationError::StructuralError(
                    "update commit must reference a previous commit".into(),
                ));
            }
            if header.nonce.is_some() {
                return Err(ValidationError::GenesisOnlyField("nonce"));
            }
            if header.schema_id.is_some() {
                return Err(ValidationError::GenesisOnlyField("schema_id"));
            }
        }
    }

    Ok(())
}

/// Validate a commit as an extension of a known stream.
///
/// The commit must land at exactly `head_seq + 1` and link back to the
/// current head.
pub fn validate_commit_against_state(
    commit: &Commit,
    state: &StreamState,
) -> Result<(), ValidationError> {
    let expected_seq = state.head_seq + 1;
    if commit.header.seq != expected_seq {
        return Err(ValidationError::InvalidSequence {
            expected: expected_seq,
            got: commit.header.seq,
        });
    }

    if commit.header.prev_commit_id != Some(state.head_commit_id) {
        return Err(ValidationError::InvalidPrevCommit {
            expected: Some(state.head_commit_id),
            got: commit.header.prev_commit_id,
        });
    }

    Ok(())
}
