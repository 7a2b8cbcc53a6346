//! Error types for Tessera Core.

use thiserror::Error;

use crate::types::CommitId;

/// Core errors that can occur during commit operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("payload hash mismatch: expected {expected}, got {actual}")]
    PayloadHashMismatch { expected: String, actual: String },

    #[error("unsupported commit version: {0}")]
    UnsupportedVersion(u8),

    #[error("malformed commit: {0}")]
    MalformedCommit(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Validation errors for commit structure and signatures.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("signature verification failed")]
    SignatureFailed,

    #[error("payload hash does not match header")]
    PayloadHashMismatch,

    #[error("payload exceeds maximum size: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("invalid sequence number: expected {expected}, got {got}")]
    InvalidSequence { expected: u64, got: u64 },

    #[error("invalid prev_commit_id: expected {expected:?}, got {got:?}")]
    InvalidPrevCommit {
        expected: Option<CommitId>,
        got: Option<CommitId>,
    },

    #[error("genesis commit must carry a stream nonce")]
    MissingNonce,

    #[error("update commit must not carry a {0} field")]
    GenesisOnlyField(&'static str),

    #[error("commit kind {0} is invalid")]
    InvalidKind(u16),

    #[error("structural error: {0}")]
    StructuralError(String),
}

impl From<CoreError> for ValidationError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidSignature | CoreError::InvalidPublicKey => {
                ValidationError::SignatureFailed
            }
            CoreError::PayloadHashMismatch { .. } => ValidationError::PayloadHashMismatch,
            CoreError::UnsupportedVersion(v) => ValidationError::UnsupportedVersion(v),
            CoreError::MalformedCommit(msg) => ValidationError::StructuralError(msg),
            CoreError::EncodingError(msg) | CoreError::DecodingError(msg) => {
                ValidationError::StructuralError(msg)
            }
        }
    }
}
