//! Error types for the Tessera facade.

use tessera_core::{StreamId, ValidationError};
use tessera_identity::{IdentityError, IdentityHandle};
use tessera_schema::SchemaError;
use tessera_store::StoreError;
use thiserror::Error;

/// Errors that can occur during document operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed seed, identifier, or request.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Mutating call on an anonymous session.
    #[error("operation requires an authenticated session")]
    Unauthenticated,

    /// The signer is not the document's recorded owner.
    #[error("ownership violation: document owned by {owner}, signed by {signer}")]
    OwnershipViolation {
        owner: IdentityHandle,
        signer: IdentityHandle,
    },

    /// Content fails the document's schema.
    #[error("schema violation: {0}")]
    SchemaViolation(#[from] SchemaError),

    /// Unknown stream or commit id.
    #[error("not found: {0}")]
    NotFound(String),

    /// Lost a last-writer-wins race at the given position.
    #[error("conflict at stream {stream_id} seq {seq}")]
    Conflict { stream_id: StreamId, seq: u64 },

    /// Commit failed structural or signature validation.
    #[error("commit validation: {0}")]
    Commit(#[from] ValidationError),

    /// Storage backend failure.
    #[error("storage: {0}")]
    Transport(#[from] StoreError),
}

impl From<IdentityError> for Error {
    fn from(e: IdentityError) -> Self {
        Error::InvalidInput(e.to_string())
    }
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, Error>;
