//! Error types for Tessera Identity.

use thiserror::Error;

/// Errors that can occur when parsing an identity handle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandleError {
    #[error("handle does not start with did:key:")]
    MissingPrefix,

    #[error("unknown multibase prefix: {0:?}")]
    UnknownMultibase(Option<char>),

    #[error("invalid base58 encoding")]
    Base58,

    #[error("unknown multicodec prefix")]
    UnknownMulticodec,

    #[error("invalid key length: {0}")]
    InvalidKeyLength(usize),
}

/// Errors that can occur during identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid seed length: expected 32 bytes, got {0}")]
    InvalidSeedLength(usize),

    #[error("invalid seed encoding")]
    InvalidSeedEncoding,

    #[error(transparent)]
    InvalidHandle(#[from] HandleError),

    #[error("unrecognized identifier: {0}")]
    UnrecognizedIdentifier(String),

    #[error("invalid public key")]
    InvalidPublicKey,
}
