//! Identifier resolution.
//!
//! Handles are self-certifying: the public key is recoverable from the
//! identifier alone, so resolution is a pure function. It succeeds for any
//! well-formed identifier whether or not that identity has ever been seen.

use serde::{Deserialize, Serialize};
use tessera_core::Ed25519PublicKey;

use crate::error::IdentityError;
use crate::handle::IdentityHandle;

/// Verification method metadata, in the shape DID consumers expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationMethod {
    /// Method identifier (`<did>#<fragment>`).
    pub id: String,

    /// Method type.
    #[serde(rename = "type")]
    pub method_type: String,

    /// The DID that controls this method.
    pub controller: String,

    /// Multibase-encoded public key.
    #[serde(rename = "publicKeyMultibase")]
    pub public_key_multibase: String,
}

/// The public view of a resolved identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicDescriptor {
    /// The canonical handle.
    pub handle: IdentityHandle,

    /// The raw Ed25519 public key.
    pub public_key: Ed25519PublicKey,

    /// Verification method metadata.
    pub verification_method: VerificationMethod,
}

/// Resolve an identifier to its public descriptor.
///
/// Accepts either a `did:key` handle or a bare 64-char hex public key.
pub fn resolve(identifier: &str) -> Result<PublicDescriptor, IdentityError> {
    let handle = if identifier.starts_with("did:key:") {
        IdentityHandle::parse(identifier)?
    } else if identifier.len() == 64 && identifier.chars().all(|c| c.is_ascii_hexdigit()) {
        let key = Ed25519PublicKey::from_hex(identifier)
            .map_err(|_| IdentityError::UnrecognizedIdentifier(identifier.to_string()))?;
        IdentityHandle::from_public_key(key)
    } else {
        return Err(IdentityError::UnrecognizedIdentifier(
            identifier.to_string(),
        ));
    };

    let public_key = *handle.public_key();
    public_key
        .validate()
        .map_err(|_| IdentityError::InvalidPublicKey)?;

    let did = handle.to_did_string();
    let fragment = did.trim_start_matches("did:key:").to_string();

    Ok(PublicDescriptor {
        handle,
        public_key,
        verification_method: VerificationMethod {
            id: format!("{}#{}", did, fragment),
            method_type: "Ed25519VerificationKey2020".to_string(),
            controller: did,
            public_key_multibase: fragment,
        },
    })
}
