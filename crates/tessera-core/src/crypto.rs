//! Hashing and signing newtypes.
//!
//! Commit ids are Blake3 digests and authorship is proven with Ed25519.
//! Raw `[u8; N]` material never crosses an API boundary bare: each role
//! gets its own newtype so a digest cannot be passed where a key belongs.
//! ed25519-dalek types stay private to this module.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// A 32-byte Blake3 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Blake3Hash(pub [u8; 32]);

impl Blake3Hash {
    /// Digest a byte slice.
    pub fn hash(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }
}

impl fmt::Debug for Blake3Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blake3({})", &hex::encode(self.0)[..16])
    }
}

/// An Ed25519 public key in its 32-byte compressed encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }

    /// Reject encodings that do not decompress, and small-order points
    /// that would let anyone forge agreement with the key.
    pub fn validate(&self) -> Result<(), CoreError> {
        let key = VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;
        if key.is_weak() {
            return Err(CoreError::InvalidPublicKey);
        }
        Ok(())
    }

    /// Verify an Ed25519 signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CoreError> {
        let key = VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;
        key.verify(message, &Signature::from_bytes(&signature.0))
            .map_err(|_| CoreError::InvalidSignature)
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({})", &self.to_hex()[..16])
    }
}

/// A 64-byte Ed25519 signature.
///
/// Travels only inside commits; the canonical codec and the SQL layer
/// handle its bytes directly, so there is no serde form.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub [u8; 64]);

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Sig({}...)", &hex::encode(&self.0[..8]))
    }
}

/// An Ed25519 signing key with its derived public half.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate from OS entropy.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Derive from a 32-byte seed. Same seed, same keypair, any machine.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }

    /// The seed this keypair derives from (secret material).
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_binds_message_and_key() {
        let signer = Keypair::from_seed(&[0x21; 32]);
        let other = Keypair::from_seed(&[0x22; 32]);
        let sig = signer.sign(b"commit body");

        signer.public_key().verify(b"commit body", &sig).unwrap();
        assert!(signer.public_key().verify(b"commit bodY", &sig).is_err());
        assert!(other.public_key().verify(b"commit body", &sig).is_err());
    }

    #[test]
    fn test_seed_derivation_deterministic() {
        let a = Keypair::from_seed(&[0x05; 32]);
        let b = Keypair::from_seed(&[0x05; 32]);
        let c = Keypair::from_seed(&[0x06; 32]);

        assert_eq!(a.public_key(), b.public_key());
        assert_ne!(a.public_key(), c.public_key());
        assert_eq!(a.seed(), [0x05; 32]);
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(Blake3Hash::hash(b"payload"), Blake3Hash::hash(b"payload"));
        assert_ne!(Blake3Hash::hash(b"payload"), Blake3Hash::hash(b"payloa"));
    }

    #[test]
    fn test_validate_rejects_small_order_point() {
        // The encoded identity point decompresses fine but is torsion
        let mut identity_point = [0u8; 32];
        identity_point[0] = 1;
        assert!(Ed25519PublicKey::from_bytes(identity_point)
            .validate()
            .is_err());

        assert!(Keypair::generate().public_key().validate().is_ok());
    }

    #[test]
    fn test_public_key_hex_forms() {
        let pk = Keypair::from_seed(&[0x33; 32]).public_key();
        assert_eq!(Ed25519PublicKey::from_hex(&pk.to_hex()).unwrap(), pk);
        assert!(Ed25519PublicKey::from_hex("abcd").is_err());
        assert!(Ed25519PublicKey::from_hex("zz").is_err());
    }
}
