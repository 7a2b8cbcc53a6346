//! Identity handles in `did:key` form.
//!
//! A handle encodes an Ed25519 public key as
//! `did:key:z<base58btc(0xed 0x01 || key_bytes)>`. The `z` is the multibase
//! prefix for base58btc; `0xed 0x01` is the multicodec varint for
//! ed25519-pub. The handle is a pure function of the public key, so two
//! parties always derive the same handle for the same key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tessera_core::Ed25519PublicKey;

use crate::error::HandleError;

const DID_KEY_PREFIX: &str = "did:key:";
const MULTIBASE_BASE58BTC: char = 'z';

/// Multicodec varint for ed25519-pub (0xed), followed by its length prefix.
const MULTICODEC_ED25519_PUB: [u8; 2] = [0xed, 0x01];

/// A shareable identity handle wrapping an Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityHandle(Ed25519PublicKey);

impl IdentityHandle {
    /// Derive the handle for a public key.
    pub fn from_public_key(key: Ed25519PublicKey) -> Self {
        Self(key)
    }

    /// The public key this handle encodes.
    pub const fn public_key(&self) -> &Ed25519PublicKey {
        &self.0
    }

    /// Render the full `did:key:z...` string.
    pub fn to_did_string(&self) -> String {
        let mut data = Vec::with_capacity(2 + 32);
        data.extend_from_slice(&MULTICODEC_ED25519_PUB);
        data.extend_from_slice(&self.0 .0);
        let encoded = bs58::encode(data)
            .with_alphabet(bs58::Alphabet::BITCOIN)
            .into_string();
        format!("{}{}{}", DID_KEY_PREFIX, MULTIBASE_BASE58BTC, encoded)
    }

    /// Parse a `did:key` string back into a handle.
    pub fn parse(s: &str) -> Result<Self, HandleError> {
        let rest = s.strip_prefix(DID_KEY_PREFIX).ok_or(HandleError::MissingPrefix)?;

        let mut chars = rest.chars();
        match chars.next() {
            Some(MULTIBASE_BASE58BTC) => {}
            other => return Err(HandleError::UnknownMultibase(other)),
        }

        let decoded = bs58::decode(chars.as_str())
            .with_alphabet(bs58::Alphabet::BITCOIN)
            .into_vec()
            .map_err(|_| HandleError::Base58)?;

        if decoded.len() < 2 || decoded[..2] != MULTICODEC_ED25519_PUB {
            return Err(HandleError::UnknownMulticodec);
        }

        let key_bytes = &decoded[2..];
        let arr: [u8; 32] = key_bytes
            .try_into()
            .map_err(|_| HandleError::InvalidKeyLength(key_bytes.len()))?;

        Ok(Self(Ed25519PublicKey::from_bytes(arr)))
    }
}

impl fmt::Display for IdentityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_did_string())
    }
}

impl fmt::Debug for IdentityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityHandle({})", self.to_did_string())
    }
}

impl FromStr for IdentityHandle {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for IdentityHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_did_string())
    }
}

impl<'de> Deserialize<'de> for IdentityHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Keypair;

    #[test]
    fn test_handle_roundtrip() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let handle = IdentityHandle::from_public_key(keypair.public_key());

        let s = handle.to_did_string();
        assert!(s.starts_with("did:key:z"));

        let parsed = IdentityHandle::parse(&s).unwrap();
        assert_eq!(handle, parsed);
        assert_eq!(parsed.public_key(), &keypair.public_key());
    }

    #[test]
    fn test_handle_deterministic() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let h1 = IdentityHandle::from_public_key(keypair.public_key());
        let h2 = IdentityHandle::from_public_key(keypair.public_key());
        assert_eq!(h1.to_did_string(), h2.to_did_string());
    }

    #[test]
    fn test_parse_missing_prefix() {
        assert_eq!(
            IdentityHandle::parse("key:zabc"),
            Err(HandleError::MissingPrefix)
        );
    }

    #[test]
    fn test_parse_wrong_multibase() {
        assert_eq!(
            IdentityHandle::parse("did:key:f00ff00f"),
            Err(HandleError::UnknownMultibase(Some('f')))
        );
        assert_eq!(
            IdentityHandle::parse("did:key:"),
            Err(HandleError::UnknownMultibase(None))
        );
    }

    #[test]
    fn test_parse_bad_base58() {
        // '0' and 'l' are not in the bitcoin alphabet
        assert_eq!(
            IdentityHandle::parse("did:key:z0l0l"),
            Err(HandleError::Base58)
        );
    }

    #[test]
    fn test_parse_wrong_multicodec() {
        // secp256k1-pub multicodec (0xe7 0x01) instead of ed25519-pub
        let mut data = vec![0xe7, 0x01];
        data.extend_from_slice(&[0x11; 32]);
        let s = format!(
            "did:key:z{}",
            bs58::encode(data)
                .with_alphabet(bs58::Alphabet::BITCOIN)
                .into_string()
        );
        assert_eq!(IdentityHandle::parse(&s), Err(HandleError::UnknownMulticodec));
    }

    #[test]
    fn test_parse_wrong_key_length() {
        let mut data = MULTICODEC_ED25519_PUB.to_vec();
        data.extend_from_slice(&[0x11; 16]);
        let s = format!(
            "did:key:z{}",
            bs58::encode(data)
                .with_alphabet(bs58::Alphabet::BITCOIN)
                .into_string()
        );
        assert_eq!(
            IdentityHandle::parse(&s),
            Err(HandleError::InvalidKeyLength(16))
        );
    }

    #[test]
    fn test_serde_as_string() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let handle = IdentityHandle::from_public_key(keypair.public_key());

        let json = serde_json::to_string(&handle).unwrap();
        assert!(json.starts_with("\"did:key:z"));

        let back: IdentityHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(handle, back);
    }
}
