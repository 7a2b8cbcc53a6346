//! Identity seeds.
//!
//! A seed is the only secret in the system. Everything else (signing key,
//! public key, handle) is derived from it deterministically.

use std::fmt;

use rand::RngCore;

use crate::error::IdentityError;

/// Seed length in bytes.
pub const SEED_LEN: usize = 32;

/// A 32-byte identity seed.
///
/// The Debug impl never prints the seed material.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a byte slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdentityError> {
        let arr: [u8; SEED_LEN] = bytes
            .try_into()
            .map_err(|_| IdentityError::InvalidSeedLength(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, IdentityError> {
        let bytes = hex::decode(s).map_err(|_| IdentityError::InvalidSeedEncoding)?;
        Self::from_slice(&bytes)
    }

    /// Generate a fresh random seed.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SEED_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed(..)")
    }
}

impl From<[u8; SEED_LEN]> for Seed {
    fn from(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }
}
