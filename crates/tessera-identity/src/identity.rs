//! Identities: a keypair plus its derived handle.

use tessera_core::{Ed25519PublicKey, Ed25519Signature, Keypair};

use crate::handle::IdentityHandle;
use crate::seed::Seed;

/// A full identity: signing keypair and shareable handle.
///
/// Derivation is deterministic: the same seed always yields the same
/// identity, on any machine.
#[derive(Clone)]
pub struct Identity {
    keypair: Keypair,
    handle: IdentityHandle,
}

impl Identity {
    /// Derive an identity from a seed.
    pub fn from_seed(seed: &Seed) -> Self {
        let keypair = Keypair::from_seed(seed.as_bytes());
        let handle = IdentityHandle::from_public_key(keypair.public_key());
        tracing::debug!(handle = %handle, "derived identity");
        Self { keypair, handle }
    }

    /// Generate a fresh identity from a random seed.
    ///
    /// The seed is recoverable via [`Identity::seed`]; persist it if the
    /// identity must survive the process.
    pub fn generate() -> Self {
        Self::from_seed(&Seed::generate())
    }

    /// The shareable handle.
    pub const fn handle(&self) -> &IdentityHandle {
        &self.handle
    }

    /// The public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    /// The signing keypair.
    pub const fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// The seed this identity derives from (secret material).
    pub fn seed(&self) -> Seed {
        Seed::from_bytes(self.keypair.seed())
    }

    /// Sign a message with this identity's key.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        self.keypair.sign(message)
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identity({})", self.handle)
    }
}
