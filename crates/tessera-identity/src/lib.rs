//! # Tessera Identity
//!
//! Deterministic identities for Tessera document streams.
//!
//! An identity is derived from a 32-byte seed: the seed yields an Ed25519
//! keypair, and the keypair yields a self-certifying `did:key` handle. There
//! is no registry and no network: resolution recovers the public key from
//! the handle itself.
//!
//! ## Key Types
//!
//! - [`Seed`] - The only secret; 32 bytes
//! - [`Identity`] - Keypair plus derived handle
//! - [`IdentityHandle`] - Shareable `did:key:z...` handle
//! - [`PublicDescriptor`] - Resolution output

pub mod error;
pub mod handle;
pub mod identity;
pub mod resolver;
pub mod seed;

pub use error::{HandleError, IdentityError};
pub use handle::IdentityHandle;
pub use identity::Identity;
pub use resolver::{resolve, PublicDescriptor, VerificationMethod};
pub use seed::{Seed, SEED_LEN};
