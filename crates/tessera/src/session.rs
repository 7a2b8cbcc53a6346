//! Sessions: the authentication context for store operations.
//!
//! A session is immutable: it either carries an identity or it does not, and
//! that never changes after construction. Switching identity means
//! constructing a new session, so no call can observe a different signer
//! than the one the session was built with.

use tessera_identity::{Identity, IdentityHandle, Seed};

use crate::error::{Error, Result};

/// An authentication context.
#[derive(Debug, Clone)]
pub struct Session {
    identity: Option<Identity>,
}

impl Session {
    /// A session with no identity. Reads work; mutations fail
    /// [`Error::Unauthenticated`].
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    /// A session signing as the given identity.
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// Derive an identity from a seed and authenticate as it.
    pub fn from_seed(seed: &Seed) -> Self {
        Self::authenticated(Identity::from_seed(seed))
    }

    /// Whether this session carries an identity.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// The session identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The session's handle, if authenticated.
    pub fn handle(&self) -> Option<&IdentityHandle> {
        self.identity.as_ref().map(|i| i.handle())
    }

    /// The identity, or `Unauthenticated`.
    pub(crate) fn require_identity(&self) -> Result<&Identity> {
        self.identity.as_ref().ok_or(Error::Unauthenticated)
    }
}
