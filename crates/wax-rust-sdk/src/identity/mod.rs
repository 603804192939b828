//! Signing identities.
//!
//! An identity is either a locally held key or a session with a hosted
//! wallet. Both are long-lived and reused across transactions.
//!
//! - [`LocalIdentity`] signs the transaction digest in process and always
//!   returns exactly one signature.
//! - [`RemoteIdentity`] ships the serialized transaction to the wallet, which
//!   derives the digest itself and may return several signatures.

mod local;
mod remote;

pub use local::LocalIdentity;
pub use remote::RemoteIdentity;

use crate::error::WaxResult;
use crate::transaction::{PackedTransaction, PermissionLevel};
use crate::types::Name;

/// One of the two supported signing backends.
#[derive(Debug, Clone)]
pub enum SigningIdentity {
    /// A key held in this process.
    Local(LocalIdentity),
    /// A hosted wallet session.
    Remote(RemoteIdentity),
}

impl SigningIdentity {
    /// Account this identity signs for.
    pub fn account(&self) -> &Name {
        match self {
            Self::Local(identity) => identity.account(),
            Self::Remote(identity) => identity.account(),
        }
    }

    /// Authorization this identity satisfies.
    pub fn authorization(&self) -> &PermissionLevel {
        match self {
            Self::Local(identity) => identity.authorization(),
            Self::Remote(identity) => identity.authorization(),
        }
    }

    /// Returns true for the local variant.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// Signs `transaction`.
    ///
    /// # Errors
    ///
    /// Local signing fails only if no canonical signature can be produced.
    /// Remote signing fails with [`WaxError::SessionExpired`],
    /// [`WaxError::SigningTransport`] or [`WaxError::RemoteSigner`].
    ///
    /// [`WaxError::SessionExpired`]: crate::WaxError::SessionExpired
    /// [`WaxError::SigningTransport`]: crate::WaxError::SigningTransport
    /// [`WaxError::RemoteSigner`]: crate::WaxError::RemoteSigner
    pub async fn sign(&self, transaction: &PackedTransaction) -> WaxResult<Vec<String>> {
        match self {
            Self::Local(identity) => identity.sign(&transaction.digest()),
            Self::Remote(identity) => identity.sign(&transaction.serialized).await,
        }
    }
}

impl From<LocalIdentity> for SigningIdentity {
    fn from(identity: LocalIdentity) -> Self {
        Self::Local(identity)
    }
}

impl From<RemoteIdentity> for SigningIdentity {
    fn from(identity: RemoteIdentity) -> Self {
        Self::Remote(identity)
    }
}
