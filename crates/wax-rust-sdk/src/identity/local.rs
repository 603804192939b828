//! Identities backed by a locally held key.

use crate::api::ChainClient;
use crate::crypto::{PrivateKey, PublicKey};
use crate::error::{WaxError, WaxResult};
use crate::transaction::PermissionLevel;
use crate::types::Name;
use tracing::debug;

/// An account whose private key is held in this process.
///
/// Signing is a pure local computation; the only failure mode is malformed
/// key material, which is rejected at construction.
#[derive(Debug, Clone)]
pub struct LocalIdentity {
    key: PrivateKey,
    authorization: PermissionLevel,
}

impl LocalIdentity {
    /// Creates an identity that signs for `account@active` with `key`.
    pub fn new(key: PrivateKey, account: Name) -> Self {
        Self {
            key,
            authorization: PermissionLevel::new(account, Name::active()),
        }
    }

    /// Parses `key` (WIF or `PVT_K1_`) and binds it to `account@active`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or the account name is invalid.
    pub fn from_key_str(key: &str, account: &str) -> WaxResult<Self> {
        Ok(Self::new(key.parse()?, Name::new(account)?))
    }

    /// Asks the chain which account `key` controls.
    ///
    /// Prefers an `active` permission and falls back to the first match.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::Config`] if no account is controlled by the key,
    /// or the underlying request error.
    pub async fn resolve(key: PrivateKey, chain: &ChainClient) -> WaxResult<Self> {
        let public_key = key.public_key().to_legacy_string();
        let accounts = chain
            .get_accounts_by_authorizers(std::slice::from_ref(&public_key), &[])
            .await?;
        let found = accounts.preferred().ok_or_else(|| {
            WaxError::Config(format!("no account is controlled by {public_key}"))
        })?;

        let authorization = PermissionLevel::parse(&found.account_name, &found.permission_name)?;
        debug!(authorization = %authorization, "resolved local identity");
        Ok(Self { key, authorization })
    }

    /// Uses `permission` instead of `active`.
    #[must_use]
    pub fn with_permission(mut self, permission: Name) -> Self {
        self.authorization.permission = permission;
        self
    }

    /// Account this identity signs for.
    pub fn account(&self) -> &Name {
        &self.authorization.actor
    }

    /// Authorization this identity satisfies.
    pub fn authorization(&self) -> &PermissionLevel {
        &self.authorization
    }

    /// Public half of the key.
    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    /// Signs `digest` and returns exactly one signature.
    ///
    /// # Errors
    ///
    /// Returns an error only if no canonical signature could be produced.
    pub fn sign(&self, digest: &[u8; 32]) -> WaxResult<Vec<String>> {
        Ok(vec![self.key.sign_digest(digest)?.to_string()])
    }
}
