//! Uniform contract calls.
//!
//! A [`Contract`] turns an action name and pre-encoded arguments into an
//! [`ActionDescriptor`]. Typed per-contract wrappers can be layered on top;
//! this type never needs the contract's ABI.

use crate::api::ChainClient;
use crate::error::{WaxError, WaxResult};
use crate::identity::SigningIdentity;
use crate::transaction::{ActionDescriptor, PermissionLevel};
use crate::types::Name;
use serde_json::Value;
use std::fmt;

/// A deployed contract and the authorization its calls carry.
///
/// # Example
///
/// ```rust
/// use wax_rust_sdk::contract::Contract;
///
/// let token = Contract::parse("eosio.token", "alice@active").unwrap();
/// let action = token.call("transfer", vec![0x01]).unwrap();
/// assert_eq!(action.to_string(), "[active] alice > eosio.token::transfer");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    account: Name,
    authorization: Vec<PermissionLevel>,
}

impl Contract {
    /// Creates a contract whose calls are authorized by `authorization`.
    pub fn new(account: Name, authorization: PermissionLevel) -> Self {
        Self {
            account,
            authorization: vec![authorization],
        }
    }

    /// Parses the account and an `actor@permission` authorization.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::InvalidName`] if a name is invalid.
    pub fn parse(account: &str, authorization: &str) -> WaxResult<Self> {
        Ok(Self::new(Name::new(account)?, authorization.parse()?))
    }

    /// Creates a contract whose calls are authorized by `identity`.
    pub fn for_identity(account: Name, identity: &SigningIdentity) -> Self {
        Self::new(account, identity.authorization().clone())
    }

    /// Replaces the authorization list.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::Encoding`] if `authorization` is empty.
    pub fn with_authorization(mut self, authorization: Vec<PermissionLevel>) -> WaxResult<Self> {
        if authorization.is_empty() {
            return Err(WaxError::encoding(format!(
                "contract {} needs at least one authorization",
                self.account
            )));
        }
        self.authorization = authorization;
        Ok(self)
    }

    /// Contract account.
    pub fn account(&self) -> &Name {
        &self.account
    }

    /// Authorization attached to every call.
    pub fn authorization(&self) -> &[PermissionLevel] {
        &self.authorization
    }

    /// Builds a call to `action` with already encoded arguments.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::InvalidName`] if `action` is not a valid name.
    pub fn call(&self, action: &str, data: Vec<u8>) -> WaxResult<ActionDescriptor> {
        ActionDescriptor::new(
            self.account.clone(),
            Name::new(action)?,
            self.authorization.clone(),
            data,
        )
    }

    /// Builds a call to `action`, encoding JSON `args` through the node's
    /// `abi_json_to_bin`.
    ///
    /// # Errors
    ///
    /// Returns an invalid name or the request error.
    pub async fn call_json(
        &self,
        chain: &ChainClient,
        action: &str,
        args: &Value,
    ) -> WaxResult<ActionDescriptor> {
        let name = Name::new(action)?;
        let data = chain.abi_json_to_bin(&self.account, &name, args).await?;
        ActionDescriptor::new(self.account.clone(), name, self.authorization.clone(), data)
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.account)
    }
}
