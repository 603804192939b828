//! Actions and authorizations.

use crate::error::{WaxError, WaxResult};
use crate::types::Name;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An `(actor, permission)` pair that must authorize an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionLevel {
    /// Account that signs.
    pub actor: Name,
    /// Permission of that account.
    pub permission: Name,
}

impl PermissionLevel {
    /// Creates a permission level from validated names.
    pub fn new(actor: Name, permission: Name) -> Self {
        Self { actor, permission }
    }

    /// Parses both names.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::InvalidName`] if either name is invalid.
    pub fn parse(actor: &str, permission: &str) -> WaxResult<Self> {
        Ok(Self::new(Name::new(actor)?, Name::new(permission)?))
    }

    /// `actor@active`.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::InvalidName`] if `actor` is invalid.
    pub fn active(actor: &str) -> WaxResult<Self> {
        Self::parse(actor, "active")
    }
}

impl FromStr for PermissionLevel {
    type Err = WaxError;

    /// Parses `actor@permission`; a bare `actor` means `actor@active`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('@') {
            Some((actor, permission)) => Self::parse(actor, permission),
            None => Self::active(s),
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.actor, self.permission)
    }
}

/// One contract call, with its arguments already encoded.
///
/// Immutable once built. `data` serializes as hex in JSON.
///
/// # Example
///
/// ```rust
/// use wax_rust_sdk::transaction::{ActionDescriptor, PermissionLevel};
///
/// let action = ActionDescriptor::parse(
///     "eosio.token",
///     "transfer",
///     vec![PermissionLevel::active("alice").unwrap()],
///     vec![0x01, 0x02],
/// )
/// .unwrap();
/// assert_eq!(action.to_string(), "[active] alice > eosio.token::transfer");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    account: Name,
    name: Name,
    authorization: Vec<PermissionLevel>,
    #[serde(with = "hex::serde")]
    data: Vec<u8>,
}

impl ActionDescriptor {
    /// Creates an action.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::Encoding`] if `authorization` is empty.
    pub fn new(
        account: Name,
        name: Name,
        authorization: Vec<PermissionLevel>,
        data: Vec<u8>,
    ) -> WaxResult<Self> {
        if authorization.is_empty() {
            return Err(WaxError::encoding(format!(
                "action {account}::{name} has no authorization"
            )));
        }
        Ok(Self {
            account,
            name,
            authorization,
            data,
        })
    }

    /// Creates an action from string names.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is invalid or `authorization` is empty.
    pub fn parse(
        account: &str,
        name: &str,
        authorization: Vec<PermissionLevel>,
        data: Vec<u8>,
    ) -> WaxResult<Self> {
        Self::new(Name::new(account)?, Name::new(name)?, authorization, data)
    }

    /// Contract account.
    pub fn account(&self) -> &Name {
        &self.account
    }

    /// Action name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Required authorizations, in order.
    pub fn authorization(&self) -> &[PermissionLevel] {
        &self.authorization
    }

    /// Encoded arguments.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Accounts that must sign for this action.
    pub fn actors(&self) -> impl Iterator<Item = &Name> {
        self.authorization.iter().map(|level| &level.actor)
    }

    /// Returns true if this is `account::name` with `level` as its first
    /// authorization.
    pub fn is_call(&self, account: &Name, name: &Name, level: &PermissionLevel) -> bool {
        self.account == *account
            && self.name == *name
            && self.authorization.first() == Some(level)
    }
}

impl fmt::Display for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.authorization.first() {
            Some(level) => write!(
                f,
                "[{}] {} > {}::{}",
                level.permission, level.actor, self.account, self.name
            ),
            None => write!(f, "{}::{}", self.account, self.name),
        }
    }
}
