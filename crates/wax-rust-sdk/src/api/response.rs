//! Chain RPC response types.

use crate::error::{ChainErrorDetails, WaxError, WaxResult};
use crate::types::ChainId;
use serde::{Deserialize, Serialize};

/// Response of `get_info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainInfo {
    /// Node software version.
    #[serde(default)]
    pub server_version: Option<String>,
    /// Chain this node follows.
    pub chain_id: ChainId,
    /// Current head block number.
    pub head_block_num: u32,
    /// Id of the head block.
    #[serde(default)]
    pub head_block_id: Option<String>,
    /// Timestamp of the head block.
    #[serde(default)]
    pub head_block_time: Option<String>,
    /// Last irreversible block number.
    pub last_irreversible_block_num: u32,
    /// Id of the last irreversible block.
    #[serde(default)]
    pub last_irreversible_block_id: Option<String>,
}

/// Response of `get_block`, reduced to the fields the pipeline needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block id, hex encoded.
    pub id: String,
    /// Block number.
    pub block_num: u32,
    /// Reference block prefix, as computed by the node.
    #[serde(default)]
    pub ref_block_prefix: Option<u32>,
    /// Block timestamp.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl BlockInfo {
    /// Returns the reference block prefix.
    ///
    /// Uses the node's `ref_block_prefix` when present, otherwise reads bytes
    /// 8..12 of the block id as a little-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns an error if the block id is not valid hex or is too short.
    pub fn reference_prefix(&self) -> WaxResult<u32> {
        if let Some(prefix) = self.ref_block_prefix {
            return Ok(prefix);
        }
        let id = hex::decode(&self.id)?;
        let bytes: [u8; 4] = id
            .get(8..12)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| WaxError::api(200, format!("block id too short: {}", self.id)))?;
        Ok(u32::from_le_bytes(bytes))
    }
}

/// One entry of `get_accounts_by_authorizers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedAccount {
    /// Account controlled by the key.
    pub account_name: String,
    /// Permission the key satisfies.
    pub permission_name: String,
    /// Key that matched, if the match was by key.
    #[serde(default)]
    pub authorizing_key: Option<String>,
    /// Weight of the key in the permission.
    #[serde(default)]
    pub weight: Option<u32>,
    /// Threshold of the permission.
    #[serde(default)]
    pub threshold: Option<u32>,
}

/// Response of `get_accounts_by_authorizers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountsByAuthorizers {
    /// Matching account permissions.
    #[serde(default)]
    pub accounts: Vec<AuthorizedAccount>,
}

impl AccountsByAuthorizers {
    /// Picks the account a key acts for: the first `active` permission, or
    /// failing that the first match of any permission.
    pub fn preferred(&self) -> Option<&AuthorizedAccount> {
        self.accounts
            .iter()
            .find(|a| a.permission_name == "active")
            .or_else(|| self.accounts.first())
    }
}

/// Response of `abi_json_to_bin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiJsonToBin {
    /// Hex-encoded action data.
    pub binargs: String,
}

/// Request body of `push_transaction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushTransactionRequest {
    /// Signatures over the packed transaction.
    pub signatures: Vec<String>,
    /// Compression flag, always 0.
    pub compression: u8,
    /// Packed context-free data, always empty.
    pub packed_context_free_data: String,
    /// Hex-encoded packed transaction.
    pub packed_trx: String,
}

impl PushTransactionRequest {
    /// Builds an uncompressed request for `packed_trx`.
    pub fn new(packed_trx: impl Into<String>, signatures: Vec<String>) -> Self {
        Self {
            signatures,
            compression: 0,
            packed_context_free_data: String::new(),
            packed_trx: packed_trx.into(),
        }
    }
}

/// One entry of a chain error's `details` list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainErrorDetail {
    /// Detail message.
    #[serde(default)]
    pub message: String,
    /// Source file on the node.
    #[serde(default)]
    pub file: Option<String>,
    /// Method on the node.
    #[serde(default)]
    pub method: Option<String>,
}

/// The `error` object of a failed chain call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainErrorBody {
    /// Exception code.
    #[serde(default)]
    pub code: Option<i64>,
    /// Exception name.
    #[serde(default)]
    pub name: Option<String>,
    /// Short description.
    #[serde(default)]
    pub what: String,
    /// Detail messages.
    #[serde(default)]
    pub details: Vec<ChainErrorDetail>,
}

impl From<ChainErrorBody> for ChainErrorDetails {
    fn from(body: ChainErrorBody) -> Self {
        let detail = body
            .details
            .into_iter()
            .map(|d| d.message)
            .find(|m| !m.is_empty());
        Self {
            code: body.code,
            name: body.name,
            what: body.what,
            detail,
        }
    }
}

/// Raw response of `push_transaction`, successful or not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushTransactionResponse {
    /// Id of the accepted transaction; missing or empty on failure.
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Execution trace of an accepted transaction.
    #[serde(default)]
    pub processed: Option<serde_json::Value>,
    /// Error envelope of a rejected transaction.
    #[serde(default)]
    pub error: Option<ChainErrorBody>,
    /// Top-level message of the error envelope.
    #[serde(default)]
    pub message: Option<String>,
}

/// A transaction the chain accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResult {
    /// Transaction id.
    pub transaction_id: String,
    /// Execution trace returned by the node.
    #[serde(default)]
    pub processed: Option<serde_json::Value>,
}
