//! Transaction header, pending and packed transactions.

use crate::crypto::signing_digest;
use crate::transaction::action::ActionDescriptor;
use crate::transaction::encoder::BinaryTransactionEncoder;
use crate::types::{ChainId, Name};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Recent-block data a header is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceBlock {
    /// Chain the block belongs to.
    pub chain_id: ChainId,
    /// Low 16 bits of the reference block number.
    pub ref_block_num: u16,
    /// Bytes 8..12 of the reference block id, little-endian.
    pub ref_block_prefix: u32,
}

/// The fixed-layout header of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHeader {
    /// Unix time in seconds after which the transaction is rejected.
    pub expiration: u32,
    /// See [`ReferenceBlock::ref_block_num`].
    pub ref_block_num: u16,
    /// See [`ReferenceBlock::ref_block_prefix`].
    pub ref_block_prefix: u32,
    /// NET limit in 8-byte words, 0 for no explicit limit.
    pub max_net_usage_words: u32,
    /// CPU limit in milliseconds, 0 for no explicit limit.
    pub max_cpu_usage_ms: u32,
    /// Delay before execution, in seconds.
    pub delay_sec: u32,
}

impl TransactionHeader {
    /// Creates a header bound to `reference` that expires at `expiration`.
    pub fn new(reference: &ReferenceBlock, expiration: u32) -> Self {
        Self {
            expiration,
            ref_block_num: reference.ref_block_num,
            ref_block_prefix: reference.ref_block_prefix,
            max_net_usage_words: 0,
            max_cpu_usage_ms: 0,
            delay_sec: 0,
        }
    }

    /// Creates a header bound to `reference` that expires `seconds` from now.
    pub fn expiring_in(reference: &ReferenceBlock, seconds: u32) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let expiration = u32::try_from(now.saturating_add(u64::from(seconds))).unwrap_or(u32::MAX);
        Self::new(reference, expiration)
    }
}

/// A header plus ordered actions, ready to encode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    /// Header fields.
    pub header: TransactionHeader,
    /// Context-free actions, normally empty.
    #[serde(default)]
    pub context_free_actions: Vec<ActionDescriptor>,
    /// Actions in wire order.
    pub actions: Vec<ActionDescriptor>,
}

impl PendingTransaction {
    /// Creates a transaction with no context-free actions.
    pub fn new(header: TransactionHeader, actions: Vec<ActionDescriptor>) -> Self {
        Self {
            header,
            context_free_actions: Vec::new(),
            actions,
        }
    }

    /// Encodes the canonical byte layout.
    pub fn serialize(&self) -> Vec<u8> {
        BinaryTransactionEncoder::serialize(
            &self.header,
            &self.context_free_actions,
            &self.actions,
            &[],
        )
    }

    /// Distinct accounts that must sign, in first-seen order.
    pub fn required_signers(&self) -> Vec<Name> {
        distinct_actors(&self.actions)
    }
}

/// Distinct accounts authorizing `actions`, in first-seen order.
pub(crate) fn distinct_actors(actions: &[ActionDescriptor]) -> Vec<Name> {
    let mut seen = BTreeSet::new();
    actions
        .iter()
        .flat_map(ActionDescriptor::actors)
        .filter(|actor| seen.insert((*actor).clone()))
        .cloned()
        .collect()
}

/// An encoded transaction bound to a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedTransaction {
    /// Chain the transaction is for.
    pub chain_id: ChainId,
    /// Header it was encoded with.
    pub header: TransactionHeader,
    /// Canonical bytes.
    pub serialized: Vec<u8>,
}

impl PackedTransaction {
    /// Encodes `transaction` for `chain_id`.
    pub fn new(chain_id: ChainId, transaction: &PendingTransaction) -> Self {
        Self {
            chain_id,
            header: transaction.header,
            serialized: transaction.serialize(),
        }
    }

    /// Hex form, as `push_transaction` and sponsors expect it.
    pub fn packed_hex(&self) -> String {
        hex::encode(&self.serialized)
    }

    /// Digest a local key signs.
    pub fn digest(&self) -> [u8; 32] {
        signing_digest(&self.chain_id, &self.serialized, None)
    }
}

/// A packed transaction with the signatures collected so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
    /// Signatures, in collection order.
    pub signatures: Vec<String>,
    /// Hex-encoded packed transaction.
    pub packed: String,
    /// Raw packed bytes.
    #[serde(with = "hex::serde")]
    pub serialized: Vec<u8>,
}

impl TransactionInfo {
    /// Wraps `packed` with `signatures`.
    pub fn new(packed: &PackedTransaction, signatures: Vec<String>) -> Self {
        Self {
            signatures,
            packed: packed.packed_hex(),
            serialized: packed.serialized.clone(),
        }
    }
}

impl fmt::Display for TransactionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TransactionInfo({} bytes, {} signatures)",
            self.serialized.len(),
            self.signatures.len()
        )
    }
}
