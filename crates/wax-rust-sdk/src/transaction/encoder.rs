//! Canonical binary transaction encoding.
//!
//! The bytes produced here are what gets hashed for signing and what the
//! chain deserializes, so the layout is fixed:
//!
//! ```text
//! expiration             u32 LE
//! ref_block_num          u16 LE
//! ref_block_prefix       u32 LE
//! max_net_usage_words    varint
//! max_cpu_usage_ms       varint
//! delay_sec              varint
//! context_free_actions   varint count, then actions
//! actions                varint count, then actions
//! transaction_extensions varint count, then (u16 LE type, varint len, bytes)
//! trailing extension     varint 0
//! ```
//!
//! Each action is `account` and `name` as 8-byte LE names, the authorization
//! list (varint count, then 8-byte LE actor and permission), and the
//! varint-length-prefixed data.

use crate::transaction::action::ActionDescriptor;
use crate::transaction::types::TransactionHeader;
use crate::types::VarintCodec;

/// A `(type, data)` transaction extension.
pub type TransactionExtension = (u16, Vec<u8>);

/// Stateless transaction encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryTransactionEncoder;

impl BinaryTransactionEncoder {
    /// Encodes a full transaction.
    pub fn serialize(
        header: &TransactionHeader,
        context_free_actions: &[ActionDescriptor],
        actions: &[ActionDescriptor],
        extensions: &[TransactionExtension],
    ) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + actions.len() * 64);

        Self::write_header(header, &mut out);
        Self::write_actions(context_free_actions, &mut out);
        Self::write_actions(actions, &mut out);

        VarintCodec::write_len(extensions.len(), &mut out);
        for (kind, data) in extensions {
            out.extend_from_slice(&kind.to_le_bytes());
            VarintCodec::write_len(data.len(), &mut out);
            out.extend_from_slice(data);
        }

        VarintCodec::write(0, &mut out);
        out
    }

    /// Encodes the header fields.
    pub fn write_header(header: &TransactionHeader, out: &mut Vec<u8>) {
        out.extend_from_slice(&header.expiration.to_le_bytes());
        out.extend_from_slice(&header.ref_block_num.to_le_bytes());
        out.extend_from_slice(&header.ref_block_prefix.to_le_bytes());
        VarintCodec::write(u64::from(header.max_net_usage_words), out);
        VarintCodec::write(u64::from(header.max_cpu_usage_ms), out);
        VarintCodec::write(u64::from(header.delay_sec), out);
    }

    /// Encodes a count-prefixed action list.
    pub fn write_actions(actions: &[ActionDescriptor], out: &mut Vec<u8>) {
        VarintCodec::write_len(actions.len(), out);
        for action in actions {
            Self::write_action(action, out);
        }
    }

    /// Encodes one action.
    pub fn write_action(action: &ActionDescriptor, out: &mut Vec<u8>) {
        out.extend_from_slice(&action.account().to_le_bytes());
        out.extend_from_slice(&action.name().to_le_bytes());

        VarintCodec::write_len(action.authorization().len(), out);
        for level in action.authorization() {
            out.extend_from_slice(&level.actor.to_le_bytes());
            out.extend_from_slice(&level.permission.to_le_bytes());
        }

        VarintCodec::write_len(action.data().len(), out);
        out.extend_from_slice(action.data());
    }
}
