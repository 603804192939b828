//! Hash functions used by key encodings and transaction signing.

use crate::types::ChainId;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Computes the SHA2-256 hash of the input.
///
/// # Example
///
/// ```rust
/// use wax_rust_sdk::crypto::sha2_256;
///
/// let hash = sha2_256(b"hello world");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha2_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Computes SHA2-256 twice, as used by legacy WIF checksums.
pub fn sha2_256d(data: &[u8]) -> [u8; 32] {
    sha2_256(&sha2_256(data))
}

/// Computes the RIPEMD-160 hash of the concatenation of `parts`.
pub fn ripemd160_of(parts: &[&[u8]]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 20];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Computes the digest a local key signs for a packed transaction:
/// `sha256(chain_id ‖ serialized ‖ context_free_data_hash)`.
///
/// The context-free-data hash is 32 zero bytes when there is no
/// context-free data.
pub fn signing_digest(
    chain_id: &ChainId,
    serialized: &[u8],
    context_free_data: Option<&[u8]>,
) -> [u8; 32] {
    let cfd_hash = match context_free_data {
        Some(data) if !data.is_empty() => sha2_256(data),
        _ => [0u8; 32],
    };

    let mut hasher = Sha256::new();
    hasher.update(chain_id.as_bytes());
    hasher.update(serialized);
    hasher.update(cfd_hash);
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}
