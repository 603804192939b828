//! Cryptographic primitives.
//!
//! Secp256k1 keys and signatures in the chain's text formats, plus the
//! hashing helpers that derive checksums and signing digests.

mod hash;
mod keys;

pub use hash::{ripemd160_of, sha2_256, sha2_256d, signing_digest};
pub use keys::{
    PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, PrivateKey, PublicKey, SIGNATURE_LENGTH, Signature,
    is_canonical,
};
