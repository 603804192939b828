//! Secp256k1 keys and signatures in the chain's text formats.
//!
//! | Kind        | Formats                                   |
//! |-------------|-------------------------------------------|
//! | Private key | legacy WIF (`5...`), `PVT_K1_...`         |
//! | Public key  | legacy `EOS...`, `PUB_K1_...`             |
//! | Signature   | `SIG_K1_...`                              |
//!
//! The `K1` forms append `ripemd160(payload ‖ "K1")[..4]` as a checksum;
//! legacy public keys use `ripemd160(payload)[..4]` and WIF uses a double
//! SHA-256 checksum.

use crate::crypto::hash::{ripemd160_of, sha2_256d};
use crate::error::{WaxError, WaxResult};
use k256::ecdsa::signature::hazmat::RandomizedPrehashSigner;
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

/// Private key length in bytes.
pub const PRIVATE_KEY_LENGTH: usize = 32;
/// Compressed public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 33;
/// Recoverable signature length in bytes (`header ‖ r ‖ s`).
pub const SIGNATURE_LENGTH: usize = 65;

const WIF_VERSION: u8 = 0x80;
const K1_SUFFIX: &[u8] = b"K1";
const LEGACY_PUBLIC_PREFIX: &str = "EOS";
const PUBLIC_K1_PREFIX: &str = "PUB_K1_";
const PRIVATE_K1_PREFIX: &str = "PVT_K1_";
const SIGNATURE_K1_PREFIX: &str = "SIG_K1_";

/// Signing attempts before giving up on finding a canonical signature.
const MAX_SIGNING_ATTEMPTS: usize = 64;

fn k1_checksum(payload: &[u8]) -> [u8; 4] {
    let hash = ripemd160_of(&[payload, K1_SUFFIX]);
    [hash[0], hash[1], hash[2], hash[3]]
}

fn legacy_checksum(payload: &[u8]) -> [u8; 4] {
    let hash = ripemd160_of(&[payload]);
    [hash[0], hash[1], hash[2], hash[3]]
}

fn encode_k1(prefix: &str, payload: &[u8]) -> String {
    let mut data = payload.to_vec();
    data.extend_from_slice(&k1_checksum(payload));
    format!("{prefix}{}", bs58::encode(data).into_string())
}

/// Decodes base58 `encoded` into `payload_len` bytes plus a 4-byte checksum
/// and verifies the checksum with `checksum`.
fn decode_checked(
    encoded: &str,
    payload_len: usize,
    checksum: fn(&[u8]) -> [u8; 4],
) -> Result<Zeroizing<Vec<u8>>, String> {
    let data = Zeroizing::new(
        bs58::decode(encoded)
            .into_vec()
            .map_err(|e| format!("invalid base58: {e}"))?,
    );
    if data.len() != payload_len + 4 {
        return Err(format!(
            "expected {} bytes, got {}",
            payload_len + 4,
            data.len()
        ));
    }
    let (payload, check) = data.split_at(payload_len);
    if checksum(payload) != check {
        return Err("checksum mismatch".to_string());
    }
    Ok(Zeroizing::new(payload.to_vec()))
}

/// Returns true if a 65-byte recoverable signature is canonical.
///
/// The chain rejects signatures whose `r` or `s` component would need a
/// sign byte or carries a redundant leading zero when DER-encoded.
pub fn is_canonical(sig: &[u8; SIGNATURE_LENGTH]) -> bool {
    sig[1] & 0x80 == 0
        && !(sig[1] == 0 && sig[2] & 0x80 == 0)
        && sig[33] & 0x80 == 0
        && !(sig[33] == 0 && sig[34] & 0x80 == 0)
}

/// A secp256k1 private key.
///
/// The inner signing key zeroizes itself on drop.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Generates a new random private key.
    pub fn generate() -> Self {
        Self {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Creates a private key from 32 raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::InvalidPrivateKey`] if the bytes are not a valid
    /// scalar.
    pub fn from_bytes(bytes: &[u8]) -> WaxResult<Self> {
        if bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(WaxError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_LENGTH,
                bytes.len()
            )));
        }
        let inner =
            SigningKey::from_slice(bytes).map_err(|e| WaxError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Parses a legacy WIF key (`5...`).
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::InvalidPrivateKey`] on bad base58, a wrong version
    /// byte or a checksum mismatch.
    pub fn from_wif(wif: &str) -> WaxResult<Self> {
        let data = Zeroizing::new(
            bs58::decode(wif)
                .into_vec()
                .map_err(|e| WaxError::InvalidPrivateKey(format!("invalid base58: {e}")))?,
        );

        // 0x80 ‖ key ‖ [0x01 compressed flag] ‖ checksum
        let body_len = match data.len() {
            37 => 33,
            38 if data[33] == 0x01 => 34,
            n => {
                return Err(WaxError::InvalidPrivateKey(format!(
                    "unexpected WIF length {n}"
                )));
            }
        };
        if data[0] != WIF_VERSION {
            return Err(WaxError::InvalidPrivateKey(format!(
                "unexpected WIF version byte 0x{:02x}",
                data[0]
            )));
        }
        let (body, check) = data.split_at(body_len);
        if sha2_256d(body)[..4] != *check {
            return Err(WaxError::InvalidPrivateKey(
                "WIF checksum mismatch".to_string(),
            ));
        }

        Self::from_bytes(&body[1..33])
    }

    /// Returns the legacy WIF form.
    pub fn to_wif(&self) -> String {
        let mut data = Zeroizing::new(Vec::with_capacity(37));
        data.push(WIF_VERSION);
        data.extend_from_slice(&self.inner.to_bytes());
        let check = sha2_256d(&data);
        data.extend_from_slice(&check[..4]);
        bs58::encode(data.as_slice()).into_string()
    }

    /// Returns the `PVT_K1_` form.
    pub fn to_k1_string(&self) -> String {
        let bytes = Zeroizing::new(self.inner.to_bytes().to_vec());
        encode_k1(PRIVATE_K1_PREFIX, &bytes)
    }

    /// Returns the corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: *self.inner.verifying_key(),
        }
    }

    /// Signs a 32-byte digest and returns a canonical recoverable signature.
    ///
    /// The first attempt is deterministic (RFC 6979); if that signature is
    /// not canonical, fresh randomized nonces are tried until one is.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::Internal`] if no canonical signature is found
    /// within the attempt budget.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> WaxResult<Signature> {
        let (sig, recovery_id) = self
            .inner
            .sign_prehash_recoverable(digest)
            .map_err(|e| WaxError::Internal(format!("signing failed: {e}")))?;
        let candidate = Signature::from_parts(&sig, recovery_id);
        if candidate.is_canonical() {
            return Ok(candidate);
        }

        let verifying_key = self.inner.verifying_key();
        for _ in 1..MAX_SIGNING_ATTEMPTS {
            let sig: K256Signature = self
                .inner
                .sign_prehash_with_rng(&mut OsRng, digest)
                .map_err(|e| WaxError::Internal(format!("signing failed: {e}")))?;
            let sig = sig.normalize_s().unwrap_or(sig);
            let recovery_id = RecoveryId::trial_recovery_from_prehash(verifying_key, digest, &sig)
                .map_err(|e| WaxError::Internal(format!("recovery id not found: {e}")))?;
            let candidate = Signature::from_parts(&sig, recovery_id);
            if candidate.is_canonical() {
                return Ok(candidate);
            }
        }

        Err(WaxError::Internal(
            "could not produce a canonical signature".to_string(),
        ))
    }
}

impl FromStr for PrivateKey {
    type Err = WaxError;

    /// Accepts either `PVT_K1_...` or legacy WIF.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(encoded) = s.strip_prefix(PRIVATE_K1_PREFIX) {
            let bytes = decode_checked(encoded, PRIVATE_KEY_LENGTH, k1_checksum)
                .map_err(WaxError::InvalidPrivateKey)?;
            Self::from_bytes(&bytes)
        } else {
            Self::from_wif(s)
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey([REDACTED])")
    }
}

/// A compressed secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Creates a public key from SEC1 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::InvalidPublicKey`] if the bytes are not a point on
    /// the curve.
    pub fn from_bytes(bytes: &[u8]) -> WaxResult<Self> {
        let inner = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| WaxError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Returns the 33-byte compressed form.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; PUBLIC_KEY_LENGTH];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Returns the legacy `EOS...` form, which chain APIs index keys by.
    pub fn to_legacy_string(&self) -> String {
        let bytes = self.to_bytes();
        let mut data = bytes.to_vec();
        data.extend_from_slice(&legacy_checksum(&bytes));
        format!("{LEGACY_PUBLIC_PREFIX}{}", bs58::encode(data).into_string())
    }

    /// Returns the `PUB_K1_...` form.
    pub fn to_k1_string(&self) -> String {
        encode_k1(PUBLIC_K1_PREFIX, &self.to_bytes())
    }

    /// Verifies `signature` over `digest`.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::InvalidSignature`] if the signature was not
    /// produced by this key.
    pub fn verify_digest(&self, digest: &[u8; 32], signature: &Signature) -> WaxResult<()> {
        if signature.recover(digest)? == *self {
            Ok(())
        } else {
            Err(WaxError::InvalidSignature(
                "signature does not match public key".to_string(),
            ))
        }
    }
}

impl FromStr for PublicKey {
    type Err = WaxError;

    /// Accepts either `PUB_K1_...` or legacy `EOS...`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let decoded = if let Some(encoded) = s.strip_prefix(PUBLIC_K1_PREFIX) {
            decode_checked(encoded, PUBLIC_KEY_LENGTH, k1_checksum)
        } else if let Some(encoded) = s.strip_prefix(LEGACY_PUBLIC_PREFIX) {
            decode_checked(encoded, PUBLIC_KEY_LENGTH, legacy_checksum)
        } else {
            Err(format!("unrecognized public key format: {s}"))
        };
        let bytes = decoded.map_err(WaxError::InvalidPublicKey)?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_legacy_string())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_legacy_string())
    }
}

/// A 65-byte recoverable signature: `recovery_id + 31 ‖ r ‖ s`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    fn from_parts(sig: &K256Signature, recovery_id: RecoveryId) -> Self {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[0] = recovery_id.to_byte() + 31;
        out[1..].copy_from_slice(&sig.to_bytes());
        Self(out)
    }

    /// Wraps 65 raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::InvalidSignature`] on a wrong length.
    pub fn from_bytes(bytes: &[u8]) -> WaxResult<Self> {
        let array: [u8; SIGNATURE_LENGTH] = bytes.try_into().map_err(|_| {
            WaxError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Returns true if the chain will accept this signature.
    pub fn is_canonical(&self) -> bool {
        is_canonical(&self.0)
    }

    /// Recovers the public key that produced this signature over `digest`.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::InvalidSignature`] if the header byte or the
    /// `r`/`s` components are malformed.
    pub fn recover(&self, digest: &[u8; 32]) -> WaxResult<PublicKey> {
        let header = self.0[0];
        let recovery_id = header
            .checked_sub(31)
            .and_then(RecoveryId::from_byte)
            .ok_or_else(|| WaxError::InvalidSignature(format!("bad header byte {header}")))?;
        let sig = K256Signature::from_slice(&self.0[1..])
            .map_err(|e| WaxError::InvalidSignature(e.to_string()))?;
        let inner = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
            .map_err(|e| WaxError::InvalidSignature(e.to_string()))?;
        Ok(PublicKey { inner })
    }
}

impl FromStr for Signature {
    type Err = WaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let encoded = s.trim().strip_prefix(SIGNATURE_K1_PREFIX).ok_or_else(|| {
            WaxError::InvalidSignature(format!("expected {SIGNATURE_K1_PREFIX} prefix"))
        })?;
        let bytes = decode_checked(encoded, SIGNATURE_LENGTH, k1_checksum)
            .map_err(WaxError::InvalidSignature)?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_k1(SIGNATURE_K1_PREFIX, &self.0))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::sha2_256;

    const DEV_WIF: &str = "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3";
    const DEV_PVT_K1: &str = "PVT_K1_2bfGi9rYsXQSXXTvJbDAPhHLQUojjaNLomdm3cEJ1XTzMqUt3V";
    const DEV_PUBLIC: &str = "EOS6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5GDW5CV";
    const DEV_PUB_K1: &str = "PUB_K1_6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5BoDq63";

    #[test]
    fn test_wif_to_public_key() {
        let key = PrivateKey::from_wif(DEV_WIF).unwrap();
        assert_eq!(key.public_key().to_legacy_string(), DEV_PUBLIC);
        assert_eq!(key.public_key().to_k1_string(), DEV_PUB_K1);
        assert_eq!(key.to_wif(), DEV_WIF);
    }

    #[test]
    fn test_k1_private_key_format() {
        let key: PrivateKey = DEV_WIF.parse().unwrap();
        assert_eq!(key.to_k1_string(), DEV_PVT_K1);
        let parsed: PrivateKey = DEV_PVT_K1.parse().unwrap();
        assert_eq!(parsed.public_key(), key.public_key());
    }

    #[test]
    fn test_public_key_parsing() {
        let legacy: PublicKey = DEV_PUBLIC.parse().unwrap();
        let k1: PublicKey = DEV_PUB_K1.parse().unwrap();
        assert_eq!(legacy, k1);
        assert!("PUB_R1_6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5BoDq63"
            .parse::<PublicKey>()
            .is_err());
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let mut tampered = DEV_WIF.to_string();
        tampered.pop();
        tampered.push('4');
        assert!(PrivateKey::from_wif(&tampered).is_err());

        let mut tampered = DEV_PUBLIC.to_string();
        tampered.pop();
        tampered.push('D');
        assert!(tampered.parse::<PublicKey>().is_err());
    }

    #[test]
    fn test_private_key_debug_redacted() {
        let key = PrivateKey::from_wif(DEV_WIF).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(DEV_WIF));
    }

    #[test]
    fn test_signatures_are_canonical_and_recoverable() {
        let key = PrivateKey::from_wif(DEV_WIF).unwrap();
        for i in 0..16u8 {
            let digest = sha2_256(&[i; 8]);
            let sig = key.sign_digest(&digest).unwrap();
            assert!(sig.is_canonical());
            assert!((31..=34).contains(&sig.as_bytes()[0]));
            assert_eq!(sig.recover(&digest).unwrap(), key.public_key());
            key.public_key().verify_digest(&digest, &sig).unwrap();
        }
    }

    #[test]
    fn test_signature_text_roundtrip() {
        let key = PrivateKey::generate();
        let digest = sha2_256(b"payload");
        let sig = key.sign_digest(&digest).unwrap();
        let text = sig.to_string();
        assert!(text.starts_with("SIG_K1_"));
        assert_eq!(text.parse::<Signature>().unwrap(), sig);
    }

    #[test]
    fn test_verify_rejects_other_key() {
        let digest = sha2_256(b"payload");
        let sig = PrivateKey::generate().sign_digest(&digest).unwrap();
        let other = PrivateKey::generate().public_key();
        assert!(other.verify_digest(&digest, &sig).is_err());
    }

    #[test]
    fn test_canonical_rule() {
        let mut sig = [0u8; SIGNATURE_LENGTH];
        sig[1] = 0x01;
        sig[33] = 0x01;
        assert!(is_canonical(&sig));
        sig[1] = 0x80;
        assert!(!is_canonical(&sig));
        sig[1] = 0x00;
        sig[2] = 0x10;
        assert!(!is_canonical(&sig));
        sig[2] = 0x80;
        assert!(is_canonical(&sig));
        sig[33] = 0x80;
        assert!(!is_canonical(&sig));
    }
}
