//! Error types for the WAX SDK.
//!
//! This module provides a unified error type [`WaxError`] that covers every
//! failure the transaction pipeline can surface: encoding, signing, sponsor
//! co-signing and chain submission.

use std::fmt;
use thiserror::Error;

/// A specialized Result type for WAX SDK operations.
pub type WaxResult<T> = Result<T, WaxError>;

/// Structured error payload returned by a node when `push_transaction` fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainErrorDetails {
    /// Numeric error code of the chain exception (e.g. `3080004`).
    pub code: Option<i64>,
    /// Exception name (e.g. `tx_cpu_usage_exceeded`).
    pub name: Option<String>,
    /// Short description of the exception.
    pub what: String,
    /// First detail message, usually the most specific explanation.
    pub detail: Option<String>,
}

impl ChainErrorDetails {
    /// Returns the most specific human-readable message available.
    pub fn message(&self) -> &str {
        self.detail.as_deref().unwrap_or(&self.what)
    }
}

impl fmt::Display for ChainErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({})", self.message(), name),
            None => write!(f, "{}", self.message()),
        }
    }
}

/// The main error type for the WAX SDK.
#[derive(Error, Debug)]
pub enum WaxError {
    /// Error occurred during HTTP communication
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error occurred during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error occurred during URL parsing
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Error occurred during hex encoding/decoding
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Malformed header or action fields. This is a programmer error.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Invalid account, action or permission name
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Invalid public key
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid signature
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Transaction building error
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// The remote wallet session is no longer valid; the caller must re-authenticate.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Network failure during a remote signing round trip. The caller may retry.
    #[error("Signing transport error: {0}")]
    SigningTransport(String),

    /// The remote wallet answered with something that is not a signature list.
    #[error("Remote signer error: {0}")]
    RemoteSigner(String),

    /// The sponsor explicitly declined to co-sign the transaction.
    #[error("Payer rejected transaction: {message}")]
    PayerRejected {
        /// Message returned by the sponsor endpoint
        message: String,
    },

    /// The sponsor endpoint answered with a malformed or incomplete payload.
    #[error("Payer error: {0}")]
    Payer(String),

    /// The transaction exceeded the CPU or NET budget available to its payer.
    #[error("CPU usage limit exceeded: {0}")]
    CpuLimitExceeded(ChainErrorDetails),

    /// The transaction expired before it was included; rebuild from fresh chain state.
    #[error("Transaction expired: {0}")]
    TransactionExpired(ChainErrorDetails),

    /// Any other submission failure reported by the chain.
    #[error("Chain error: {0}")]
    UnknownChain(ChainErrorDetails),

    /// API returned an unexpected error response
    #[error("API error ({status_code}): {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal SDK error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Any other error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Maximum length for error messages to prevent excessive memory usage in logs.
const MAX_ERROR_MESSAGE_LENGTH: usize = 1000;

/// Patterns that might indicate sensitive information in error messages.
const SENSITIVE_PATTERNS: &[&str] = &[
    "private_key",
    "pvt_k1_",
    "secret",
    "session_token",
    "x-access-token",
    "password",
    "bearer",
];

impl WaxError {
    /// Creates a new encoding error
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        Self::Encoding(msg.into())
    }

    /// Creates a new transaction error
    pub fn transaction<S: Into<String>>(msg: S) -> Self {
        Self::Transaction(msg.into())
    }

    /// Creates a new API error from response details
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    ///
    /// Only meaningful for idempotent calls; submission is never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::SigningTransport(_) => true,
            Self::Api { status_code, .. } => {
                matches!(status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }

    /// Returns true if the transaction has to be rebuilt from fresh chain state
    /// before it can be submitted again.
    pub fn needs_rebuild(&self) -> bool {
        matches!(
            self,
            Self::TransactionExpired(_) | Self::CpuLimitExceeded(_)
        )
    }

    /// Returns true if a remote identity must log in again.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::SessionExpired(_))
    }

    /// Returns the structured chain error, if this is a submission failure.
    pub fn chain_details(&self) -> Option<&ChainErrorDetails> {
        match self {
            Self::CpuLimitExceeded(details)
            | Self::TransactionExpired(details)
            | Self::UnknownChain(details) => Some(details),
            _ => None,
        }
    }

    /// Returns a sanitized version of the error message safe for logging.
    ///
    /// Control characters are removed, long messages truncated and messages
    /// that look like they carry key material or credentials are redacted.
    pub fn sanitized_message(&self) -> String {
        Self::sanitize_string(&self.to_string())
    }

    fn sanitize_string(s: &str) -> String {
        let cleaned: String = s
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect();

        let lower = cleaned.to_lowercase();
        for pattern in SENSITIVE_PATTERNS {
            if lower.contains(pattern) {
                return format!("[REDACTED: message contained sensitive pattern '{pattern}']");
            }
        }

        if cleaned.len() > MAX_ERROR_MESSAGE_LENGTH {
            let mut end = MAX_ERROR_MESSAGE_LENGTH;
            while !cleaned.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... [truncated, total length: {}]",
                &cleaned[..end],
                cleaned.len()
            )
        } else {
            cleaned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(what: &str) -> ChainErrorDetails {
        ChainErrorDetails {
            code: Some(3080004),
            name: Some("tx_cpu_usage_exceeded".to_string()),
            what: what.to_string(),
            detail: None,
        }
    }

    #[test]
    fn test_error_display() {
        let err = WaxError::InvalidName("Bad.Name".to_string());
        assert_eq!(err.to_string(), "Invalid name: Bad.Name");
    }

    #[test]
    fn test_payer_rejected_display() {
        let err = WaxError::PayerRejected {
            message: "not eligible".to_string(),
        };
        assert!(err.to_string().contains("not eligible"));
    }

    #[test]
    fn test_is_retryable() {
        assert!(WaxError::api(429, "rate limited").is_retryable());
        assert!(WaxError::api(503, "unavailable").is_retryable());
        assert!(WaxError::SigningTransport("reset".to_string()).is_retryable());
        assert!(!WaxError::api(400, "bad request").is_retryable());
        assert!(!WaxError::SessionExpired("gone".to_string()).is_retryable());
        assert!(!WaxError::UnknownChain(details("boom")).is_retryable());
    }

    #[test]
    fn test_needs_rebuild() {
        assert!(WaxError::TransactionExpired(details("Expired Transaction")).needs_rebuild());
        assert!(WaxError::CpuLimitExceeded(details("cpu")).needs_rebuild());
        assert!(!WaxError::UnknownChain(details("other")).needs_rebuild());
    }

    #[test]
    fn test_requires_reauthentication() {
        assert!(WaxError::SessionExpired("expired".to_string()).requires_reauthentication());
        assert!(!WaxError::RemoteSigner("garbage".to_string()).requires_reauthentication());
    }

    #[test]
    fn test_chain_details_message_prefers_detail() {
        let mut d = details("Transaction exceeded the current CPU usage limit");
        assert_eq!(d.message(), "Transaction exceeded the current CPU usage limit");
        d.detail = Some("billed CPU time (1200 us) is greater than the maximum".to_string());
        assert!(d.message().starts_with("billed CPU time"));
        assert!(d.to_string().contains("tx_cpu_usage_exceeded"));
    }

    #[test]
    fn test_chain_details_accessor() {
        let err = WaxError::UnknownChain(details("assertion failure"));
        assert_eq!(err.chain_details().unwrap().what, "assertion failure");
        assert!(WaxError::Config("x".to_string()).chain_details().is_none());
    }

    #[test]
    fn test_sanitized_message_truncates_long_messages() {
        let err = WaxError::api(500, "x".repeat(2000));
        let sanitized = err.sanitized_message();
        assert!(sanitized.len() < 1200);
        assert!(sanitized.contains("truncated"));
    }

    #[test]
    fn test_sanitized_message_redacts_credentials() {
        let err = WaxError::Internal("x-access-token: abc123".to_string());
        let sanitized = err.sanitized_message();
        assert!(sanitized.contains("REDACTED"));
        assert!(!sanitized.contains("abc123"));
    }

    #[test]
    fn test_sanitized_message_removes_control_chars() {
        let err = WaxError::api(400, "bad\x00request\x1f");
        let sanitized = err.sanitized_message();
        assert!(!sanitized.contains('\x00'));
        assert!(!sanitized.contains('\x1f'));
    }
}
