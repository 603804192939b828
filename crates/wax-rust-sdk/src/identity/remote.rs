//! Identities backed by a hosted wallet session.

use crate::config::RemoteSignerConfig;
use crate::error::{WaxError, WaxResult};
use crate::transaction::PermissionLevel;
use crate::types::Name;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, COOKIE, ORIGIN, REFERER};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use zeroize::Zeroizing;

const SESSION_PHRASES: &[&str] = &["session", "not logged in", "unauthorized"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignRequest<'a> {
    serialized_transaction: &'a [u8],
    website: &'a str,
    description: &'a str,
    free_bandwidth: bool,
}

#[derive(Deserialize)]
struct SignResponse {
    #[serde(default)]
    signatures: Option<Vec<String>>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// An account whose signatures come from a hosted wallet over HTTP.
///
/// The wallet receives the full serialized transaction, derives the digest
/// itself, and may return more than one signature (for example when it also
/// co-signs to cover bandwidth). The session credential is obtained by a
/// login flow outside this crate.
#[derive(Clone)]
pub struct RemoteIdentity {
    credential: Zeroizing<String>,
    authorization: PermissionLevel,
    config: RemoteSignerConfig,
    client: reqwest::Client,
}

impl RemoteIdentity {
    /// Creates an identity that signs for `account@active` with an
    /// authenticated session `credential`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(
        credential: impl Into<String>,
        account: Name,
        config: RemoteSignerConfig,
    ) -> WaxResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(WaxError::Http)?;
        Ok(Self {
            credential: Zeroizing::new(credential.into()),
            authorization: PermissionLevel::new(account, Name::active()),
            config,
            client,
        })
    }

    /// Account this identity signs for.
    pub fn account(&self) -> &Name {
        &self.authorization.actor
    }

    /// Authorization this identity satisfies.
    pub fn authorization(&self) -> &PermissionLevel {
        &self.authorization
    }

    /// Ships `serialized` to the wallet and returns its signatures.
    ///
    /// # Errors
    ///
    /// - [`WaxError::SessionExpired`] if the wallet no longer accepts the
    ///   credential
    /// - [`WaxError::SigningTransport`] on network failure or a 5xx answer
    /// - [`WaxError::RemoteSigner`] if the answer carries no signatures
    pub async fn sign(&self, serialized: &[u8]) -> WaxResult<Vec<String>> {
        let request = SignRequest {
            serialized_transaction: serialized,
            website: &self.config.website,
            description: &self.config.description,
            free_bandwidth: self.config.free_bandwidth,
        };

        let response = self
            .client
            .post(self.config.sign_url.clone())
            .header(CONTENT_TYPE, "application/json;charset=UTF-8")
            .header(ORIGIN, &self.config.origin)
            .header(REFERER, &self.config.referer)
            .header("x-access-token", self.credential.as_str())
            .header(COOKIE, format!("session_token={}", self.credential.as_str()))
            .json(&request)
            .send()
            .await
            .map_err(|e| WaxError::SigningTransport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WaxError::SigningTransport(e.to_string()))?;

        let signatures = parse_sign_response(status, &body)?;
        debug!(
            account = %self.authorization.actor,
            count = signatures.len(),
            "remote wallet signed"
        );
        Ok(signatures)
    }
}

fn parse_sign_response(status: StatusCode, body: &str) -> WaxResult<Vec<String>> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(WaxError::SessionExpired(format!(
            "wallet answered {}",
            status.as_u16()
        )));
    }

    let parsed: Option<SignResponse> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|r| {
            r.message.clone().or_else(|| {
                r.error.as_ref().map(|e| match e {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
            })
        })
        .unwrap_or_default();

    if let Some(signatures) = parsed
        .as_ref()
        .and_then(|r| r.signatures.clone())
        .filter(|s| !s.is_empty())
    {
        if status.is_success() {
            return Ok(signatures);
        }
    }

    if status.is_server_error() {
        return Err(WaxError::SigningTransport(format!(
            "wallet answered {}",
            status.as_u16()
        )));
    }
    let lower = message.to_lowercase();
    if SESSION_PHRASES.iter().any(|p| lower.contains(p)) {
        return Err(WaxError::SessionExpired(message));
    }

    Err(WaxError::RemoteSigner(if message.is_empty() {
        format!("no signatures in wallet response (status {})", status.as_u16())
    } else {
        message
    }))
}

impl fmt::Debug for RemoteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteIdentity")
            .field("authorization", &self.authorization)
            .field("sign_url", &self.config.sign_url.as_str())
            .field("credential", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    fn identity(server: &MockServer) -> RemoteIdentity {
        let config = RemoteSignerConfig::default()
            .with_sign_url(&format!("{}/wam/sign", server.uri()))
            .unwrap()
            .with_timeout(Duration::from_secs(5));
        RemoteIdentity::new("session-abc", Name::new("carol").unwrap(), config).unwrap()
    }

    #[tokio::test]
    async fn test_sign_ships_serialized_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wam/sign"))
            .and(header("x-access-token", "session-abc"))
            .and(header("origin", "https://all-access.wax.io"))
            .and(body_json(json!({
                "serializedTransaction": [1, 2, 3],
                "website": "wallet.wax.io",
                "description": "jwt is insecure",
                "freeBandwidth": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "signatures": ["SIG_K1_one", "SIG_K1_two"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let signatures = identity(&server).sign(&[1, 2, 3]).await.unwrap();
        assert_eq!(signatures, vec!["SIG_K1_one", "SIG_K1_two"]);
    }

    #[tokio::test]
    async fn test_unauthorized_is_session_expired() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wam/sign"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = identity(&server).sign(&[0]).await.unwrap_err();
        assert!(err.requires_reauthentication());
    }

    #[tokio::test]
    async fn test_malformed_response_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wam/sign"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let err = identity(&server).sign(&[0]).await.unwrap_err();
        assert!(matches!(err, WaxError::RemoteSigner(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_transport_failure_is_retryable() {
        let config = RemoteSignerConfig::default()
            .with_sign_url("http://127.0.0.1:1/wam/sign")
            .unwrap()
            .with_timeout(Duration::from_secs(2));
        let remote = RemoteIdentity::new("s", Name::new("carol").unwrap(), config).unwrap();
        let err = remote.sign(&[0]).await.unwrap_err();
        assert!(matches!(err, WaxError::SigningTransport(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_parse_session_message() {
        let err = parse_sign_response(
            StatusCode::BAD_REQUEST,
            r#"{"message": "Session token has expired"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, WaxError::SessionExpired(_)));
    }

    #[test]
    fn test_parse_expired_transaction_is_not_session() {
        let err = parse_sign_response(
            StatusCode::BAD_REQUEST,
            r#"{"message": "Transaction expired before signing"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, WaxError::RemoteSigner(_)));
        assert!(!err.requires_reauthentication());
    }

    #[test]
    fn test_parse_contract_error_on_5xx_is_transport() {
        let err = parse_sign_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": "eosio.token contract rejected transfer"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, WaxError::SigningTransport(_)));
        assert!(!err.requires_reauthentication());
    }

    #[test]
    fn test_parse_not_logged_in() {
        let err = parse_sign_response(StatusCode::OK, r#"{"error": "User not logged in"}"#)
            .unwrap_err();
        assert!(err.requires_reauthentication());
    }

    #[test]
    fn test_parse_server_error_is_transport() {
        let err = parse_sign_response(StatusCode::BAD_GATEWAY, "<html>").unwrap_err();
        assert!(matches!(err, WaxError::SigningTransport(_)));
    }

    #[test]
    fn test_debug_redacts_credential() {
        let remote = RemoteIdentity::new(
            "super-session",
            Name::new("carol").unwrap(),
            RemoteSignerConfig::default(),
        )
        .unwrap();
        let debug = format!("{remote:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("super-session"));
    }
}
