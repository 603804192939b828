//! Transaction submission and result classification.
//!
//! Nodes report most failures as a JSON envelope with an empty transaction
//! id. Classification keys on the exception name when present and falls back
//! to matching the message text; anything unrecognized becomes
//! [`WaxError::UnknownChain`].

use crate::api::chain::ChainClient;
use crate::api::response::{PushTransactionRequest, PushTransactionResponse, TransactionResult};
use crate::error::{ChainErrorDetails, WaxError, WaxResult};
use tracing::{info, warn};

const RESOURCE_EXCEPTION_NAMES: &[&str] = &[
    "tx_cpu_usage_exceeded",
    "tx_net_usage_exceeded",
    "leeway_deadline_exception",
];

const RESOURCE_PHRASES: &[&str] = &[
    "cpu usage limit",
    "net usage",
    "network usage limit",
    "billed cpu time",
    "cpu limit",
];

const EXPIRED_EXCEPTION_NAMES: &[&str] = &["expired_tx_exception", "tx_exp_too_far_exception"];

const EXPIRED_PHRASES: &[&str] = &["expired transaction", "transaction has expired"];

/// Posts signed transactions and classifies the outcome.
///
/// Submission is never retried here: a lost response may mean the
/// transaction already landed.
#[derive(Debug, Clone)]
pub struct SubmissionClient {
    chain: ChainClient,
}

impl SubmissionClient {
    /// Creates a submission client on top of `chain`.
    pub fn new(chain: ChainClient) -> Self {
        Self { chain }
    }

    /// Submits `packed_trx` (hex) with `signatures`.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::CpuLimitExceeded`], [`WaxError::TransactionExpired`]
    /// or [`WaxError::UnknownChain`] for chain rejections, and transport
    /// errors as they occurred.
    pub async fn post(
        &self,
        packed_trx: &str,
        signatures: Vec<String>,
    ) -> WaxResult<TransactionResult> {
        let request = PushTransactionRequest::new(packed_trx, signatures);
        let response = self.chain.push_transaction(&request).await?;

        match classify(response) {
            Ok(result) => {
                info!(transaction_id = %result.transaction_id, "transaction accepted");
                Ok(result)
            }
            Err(error) => {
                warn!(error = %error.sanitized_message(), "transaction rejected");
                Err(error)
            }
        }
    }
}

/// Classifies a raw `push_transaction` response.
///
/// A non-empty transaction id is success regardless of other fields.
///
/// # Errors
///
/// Returns the classified chain error for any response without an id.
pub fn classify(response: PushTransactionResponse) -> WaxResult<TransactionResult> {
    if let Some(id) = response.transaction_id.filter(|id| !id.is_empty()) {
        return Ok(TransactionResult {
            transaction_id: id,
            processed: response.processed,
        });
    }

    let details = match response.error {
        Some(body) => ChainErrorDetails::from(body),
        None => ChainErrorDetails {
            what: response
                .message
                .unwrap_or_else(|| "push_transaction returned no transaction id".to_string()),
            ..Default::default()
        },
    };

    Err(classify_error(details))
}

fn classify_error(details: ChainErrorDetails) -> WaxError {
    let name = details.name.as_deref().unwrap_or_default();
    let text = format!(
        "{} {}",
        details.what,
        details.detail.as_deref().unwrap_or_default()
    )
    .to_lowercase();

    if RESOURCE_EXCEPTION_NAMES.contains(&name) || matches_any(&text, RESOURCE_PHRASES) {
        WaxError::CpuLimitExceeded(details)
    } else if EXPIRED_EXCEPTION_NAMES.contains(&name) || matches_any(&text, EXPIRED_PHRASES) {
        WaxError::TransactionExpired(details)
    } else {
        WaxError::UnknownChain(details)
    }
}

fn matches_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaxConfig;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method, path},
    };

    fn parse(value: serde_json::Value) -> PushTransactionResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_non_empty_id_is_success() {
        let result = classify(parse(json!({
            "transaction_id": "abc123",
            "error": { "what": "ignored" }
        })))
        .unwrap();
        assert_eq!(result.transaction_id, "abc123");
    }

    #[test]
    fn test_cpu_limit_by_message() {
        let err = classify(parse(json!({
            "transaction_id": "",
            "error": { "what": "Transaction exceeded the current CPU usage limit imposed on the transaction" }
        })))
        .unwrap_err();
        assert!(matches!(err, WaxError::CpuLimitExceeded(_)));
        assert!(err.needs_rebuild());
    }

    #[test]
    fn test_net_limit_by_name() {
        let err = classify(parse(json!({
            "error": { "name": "tx_net_usage_exceeded", "what": "Transaction exceeded the current network usage limit" }
        })))
        .unwrap_err();
        assert!(matches!(err, WaxError::CpuLimitExceeded(_)));
    }

    #[test]
    fn test_net_limit_by_message() {
        let err = classify(parse(json!({
            "transaction_id": "",
            "error": {
                "what": "Transaction exceeded the current network usage limit imposed on the transaction"
            }
        })))
        .unwrap_err();
        assert!(matches!(err, WaxError::CpuLimitExceeded(_)));
        assert!(err.needs_rebuild());
    }

    #[test]
    fn test_cpu_limit_by_detail() {
        let err = classify(parse(json!({
            "error": {
                "what": "Leeway deadline exceeded",
                "details": [{ "message": "billed CPU time (2000 us) is greater than the maximum" }]
            }
        })))
        .unwrap_err();
        assert!(matches!(err, WaxError::CpuLimitExceeded(_)));
    }

    #[test]
    fn test_expired() {
        let err = classify(parse(json!({
            "transaction_id": "",
            "error": { "what": "Expired Transaction" }
        })))
        .unwrap_err();
        assert!(matches!(err, WaxError::TransactionExpired(_)));
    }

    #[test]
    fn test_unknown_chain_error_keeps_message() {
        let err = classify(parse(json!({
            "transaction_id": "",
            "error": {
                "code": 3050003,
                "name": "eosio_assert_message_exception",
                "what": "eosio_assert_message assertion failure",
                "details": [{ "message": "assertion failure with message: overdrawn balance" }]
            }
        })))
        .unwrap_err();
        match err {
            WaxError::UnknownChain(details) => {
                assert_eq!(details.code, Some(3050003));
                assert!(details.message().contains("overdrawn balance"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_everything_is_unknown() {
        let err = classify(PushTransactionResponse::default()).unwrap_err();
        assert!(matches!(err, WaxError::UnknownChain(_)));
    }

    #[tokio::test]
    async fn test_post_sends_expected_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chain/push_transaction"))
            .and(body_json(json!({
                "signatures": ["SIG_K1_a", "SIG_K1_b"],
                "compression": 0,
                "packed_context_free_data": "",
                "packed_trx": "deadbeef"
            })))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "transaction_id": "f00d",
                "processed": { "receipt": { "status": "executed" } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let chain = ChainClient::new(WaxConfig::custom(&server.uri()).unwrap()).unwrap();
        let result = SubmissionClient::new(chain)
            .post(
                "deadbeef",
                vec!["SIG_K1_a".to_string(), "SIG_K1_b".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(result.transaction_id, "f00d");
        assert!(result.processed.is_some());
    }

    #[tokio::test]
    async fn test_post_classifies_http_500_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chain/push_transaction"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "code": 500,
                "message": "Internal Service Error",
                "error": {
                    "code": 3080004,
                    "name": "tx_cpu_usage_exceeded",
                    "what": "Transaction exceeded the current CPU usage limit imposed on the transaction",
                    "details": []
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let chain = ChainClient::new(WaxConfig::custom(&server.uri()).unwrap()).unwrap();
        let err = SubmissionClient::new(chain)
            .post("00", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, WaxError::CpuLimitExceeded(_)));
    }
}
