//! Chain RPC client.

use crate::api::response::{
    AbiJsonToBin, AccountsByAuthorizers, BlockInfo, ChainInfo, PushTransactionRequest,
    PushTransactionResponse,
};
use crate::config::WaxConfig;
use crate::error::{WaxError, WaxResult};
use crate::retry::{RetryConfig, RetryExecutor};
use crate::transaction::ReferenceBlock;
use crate::types::Name;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use url::Url;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Client for the chain's `/v1/chain` HTTP API.
///
/// Read-only calls retry with exponential backoff according to the
/// configured [`RetryConfig`]. [`push_transaction`](Self::push_transaction)
/// is sent exactly once.
///
/// # Example
///
/// ```rust,no_run
/// use wax_rust_sdk::api::ChainClient;
/// use wax_rust_sdk::WaxConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = ChainClient::new(WaxConfig::mainnet())?;
///     let info = client.get_info().await?;
///     println!("head block: {}", info.head_block_num);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ChainClient {
    config: WaxConfig,
    client: Client,
    retry_config: Arc<RetryConfig>,
}

impl ChainClient {
    /// Creates a new chain client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: WaxConfig) -> WaxResult<Self> {
        let builder = Client::builder().timeout(config.timeout);
        let client = config
            .pool_config
            .apply(builder)
            .build()
            .map_err(WaxError::Http)?;
        let retry_config = Arc::new(config.retry_config.clone());

        Ok(Self {
            config,
            client,
            retry_config,
        })
    }

    /// Returns the configuration this client was built from.
    pub fn config(&self) -> &WaxConfig {
        &self.config
    }

    /// Returns the shared HTTP client.
    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Returns the retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    // === Read-only calls ===

    /// Gets head block metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn get_info(&self) -> WaxResult<ChainInfo> {
        self.post_with_retry("get_info", json!({})).await
    }

    /// Gets a block by number or id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn get_block(&self, block_num_or_id: impl ToString) -> WaxResult<BlockInfo> {
        self.post_with_retry(
            "get_block",
            json!({ "block_num_or_id": block_num_or_id.to_string() }),
        )
        .await
    }

    /// Lists the accounts that `keys` can act for.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn get_accounts_by_authorizers(
        &self,
        keys: &[String],
        accounts: &[String],
    ) -> WaxResult<AccountsByAuthorizers> {
        self.post_with_retry(
            "get_accounts_by_authorizers",
            json!({ "keys": keys, "accounts": accounts }),
        )
        .await
    }

    /// Encodes JSON action arguments with the contract's ABI, on the node.
    ///
    /// # Errors
    ///
    /// Returns an error if the node rejects the arguments or returns
    /// malformed hex.
    pub async fn abi_json_to_bin(
        &self,
        code: &Name,
        action: &Name,
        args: &serde_json::Value,
    ) -> WaxResult<Vec<u8>> {
        let response: AbiJsonToBin = self
            .post_with_retry(
                "abi_json_to_bin",
                json!({ "code": code, "action": action, "args": args }),
            )
            .await?;
        Ok(hex::decode(response.binargs)?)
    }

    /// Fetches fresh reference data for a new transaction header.
    ///
    /// `ref_block_num` is the last irreversible block number masked to 16
    /// bits; `ref_block_prefix` comes from that block.
    ///
    /// # Errors
    ///
    /// Returns an error if either fetch fails, or [`WaxError::Config`] if the
    /// node follows a different chain than the configured one.
    pub async fn get_reference_block(&self) -> WaxResult<ReferenceBlock> {
        let info = self.get_info().await?;
        if let Some(expected) = self.config.chain_id {
            if expected != info.chain_id {
                return Err(WaxError::Config(format!(
                    "node reports chain id {}, expected {}",
                    info.chain_id, expected
                )));
            }
        }

        let block = self.get_block(info.last_irreversible_block_num).await?;
        let reference = ReferenceBlock {
            chain_id: info.chain_id,
            ref_block_num: (info.last_irreversible_block_num & 0xffff) as u16,
            ref_block_prefix: block.reference_prefix()?,
        };
        debug!(
            block_num = info.last_irreversible_block_num,
            ref_block_num = reference.ref_block_num,
            ref_block_prefix = reference.ref_block_prefix,
            "fetched reference block"
        );
        Ok(reference)
    }

    // === Submission ===

    /// Posts a signed transaction once and returns the node's raw answer.
    ///
    /// The body is parsed whatever the HTTP status, since nodes report
    /// rejected transactions as `500` with a JSON error envelope. Use
    /// [`SubmissionClient`](crate::api::SubmissionClient) to classify it.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-JSON body.
    pub async fn push_transaction(
        &self,
        request: &PushTransactionRequest,
    ) -> WaxResult<PushTransactionResponse> {
        let url = self.build_url("push_transaction");
        let response = self.send(url, request).await?;
        let status = response.status();
        let text = response.text().await?;

        serde_json::from_str(&text).map_err(|_| {
            WaxError::api(
                status.as_u16(),
                format!("unexpected push_transaction response: {text}"),
            )
        })
    }

    // === Helper Methods ===

    fn build_url(&self, method: &str) -> Url {
        let mut url = self.config.endpoints.next_endpoint();
        if !url.path().ends_with('/') {
            url.set_path(&format!("{}/", url.path()));
        }
        url.set_path(&format!("{}v1/chain/{}", url.path(), method));
        url
    }

    async fn send<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> WaxResult<reqwest::Response> {
        let result = self
            .client
            .post(url.clone())
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .json(body)
            .send()
            .await;

        result.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                self.config.endpoints.report_failure(&url);
            }
            WaxError::Http(e)
        })
    }

    async fn post_with_retry<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> WaxResult<T> {
        let executor = RetryExecutor::new((*self.retry_config).clone());
        executor
            .execute(|| {
                let body = body.clone();
                let url = self.build_url(method);
                async move {
                    let response = self.send(url, &body).await?;
                    Self::handle_response(response).await
                }
            })
            .await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> WaxResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body
            .pointer("/error/what")
            .or_else(|| body.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Err(WaxError::api(status.as_u16(), message))
    }
}
