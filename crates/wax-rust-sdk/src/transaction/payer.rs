//! Resource sponsorship.
//!
//! A sponsor covers the CPU and NET cost of a transaction by authorizing a
//! minimal action of its own. The sponsor action must occupy a fixed slot
//! (first or last) and is injected at most once. For third-party sponsors
//! the packed transaction is sent to their signing service, which answers
//! with the sponsor's signature; their key never enters this process.
//!
//! # Example
//!
//! ```rust,ignore
//! use wax_rust_sdk::transaction::PayerInjection;
//!
//! let adapter = wax
//!     .multi_party(vec![identity.into()])
//!     .with_action(transfer)
//!     .pay_with(PayerInjection::atomichub(wax.config().network())?)?;
//! let result = adapter.push(None).await?;
//! ```

use crate::api::{ChainClient, TransactionResult};
use crate::config::Network;
use crate::error::{WaxError, WaxResult};
use crate::transaction::action::{ActionDescriptor, PermissionLevel};
use crate::transaction::multi_party::MultiPartyTransactionBuilder;
use crate::transaction::types::TransactionInfo;
use crate::types::Name;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// AtomicHub signing service (mainnet only).
pub const ATOMICHUB_SIGN_URL: &str = "https://wax-mainnet-signer.api.atomichub.io/v1/sign";
/// NeftyBlocks signing service on mainnet.
pub const NEFTYBLOCKS_MAINNET_URL: &str = "https://cpu.neftyblocks.com/";
/// NeftyBlocks signing service on testnet.
pub const NEFTYBLOCKS_TESTNET_URL: &str = "https://cpu-test.neftyblocks.com/";
/// Contract whose `noop` lets a pooled identity pay for a transaction.
pub const CO_SIGNER_CONTRACT: &str = "litewaxpayer";

const DEFAULT_PAYLOAD_KEY: &str = "transaction";
const PAYER_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the sponsor action must sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SponsorPosition {
    /// First action.
    #[default]
    Prepend,
    /// Last action.
    Append,
}

/// Describes a sponsor: the action it authorizes, the slot that action
/// occupies, and the service that co-signs for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayerInjection {
    action: ActionDescriptor,
    endpoint: Option<Url>,
    position: SponsorPosition,
    payload_key: String,
}

impl PayerInjection {
    /// Creates a descriptor from a sponsor action template.
    pub fn new(action: ActionDescriptor, endpoint: Option<Url>, position: SponsorPosition) -> Self {
        Self {
            action,
            endpoint,
            position,
            payload_key: DEFAULT_PAYLOAD_KEY.to_string(),
        }
    }

    /// `res.pink::noop` authorized by `res.pink@paybw`.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::Config`] for any network other than mainnet.
    pub fn atomichub(network: Network) -> WaxResult<Self> {
        if network != Network::Mainnet {
            return Err(WaxError::Config(format!(
                "AtomicHub only sponsors mainnet transactions, not {}",
                network.as_str()
            )));
        }
        let action = ActionDescriptor::parse(
            "res.pink",
            "noop",
            vec![PermissionLevel::parse("res.pink", "paybw")?],
            Vec::new(),
        )?;
        let endpoint = Url::parse(ATOMICHUB_SIGN_URL).expect("valid AtomicHub URL");
        Ok(Self::new(action, Some(endpoint), SponsorPosition::Prepend))
    }

    /// `neftybrespay::paycpu` authorized by `neftybrespay@active`.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::Config`] for a custom network.
    pub fn neftyblocks(network: Network) -> WaxResult<Self> {
        let url = match network {
            Network::Mainnet => NEFTYBLOCKS_MAINNET_URL,
            Network::Testnet => NEFTYBLOCKS_TESTNET_URL,
            Network::Custom => {
                return Err(WaxError::Config(
                    "NeftyBlocks only sponsors mainnet and testnet transactions".to_string(),
                ));
            }
        };
        let action = ActionDescriptor::parse(
            "neftybrespay",
            "paycpu",
            vec![PermissionLevel::active("neftybrespay")?],
            Vec::new(),
        )?;
        let endpoint = Url::parse(url).expect("valid NeftyBlocks URL");
        Ok(Self::new(action, Some(endpoint), SponsorPosition::Prepend))
    }

    /// `litewaxpayer::noop` authorized by a pooled identity, which then
    /// signs like any other participant. No service is involved.
    ///
    /// # Errors
    ///
    /// Returns an error only if the contract name fails validation.
    pub fn co_signer(authorization: PermissionLevel) -> WaxResult<Self> {
        let action = ActionDescriptor::new(
            Name::new(CO_SIGNER_CONTRACT)?,
            Name::new("noop")?,
            vec![authorization],
            Vec::new(),
        )?;
        Ok(Self::new(action, None, SponsorPosition::Prepend))
    }

    /// Uses `key` for the packed transaction in the signing request.
    #[must_use]
    pub fn with_payload_key(mut self, key: impl Into<String>) -> Self {
        self.payload_key = key.into();
        self
    }

    /// Moves the sponsor action to `position`.
    #[must_use]
    pub fn with_position(mut self, position: SponsorPosition) -> Self {
        self.position = position;
        self
    }

    /// Sponsor action template.
    pub fn action(&self) -> &ActionDescriptor {
        &self.action
    }

    /// Signing service, if the sponsor has one.
    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    /// Slot the sponsor action occupies.
    pub fn position(&self) -> SponsorPosition {
        self.position
    }

    /// JSON key carrying the packed transaction.
    pub fn payload_key(&self) -> &str {
        &self.payload_key
    }

    fn matches(&self, action: &ActionDescriptor) -> bool {
        self.action.authorization().first().is_some_and(|level| {
            action.is_call(self.action.account(), self.action.name(), level)
        })
    }

    /// Returns true if the sponsor action already occupies its slot.
    pub fn is_applied(&self, actions: &[ActionDescriptor]) -> bool {
        let slot = match self.position {
            SponsorPosition::Prepend => actions.first(),
            SponsorPosition::Append => actions.last(),
        };
        slot.is_some_and(|action| self.matches(action))
    }

    /// Puts the sponsor action in its slot.
    ///
    /// Does nothing if it is already there. A sponsor action found anywhere
    /// else is moved. Returns true if `actions` changed.
    pub fn apply(&self, actions: &mut Vec<ActionDescriptor>) -> bool {
        if self.is_applied(actions) {
            return false;
        }
        actions.retain(|action| !self.matches(action));
        match self.position {
            SponsorPosition::Prepend => actions.insert(0, self.action.clone()),
            SponsorPosition::Append => actions.push(self.action.clone()),
        }
        true
    }
}

/// A service that adds a sponsor signature to a packed transaction.
#[async_trait]
pub trait PayerSigner: Send + Sync + fmt::Debug {
    /// Returns the sponsor's signatures for `packed_trx` (hex).
    async fn co_sign(&self, packed_trx: &str) -> WaxResult<Vec<String>>;
}

/// HTTP implementation of [`PayerSigner`].
///
/// Posts `{"<payload_key>": "<packed hex>"}` and accepts both response
/// shapes sponsors use: `{"success", "message", "data"}` and
/// `{"signatures"}` / `{"error"}`.
#[derive(Clone, Debug)]
pub struct HttpPayerSigner {
    url: Url,
    payload_key: String,
    client: reqwest::Client,
}

impl HttpPayerSigner {
    /// Creates a signer posting to `url` with its own client.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::Http`] if the HTTP client fails to build.
    pub fn new(url: Url, payload_key: impl Into<String>) -> WaxResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(PAYER_TIMEOUT)
            .build()
            .map_err(WaxError::Http)?;
        Ok(Self::with_client(url, payload_key, client))
    }

    /// Creates a signer posting to `url` through an existing client.
    pub fn with_client(url: Url, payload_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url,
            payload_key: payload_key.into(),
            client,
        }
    }

    /// Creates a signer for the service named by `injection`, reusing the
    /// connection pool and timeout of `chain`.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::Config`] if the sponsor has no signing service.
    pub fn for_injection(injection: &PayerInjection, chain: &ChainClient) -> WaxResult<Self> {
        let url = injection.endpoint().cloned().ok_or_else(|| {
            WaxError::Config(format!(
                "sponsor {} has no signing service",
                injection.action()
            ))
        })?;
        Ok(Self::with_client(url, injection.payload_key(), chain.http().clone()))
    }
}

#[async_trait]
impl PayerSigner for HttpPayerSigner {
    async fn co_sign(&self, packed_trx: &str) -> WaxResult<Vec<String>> {
        let mut body = serde_json::Map::new();
        body.insert(
            self.payload_key.clone(),
            Value::String(packed_trx.to_string()),
        );

        let response = self
            .client
            .post(self.url.clone())
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(url = %self.url, status = status.as_u16(), "payer answered");

        match parse_payer_response(&text) {
            Err(WaxError::Payer(_)) if !status.is_success() => {
                Err(WaxError::api(status.as_u16(), truncate(&text)))
            }
            other => other,
        }
    }
}

#[derive(Deserialize)]
struct PayerResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    signatures: Option<Vec<String>>,
    #[serde(default)]
    data: Option<Value>,
}

/// Parses a sponsor's answer.
///
/// # Errors
///
/// Returns [`WaxError::PayerRejected`] for an explicit refusal and
/// [`WaxError::Payer`] for anything that carries no signatures.
pub fn parse_payer_response(body: &str) -> WaxResult<Vec<String>> {
    let response: PayerResponse = serde_json::from_str(body)
        .map_err(|e| WaxError::Payer(format!("malformed payer response: {e}")))?;

    if response.success == Some(false) {
        return Err(WaxError::PayerRejected {
            message: response
                .message
                .unwrap_or_else(|| "payer declined".to_string()),
        });
    }
    if let Some(error) = response.error.filter(|e| !e.is_null()) {
        let message = match error {
            Value::String(s) => s,
            other => other
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| other.to_string(), ToString::to_string),
        };
        return Err(WaxError::PayerRejected { message });
    }

    let signatures = response
        .signatures
        .or_else(|| response.data.and_then(signatures_from_data))
        .unwrap_or_default();
    if signatures.is_empty() {
        return Err(WaxError::Payer("payer response carries no signatures".to_string()));
    }
    Ok(signatures)
}

fn signatures_from_data(data: Value) -> Option<Vec<String>> {
    match data {
        Value::Array(_) => serde_json::from_value(data).ok(),
        Value::String(s) => Some(vec![s]),
        Value::Object(mut map) => map
            .remove("signatures")
            .and_then(|s| serde_json::from_value(s).ok()),
        _ => None,
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(200).collect()
}

/// Sponsors a multi-party transaction through a co-signing service.
///
/// Construction injects the sponsor action; [`push`](Self::push) collects
/// the participants' signatures, asks the service for the sponsor's, and
/// submits once. Nothing is retried: a payer that already signed may see
/// its signature land.
#[derive(Debug)]
pub struct PayerProtocolAdapter {
    builder: MultiPartyTransactionBuilder,
    injection: PayerInjection,
    signer: Arc<dyn PayerSigner>,
}

impl PayerProtocolAdapter {
    /// Wraps `builder`, injecting the sponsor action and using the HTTP
    /// service named by `injection` over the builder's chain client.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::Config`] if the sponsor has no signing service.
    pub fn new(builder: MultiPartyTransactionBuilder, injection: PayerInjection) -> WaxResult<Self> {
        let signer = Arc::new(HttpPayerSigner::for_injection(&injection, builder.chain())?);
        Ok(Self::with_signer(builder, injection, signer))
    }

    /// Wraps `builder` with a custom co-signing service.
    pub fn with_signer(
        mut builder: MultiPartyTransactionBuilder,
        injection: PayerInjection,
        signer: Arc<dyn PayerSigner>,
    ) -> Self {
        if builder.inject(&injection) {
            debug!(sponsor = %injection.action(), "injected sponsor action");
        }
        Self {
            builder,
            injection,
            signer,
        }
    }

    /// The wrapped builder.
    pub fn builder(&self) -> &MultiPartyTransactionBuilder {
        &self.builder
    }

    /// The sponsor descriptor.
    pub fn injection(&self) -> &PayerInjection {
        &self.injection
    }

    /// Re-applies the sponsor action. Returns true if the actions changed.
    pub fn ensure_injected(&mut self) -> bool {
        self.builder.inject(&self.injection)
    }

    /// Collects signatures, adds the sponsor's, and submits.
    ///
    /// `signed` may carry a transaction prepared earlier by
    /// [`MultiPartyTransactionBuilder::prepare_trx`]; otherwise one is
    /// prepared now.
    ///
    /// # Errors
    ///
    /// Returns signing errors, [`WaxError::PayerRejected`] or
    /// [`WaxError::Payer`] from the sponsor, transport errors, or the
    /// classified submission error.
    pub async fn push(&self, signed: Option<TransactionInfo>) -> WaxResult<TransactionResult> {
        let mut signed = match signed {
            Some(signed) => signed,
            None => self.builder.prepare_trx(None).await?,
        };

        let sponsor = self.injection.action().to_string();
        let extra = match self.signer.co_sign(&signed.packed).await {
            Ok(extra) => extra,
            Err(error) => {
                warn!(sponsor = %sponsor, error = %error.sanitized_message(), "payer did not sign");
                return Err(error);
            }
        };
        info!(sponsor = %sponsor, signatures = extra.len(), "payer co-signed");

        signed.signatures.extend(extra);
        self.builder.submit(signed).await
    }
}

impl fmt::Display for PayerProtocolAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.builder)
    }
}
