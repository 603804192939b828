//! Network configuration for the WAX SDK.
//!
//! This module provides configuration options for connecting to WAX mainnet,
//! testnet, or custom nodes, and for the remote wallet signer.

use crate::api::{EndpointStrategy, FixedEndpoint};
use crate::retry::RetryConfig;
use crate::types::ChainId;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Default time a transaction stays valid, in seconds.
pub const DEFAULT_EXPIRATION_SECS: u32 = 180;

const MAINNET_NODE: &str = "https://wax.greymass.com";
const TESTNET_NODE: &str = "https://waxtestnet.greymass.com";
const WALLET_SIGN_URL: &str = "https://public-wax-on.wax.io/wam/sign";

/// Configuration for HTTP connection pooling.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of idle connections per host.
    /// Default: unlimited
    pub max_idle_per_host: Option<usize>,
    /// How long to keep idle connections alive.
    /// Default: 90 seconds
    pub idle_timeout: Duration,
    /// TCP keepalive interval.
    /// Default: 60 seconds
    pub tcp_keepalive: Option<Duration>,
    /// Whether to enable TCP nodelay.
    /// Default: true
    pub tcp_nodelay: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: None,
            idle_timeout: Duration::from_secs(90),
            tcp_keepalive: Some(Duration::from_secs(60)),
            tcp_nodelay: true,
        }
    }
}

impl PoolConfig {
    /// Creates a configuration for bots that push many transactions.
    pub fn high_throughput() -> Self {
        Self {
            max_idle_per_host: Some(32),
            idle_timeout: Duration::from_secs(300),
            tcp_keepalive: Some(Duration::from_secs(30)),
            tcp_nodelay: true,
        }
    }

    /// Creates a minimal configuration for constrained environments.
    pub fn minimal() -> Self {
        Self {
            max_idle_per_host: Some(2),
            idle_timeout: Duration::from_secs(10),
            tcp_keepalive: None,
            tcp_nodelay: true,
        }
    }

    /// Applies this pool configuration to a `reqwest` client builder.
    pub(crate) fn apply(&self, builder: reqwest::ClientBuilder) -> reqwest::ClientBuilder {
        let mut builder = builder
            .pool_max_idle_per_host(self.max_idle_per_host.unwrap_or(usize::MAX))
            .pool_idle_timeout(self.idle_timeout)
            .tcp_nodelay(self.tcp_nodelay);
        if let Some(keepalive) = self.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }
        builder
    }
}

/// Settings for the hosted wallet that signs for [`RemoteIdentity`](crate::identity::RemoteIdentity).
#[derive(Debug, Clone)]
pub struct RemoteSignerConfig {
    /// Signing endpoint.
    pub sign_url: Url,
    /// `origin` header sent with signing requests.
    pub origin: String,
    /// `referer` header sent with signing requests.
    pub referer: String,
    /// `website` field of the signing request.
    pub website: String,
    /// `description` field of the signing request.
    pub description: String,
    /// Whether to ask the wallet to cover bandwidth.
    pub free_bandwidth: bool,
    /// Timeout for one signing round trip.
    pub timeout: Duration,
}

impl Default for RemoteSignerConfig {
    fn default() -> Self {
        Self {
            sign_url: Url::parse(WALLET_SIGN_URL).expect("valid wallet URL"),
            origin: "https://all-access.wax.io".to_string(),
            referer: "https://all-access.wax.io/".to_string(),
            website: "wallet.wax.io".to_string(),
            description: "jwt is insecure".to_string(),
            free_bandwidth: true,
            timeout: Duration::from_secs(120),
        }
    }
}

impl RemoteSignerConfig {
    /// Points signing requests at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not a valid URL.
    pub fn with_sign_url(mut self, url: &str) -> Result<Self, url::ParseError> {
        self.sign_url = Url::parse(url)?;
        Ok(self)
    }

    /// Sets the signing request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Known WAX networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// WAX mainnet
    Mainnet,
    /// WAX testnet
    Testnet,
    /// Custom network
    Custom,
}

impl Network {
    /// Returns the chain ID for this network, if it is a known one.
    pub fn chain_id(&self) -> Option<ChainId> {
        match self {
            Network::Mainnet => Some(ChainId::mainnet()),
            Network::Testnet => Some(ChainId::testnet()),
            Network::Custom => None,
        }
    }

    /// Returns the network name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Custom => "custom",
        }
    }
}

/// Configuration for the WAX client.
///
/// Use one of the presets and refine it with the `with_*` methods.
///
/// # Example
///
/// ```rust
/// use wax_rust_sdk::WaxConfig;
/// use wax_rust_sdk::retry::RetryConfig;
///
/// let config = WaxConfig::testnet()
///     .with_timeout(std::time::Duration::from_secs(10))
///     .with_retry(RetryConfig::aggressive())
///     .with_expiration_secs(60);
/// ```
#[derive(Debug, Clone)]
pub struct WaxConfig {
    pub(crate) network: Network,
    pub(crate) endpoints: Arc<dyn EndpointStrategy>,
    pub(crate) chain_id: Option<ChainId>,
    pub(crate) timeout: Duration,
    pub(crate) retry_config: RetryConfig,
    pub(crate) pool_config: PoolConfig,
    pub(crate) expiration_secs: u32,
    pub(crate) remote_signer: RemoteSignerConfig,
}

impl Default for WaxConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl WaxConfig {
    fn with_network(network: Network, endpoints: Arc<dyn EndpointStrategy>) -> Self {
        Self {
            network,
            endpoints,
            chain_id: network.chain_id(),
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::default(),
            pool_config: PoolConfig::default(),
            expiration_secs: DEFAULT_EXPIRATION_SECS,
            remote_signer: RemoteSignerConfig::default(),
        }
    }

    /// Creates a configuration for WAX mainnet.
    pub fn mainnet() -> Self {
        let node = Url::parse(MAINNET_NODE).expect("valid mainnet URL");
        Self::with_network(Network::Mainnet, Arc::new(FixedEndpoint::new(node)))
    }

    /// Creates a configuration for WAX testnet.
    pub fn testnet() -> Self {
        let node = Url::parse(TESTNET_NODE).expect("valid testnet URL");
        Self::with_network(Network::Testnet, Arc::new(FixedEndpoint::new(node)))
    }

    /// Creates a custom configuration with the specified node URL.
    ///
    /// The chain id is taken from the node's `get_info` unless pinned with
    /// [`with_chain_id`](Self::with_chain_id).
    ///
    /// # Errors
    ///
    /// Returns an error if `node_url` is not a valid URL.
    pub fn custom(node_url: &str) -> Result<Self, url::ParseError> {
        let node = Url::parse(node_url)?;
        Ok(Self::with_network(
            Network::Custom,
            Arc::new(FixedEndpoint::new(node)),
        ))
    }

    /// Replaces the node selection strategy.
    #[must_use]
    pub fn with_endpoint_strategy(mut self, strategy: Arc<dyn EndpointStrategy>) -> Self {
        self.endpoints = strategy;
        self
    }

    /// Pins the chain id. Reference data from a node reporting a different
    /// chain id is rejected.
    #[must_use]
    pub fn with_chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Sets the request timeout for chain and payer calls.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry configuration for read-only chain calls.
    #[must_use]
    pub fn with_retry(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Disables automatic retry for read-only chain calls.
    #[must_use]
    pub fn without_retry(mut self) -> Self {
        self.retry_config = RetryConfig::no_retry();
        self
    }

    /// Sets the connection pool configuration.
    #[must_use]
    pub fn with_pool(mut self, pool_config: PoolConfig) -> Self {
        self.pool_config = pool_config;
        self
    }

    /// Sets how long built transactions stay valid, in seconds.
    #[must_use]
    pub fn with_expiration_secs(mut self, secs: u32) -> Self {
        self.expiration_secs = secs;
        self
    }

    /// Sets the remote wallet signer configuration.
    #[must_use]
    pub fn with_remote_signer(mut self, remote_signer: RemoteSignerConfig) -> Self {
        self.remote_signer = remote_signer;
        self
    }

    /// Returns the network.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Returns the node selection strategy.
    pub fn endpoints(&self) -> &Arc<dyn EndpointStrategy> {
        &self.endpoints
    }

    /// Returns the pinned chain id, if any.
    pub fn chain_id(&self) -> Option<ChainId> {
        self.chain_id
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// Returns the connection pool configuration.
    pub fn pool_config(&self) -> &PoolConfig {
        &self.pool_config
    }

    /// Returns the transaction expiration window in seconds.
    pub fn expiration_secs(&self) -> u32 {
        self.expiration_secs
    }

    /// Returns the remote wallet signer configuration.
    pub fn remote_signer(&self) -> &RemoteSignerConfig {
        &self.remote_signer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RoundRobinEndpoints;

    #[test]
    fn test_mainnet_config() {
        let config = WaxConfig::mainnet();
        assert_eq!(config.network(), Network::Mainnet);
        assert_eq!(config.chain_id(), Some(ChainId::mainnet()));
        assert_eq!(
            config.endpoints().next_endpoint().as_str(),
            "https://wax.greymass.com/"
        );
        assert_eq!(config.expiration_secs(), DEFAULT_EXPIRATION_SECS);
    }

    #[test]
    fn test_testnet_config() {
        let config = WaxConfig::testnet();
        assert_eq!(config.network().as_str(), "testnet");
        assert_eq!(config.chain_id(), Some(ChainId::testnet()));
    }

    #[test]
    fn test_custom_config_has_no_chain_id() {
        let config = WaxConfig::custom("http://127.0.0.1:8888").unwrap();
        assert_eq!(config.network(), Network::Custom);
        assert!(config.chain_id().is_none());
        assert!(WaxConfig::custom("not a url").is_err());
    }

    #[test]
    fn test_builder_methods() {
        let strategy = Arc::new(
            RoundRobinEndpoints::parse(["https://a.example.com", "https://b.example.com"]).unwrap(),
        );
        let config = WaxConfig::custom("http://127.0.0.1:8888")
            .unwrap()
            .with_endpoint_strategy(strategy)
            .with_chain_id(ChainId::testnet())
            .with_timeout(Duration::from_secs(5))
            .without_retry()
            .with_pool(PoolConfig::minimal())
            .with_expiration_secs(60);

        assert_eq!(config.endpoints().endpoints().len(), 2);
        assert_eq!(config.chain_id(), Some(ChainId::testnet()));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.retry_config().max_retries, 0);
        assert_eq!(config.pool_config().max_idle_per_host, Some(2));
        assert_eq!(config.expiration_secs(), 60);
    }

    #[test]
    fn test_remote_signer_defaults() {
        let signer = RemoteSignerConfig::default();
        assert_eq!(signer.sign_url.as_str(), WALLET_SIGN_URL);
        assert_eq!(signer.timeout, Duration::from_secs(120));
        assert!(signer.free_bandwidth);

        let signer = signer
            .with_sign_url("http://127.0.0.1:9000/wam/sign")
            .unwrap()
            .with_timeout(Duration::from_secs(1));
        assert_eq!(signer.sign_url.path(), "/wam/sign");
        assert_eq!(signer.timeout, Duration::from_secs(1));
    }
}
