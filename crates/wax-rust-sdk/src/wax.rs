//! Main WAX client entry point.
//!
//! The [`Wax`] struct ties the configuration, the shared chain client and
//! the transaction builders together.

use crate::api::{ChainClient, ChainInfo, SubmissionClient};
use crate::config::WaxConfig;
use crate::contract::Contract;
use crate::crypto::PrivateKey;
use crate::error::WaxResult;
use crate::identity::{LocalIdentity, RemoteIdentity, SigningIdentity};
use crate::transaction::{MultiPartyTransactionBuilder, ReferenceBlock, TransactionBuilder};
use crate::types::Name;
use std::sync::Arc;

/// The main entry point for the WAX SDK.
///
/// # Example
///
/// ```rust,no_run
/// use wax_rust_sdk::{Wax, WaxConfig};
/// use wax_rust_sdk::identity::LocalIdentity;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let wax = Wax::new(WaxConfig::testnet())?;
///     let alice = LocalIdentity::from_key_str("5K...", "alice")?;
///
///     let token = wax.contract("eosio.token", &alice.clone().into())?;
///     let transfer = token
///         .call_json(
///             wax.chain(),
///             "transfer",
///             &serde_json::json!({
///                 "from": "alice", "to": "bob",
///                 "quantity": "1.00000000 WAX", "memo": ""
///             }),
///         )
///         .await?;
///
///     let result = wax.transaction(alice).with_action(transfer).push(None).await?;
///     println!("transaction id: {}", result.transaction_id);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Wax {
    config: WaxConfig,
    chain: Arc<ChainClient>,
}

impl Wax {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: WaxConfig) -> WaxResult<Self> {
        let chain = Arc::new(ChainClient::new(config.clone())?);
        Ok(Self { config, chain })
    }

    /// Creates a client for mainnet with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn mainnet() -> WaxResult<Self> {
        Self::new(WaxConfig::mainnet())
    }

    /// Creates a client for testnet with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn testnet() -> WaxResult<Self> {
        Self::new(WaxConfig::testnet())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &WaxConfig {
        &self.config
    }

    /// Returns the chain client.
    pub fn chain(&self) -> &ChainClient {
        &self.chain
    }

    /// Returns a submission client sharing this client's connection pool.
    pub fn submission(&self) -> SubmissionClient {
        SubmissionClient::new(self.chain.as_ref().clone())
    }

    // === Chain state ===

    /// Fetches head block metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_info(&self) -> WaxResult<ChainInfo> {
        self.chain.get_info().await
    }

    /// Fetches reference data for a new transaction header.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the node is on another chain.
    pub async fn reference_block(&self) -> WaxResult<ReferenceBlock> {
        self.chain.get_reference_block().await
    }

    // === Identities ===

    /// Resolves the account controlled by `key`.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::Config`](crate::WaxError::Config) if the key
    /// controls no account.
    pub async fn local_identity(&self, key: PrivateKey) -> WaxResult<LocalIdentity> {
        LocalIdentity::resolve(key, &self.chain).await
    }

    /// Creates a wallet identity using the configured signer settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the account name is invalid or the HTTP client
    /// fails to build.
    pub fn remote_identity(
        &self,
        credential: impl Into<String>,
        account: &str,
    ) -> WaxResult<RemoteIdentity> {
        RemoteIdentity::new(
            credential,
            Name::new(account)?,
            self.config.remote_signer().clone(),
        )
    }

    // === Transactions ===

    /// Contract `account` called with `identity`'s authorization.
    ///
    /// # Errors
    ///
    /// Returns an error if `account` is not a valid name.
    pub fn contract(&self, account: &str, identity: &SigningIdentity) -> WaxResult<Contract> {
        Ok(Contract::for_identity(Name::new(account)?, identity))
    }

    /// Starts a transaction signed by `identity`.
    pub fn transaction(&self, identity: impl Into<SigningIdentity>) -> TransactionBuilder {
        TransactionBuilder::new(Arc::clone(&self.chain), identity)
    }

    /// Starts a transaction signed by the members of `pool` it references.
    pub fn multi_party(&self, pool: Vec<SigningIdentity>) -> MultiPartyTransactionBuilder {
        MultiPartyTransactionBuilder::new(Arc::clone(&self.chain), pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    const DEV_WIF: &str = "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3";

    #[test]
    fn test_presets() {
        assert_eq!(Wax::mainnet().unwrap().config().network(), Network::Mainnet);
        assert_eq!(Wax::testnet().unwrap().config().network(), Network::Testnet);
    }

    #[test]
    fn test_builders_share_chain_client() {
        let wax = Wax::testnet().unwrap();
        let alice: SigningIdentity = LocalIdentity::from_key_str(DEV_WIF, "alice").unwrap().into();
        let token = wax.contract("eosio.token", &alice).unwrap();
        let builder = wax
            .transaction(alice.clone())
            .with_action(token.call("transfer", vec![]).unwrap());
        assert_eq!(builder.actions().len(), 1);

        let multi = wax.multi_party(vec![alice]);
        assert_eq!(multi.pool().len(), 1);
        assert!(wax.remote_identity("cookie", "Bad").is_err());
    }

    #[tokio::test]
    async fn test_local_identity_resolution() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chain/get_accounts_by_authorizers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accounts": [{
                    "account_name": "alice",
                    "permission_name": "active",
                    "authorizing_key": "PUB_K1_6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5BoDq63",
                    "weight": 1,
                    "threshold": 1
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let wax = Wax::new(WaxConfig::custom(&server.uri()).unwrap()).unwrap();
        let identity = wax.local_identity(DEV_WIF.parse().unwrap()).await.unwrap();
        assert_eq!(identity.authorization().to_string(), "alice@active");
    }
}
