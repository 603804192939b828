//! Transactions signed by a single identity.

use crate::api::{ChainClient, TransactionResult};
use crate::error::WaxResult;
use crate::identity::SigningIdentity;
use crate::transaction::action::ActionDescriptor;
use crate::transaction::multi_party::MultiPartyTransactionBuilder;
use crate::transaction::payer::{PayerInjection, PayerProtocolAdapter, PayerSigner};
use crate::transaction::types::{PackedTransaction, ReferenceBlock, TransactionInfo};
use std::fmt;
use std::sync::Arc;

/// Builds, signs and submits a transaction for one identity.
///
/// # Example
///
/// ```rust,ignore
/// use wax_rust_sdk::{Wax, contract::Contract};
///
/// let wax = Wax::mainnet()?;
/// let token = Contract::parse("eosio.token", "alice@active")?;
/// let result = wax
///     .transaction(alice)
///     .with_action(token.call("transfer", transfer_args)?)
///     .push(None)
///     .await?;
/// println!("{}", result.transaction_id);
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    inner: MultiPartyTransactionBuilder,
}

impl TransactionBuilder {
    /// Creates a builder that signs with `identity`.
    pub fn new(chain: Arc<ChainClient>, identity: impl Into<SigningIdentity>) -> Self {
        Self {
            inner: MultiPartyTransactionBuilder::new(chain, vec![identity.into()]),
        }
    }

    /// The signing identity.
    pub fn identity(&self) -> Option<&SigningIdentity> {
        self.inner.pool().first()
    }

    /// Appends `action`.
    pub fn add_action(&mut self, action: ActionDescriptor) -> &mut Self {
        self.inner.add_action(action);
        self
    }

    /// Appends `action`.
    #[must_use]
    pub fn with_action(mut self, action: ActionDescriptor) -> Self {
        self.inner.add_action(action);
        self
    }

    /// Appends every action in `actions`, in order.
    #[must_use]
    pub fn with_actions(self, actions: impl IntoIterator<Item = ActionDescriptor>) -> Self {
        Self {
            inner: self.inner.with_actions(actions),
        }
    }

    /// Sets how long the transaction stays valid.
    #[must_use]
    pub fn with_expiration_secs(self, secs: u32) -> Self {
        Self {
            inner: self.inner.with_expiration_secs(secs),
        }
    }

    /// Actions in wire order.
    pub fn actions(&self) -> &[ActionDescriptor] {
        self.inner.actions()
    }

    /// Turns this into a multi-party builder with the same actions.
    pub fn into_multi_party(self) -> MultiPartyTransactionBuilder {
        self.inner
    }

    /// Lets `payer` cover resources by co-signing; the transaction then has
    /// two signers.
    ///
    /// # Errors
    ///
    /// Returns an error only if the sponsor action cannot be built.
    pub fn pay_with_identity(self, payer: SigningIdentity) -> WaxResult<MultiPartyTransactionBuilder> {
        self.inner.pay_with_identity(payer)
    }

    /// Lets a third-party sponsor cover resources.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::Config`](crate::WaxError::Config) if the sponsor
    /// has no signing service.
    pub fn pay_with(self, injection: PayerInjection) -> WaxResult<PayerProtocolAdapter> {
        self.inner.pay_with(injection)
    }

    /// Lets a sponsor reached through `signer` cover resources.
    pub fn pay_with_signer(
        self,
        injection: PayerInjection,
        signer: Arc<dyn PayerSigner>,
    ) -> PayerProtocolAdapter {
        self.inner.pay_with_signer(injection, signer)
    }

    /// Serializes without signing.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no actions or reference data cannot be
    /// fetched.
    pub async fn pack(&self, reference: Option<ReferenceBlock>) -> WaxResult<PackedTransaction> {
        self.inner.pack(reference).await
    }

    /// Signs `packed`.
    ///
    /// # Errors
    ///
    /// Returns the signing error.
    pub async fn sign(&self, packed: &PackedTransaction) -> WaxResult<Vec<String>> {
        self.inner.sign(packed).await
    }

    /// Packs and signs.
    ///
    /// # Errors
    ///
    /// Returns packing or signing errors.
    pub async fn prepare_trx(&self, reference: Option<ReferenceBlock>) -> WaxResult<TransactionInfo> {
        self.inner.prepare_trx(reference).await
    }

    /// Submits `signed`, or a freshly prepared transaction.
    ///
    /// # Errors
    ///
    /// Returns preparation errors or the classified submission error.
    pub async fn push(&self, signed: Option<TransactionInfo>) -> WaxResult<TransactionResult> {
        self.inner.push(signed).await
    }
}

impl fmt::Display for TransactionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self
            .inner
            .chain()
            .config()
            .endpoints()
            .endpoints()
            .first()
            .map_or_else(String::new, ToString::to_string);
        let signer = self
            .identity()
            .map_or_else(String::new, |identity| identity.account().to_string());
        write!(f, "Transaction(node: {node}, signer: {signer})")?;
        for action in self.actions() {
            write!(f, "\n  {action}")?;
        }
        Ok(())
    }
}
