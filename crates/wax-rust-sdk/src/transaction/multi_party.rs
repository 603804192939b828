//! Transactions signed by several identities.

use crate::api::{ChainClient, SubmissionClient, TransactionResult};
use crate::error::{WaxError, WaxResult};
use crate::identity::SigningIdentity;
use crate::transaction::action::ActionDescriptor;
use crate::transaction::payer::{PayerInjection, PayerProtocolAdapter, PayerSigner};
use crate::transaction::types::{
    PackedTransaction, PendingTransaction, ReferenceBlock, TransactionHeader, TransactionInfo,
    distinct_actors,
};
use crate::types::Name;
use futures::future::try_join_all;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Builds a transaction and collects signatures from a pool of identities.
///
/// Only identities whose account appears in some action's authorization
/// sign; other pool members are skipped, so a pool may hold more identities
/// than any one transaction needs. Actions are encoded in the order they
/// were added.
///
/// A builder is meant for one transaction. Header fields bind to a recent
/// block, so build a new one for every attempt.
///
/// # Example
///
/// ```rust,ignore
/// let builder = wax
///     .multi_party(vec![alice.into(), bob.into()])
///     .with_action(transfer_from_alice)
///     .with_action(transfer_from_bob);
/// let result = builder.push(None).await?;
/// ```
#[derive(Debug, Clone)]
pub struct MultiPartyTransactionBuilder {
    chain: Arc<ChainClient>,
    pool: Vec<SigningIdentity>,
    actions: Vec<ActionDescriptor>,
    expiration_secs: u32,
}

impl MultiPartyTransactionBuilder {
    /// Creates a builder signing with `pool`.
    ///
    /// Later identities for an account already in the pool are ignored.
    pub fn new(chain: Arc<ChainClient>, pool: Vec<SigningIdentity>) -> Self {
        let expiration_secs = chain.config().expiration_secs();
        let mut builder = Self {
            chain,
            pool: Vec::with_capacity(pool.len()),
            actions: Vec::new(),
            expiration_secs,
        };
        for identity in pool {
            builder.add_identity(identity);
        }
        builder
    }

    /// Adds `identity` to the pool unless its account is already there.
    /// Returns true if it was added.
    pub fn add_identity(&mut self, identity: SigningIdentity) -> bool {
        if self.identity(identity.account()).is_some() {
            debug!(account = %identity.account(), "identity already in pool");
            return false;
        }
        self.pool.push(identity);
        true
    }

    /// Adds `identity` to the pool.
    #[must_use]
    pub fn with_identity(mut self, identity: SigningIdentity) -> Self {
        self.add_identity(identity);
        self
    }

    /// Appends `action`.
    pub fn add_action(&mut self, action: ActionDescriptor) -> &mut Self {
        self.actions.push(action);
        self
    }

    /// Appends `action`.
    #[must_use]
    pub fn with_action(mut self, action: ActionDescriptor) -> Self {
        self.actions.push(action);
        self
    }

    /// Appends every action in `actions`, in order.
    #[must_use]
    pub fn with_actions(mut self, actions: impl IntoIterator<Item = ActionDescriptor>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Sets how long the transaction stays valid.
    #[must_use]
    pub fn with_expiration_secs(mut self, secs: u32) -> Self {
        self.expiration_secs = secs;
        self
    }

    /// Actions in wire order.
    pub fn actions(&self) -> &[ActionDescriptor] {
        &self.actions
    }

    /// Identities available for signing.
    pub fn pool(&self) -> &[SigningIdentity] {
        &self.pool
    }

    /// Chain client used for reference data and submission.
    pub fn chain(&self) -> &ChainClient {
        &self.chain
    }

    /// Pool member signing for `account`, if any.
    pub fn identity(&self, account: &Name) -> Option<&SigningIdentity> {
        self.pool.iter().find(|identity| identity.account() == account)
    }

    /// Distinct accounts referenced by the actions' authorizations, in
    /// first-seen order.
    pub fn whitelist(&self) -> Vec<Name> {
        distinct_actors(&self.actions)
    }

    /// Pool members that will sign, in whitelist order.
    pub fn signers(&self) -> Vec<&SigningIdentity> {
        let whitelist = self.whitelist();
        for identity in &self.pool {
            if !whitelist.contains(identity.account()) {
                debug!(account = %identity.account(), "pool member not referenced, skipping");
            }
        }
        whitelist
            .iter()
            .filter_map(|account| self.identity(account))
            .collect()
    }

    pub(crate) fn inject(&mut self, injection: &PayerInjection) -> bool {
        injection.apply(&mut self.actions)
    }

    /// Lets `payer` cover the transaction's resources by co-signing a
    /// `litewaxpayer::noop` action in the first slot.
    ///
    /// # Errors
    ///
    /// Returns an error only if the sponsor action cannot be built.
    pub fn pay_with_identity(mut self, payer: SigningIdentity) -> WaxResult<Self> {
        let injection = PayerInjection::co_signer(payer.authorization().clone())?;
        self.inject(&injection);
        self.add_identity(payer);
        Ok(self)
    }

    /// Lets a third-party sponsor cover the transaction's resources.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::Config`] if the sponsor has no signing service.
    pub fn pay_with(self, injection: PayerInjection) -> WaxResult<PayerProtocolAdapter> {
        PayerProtocolAdapter::new(self, injection)
    }

    /// Lets a sponsor reached through `signer` cover the transaction's
    /// resources.
    pub fn pay_with_signer(
        self,
        injection: PayerInjection,
        signer: Arc<dyn PayerSigner>,
    ) -> PayerProtocolAdapter {
        PayerProtocolAdapter::with_signer(self, injection, signer)
    }

    /// Assembles the transaction against `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`WaxError::Transaction`] if no action was added.
    pub fn pending(&self, reference: &ReferenceBlock) -> WaxResult<PendingTransaction> {
        if self.actions.is_empty() {
            return Err(WaxError::transaction("transaction has no actions"));
        }
        let header = TransactionHeader::expiring_in(reference, self.expiration_secs);
        Ok(PendingTransaction::new(header, self.actions.clone()))
    }

    /// Serializes the transaction without signing it.
    ///
    /// Reference data is fetched from the chain unless `reference` is given.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no actions or the fetch fails.
    pub async fn pack(&self, reference: Option<ReferenceBlock>) -> WaxResult<PackedTransaction> {
        let reference = match reference {
            Some(reference) => reference,
            None => self.chain.get_reference_block().await?,
        };
        let pending = self.pending(&reference)?;
        Ok(PackedTransaction::new(reference.chain_id, &pending))
    }

    /// Collects signatures for `packed` from every pool member the actions
    /// reference. Signing calls run concurrently; signatures keep whitelist
    /// order.
    ///
    /// # Errors
    ///
    /// Returns the first signing error.
    pub async fn sign(&self, packed: &PackedTransaction) -> WaxResult<Vec<String>> {
        let signers = self.signers();
        let collected = try_join_all(signers.into_iter().map(|identity| async move {
            let signatures = identity.sign(packed).await?;
            debug!(
                account = %identity.account(),
                signatures = signatures.len(),
                "collected signatures"
            );
            Ok::<_, WaxError>(signatures)
        }))
        .await?;
        Ok(collected.into_iter().flatten().collect())
    }

    /// Packs and signs.
    ///
    /// # Errors
    ///
    /// Returns packing or signing errors.
    pub async fn prepare_trx(&self, reference: Option<ReferenceBlock>) -> WaxResult<TransactionInfo> {
        let packed = self.pack(reference).await?;
        let signatures = self.sign(&packed).await?;
        Ok(TransactionInfo::new(&packed, signatures))
    }

    /// Submits `signed`, or a freshly prepared transaction.
    ///
    /// # Errors
    ///
    /// Returns preparation errors or the classified submission error.
    pub async fn push(&self, signed: Option<TransactionInfo>) -> WaxResult<TransactionResult> {
        let signed = match signed {
            Some(signed) => signed,
            None => self.prepare_trx(None).await?,
        };
        self.submit(signed).await
    }

    pub(crate) async fn submit(&self, signed: TransactionInfo) -> WaxResult<TransactionResult> {
        info!(
            actions = self.actions.len(),
            signatures = signed.signatures.len(),
            "submitting transaction"
        );
        SubmissionClient::new(self.chain.as_ref().clone())
            .post(&signed.packed, signed.signatures)
            .await
    }
}

impl fmt::Display for MultiPartyTransactionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self
            .chain
            .config()
            .endpoints()
            .endpoints()
            .first()
            .map_or_else(String::new, ToString::to_string);
        let signers = self
            .pool
            .iter()
            .map(|identity| identity.account().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "MultiPartyTransaction(node: {node}, signers: [{signers}])")?;
        for action in &self.actions {
            write!(f, "\n  {action}")?;
        }
        Ok(())
    }
}
