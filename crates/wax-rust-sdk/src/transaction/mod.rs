//! Transaction building, encoding, signing and sponsorship.
//!
//! # Overview
//!
//! - **Single signer** - [`TransactionBuilder`] signs with one identity
//! - **Multiple signers** - [`MultiPartyTransactionBuilder`] signs with every
//!   pool member the actions reference
//! - **Sponsored** - [`PayerProtocolAdapter`] adds a sponsor action and the
//!   sponsor's signature before submitting
//!
//! Every builder follows the same pipeline: fetch reference data, encode
//! with [`BinaryTransactionEncoder`], sign, then submit once.
//!
//! # Example: Multi-Party Transaction
//!
//! ```rust,ignore
//! use wax_rust_sdk::transaction::PayerInjection;
//!
//! let result = wax
//!     .multi_party(vec![alice.into(), bob.into()])
//!     .with_action(swap_from_alice)
//!     .with_action(swap_from_bob)
//!     .pay_with(PayerInjection::neftyblocks(wax.config().network())?)?
//!     .push(None)
//!     .await?;
//! ```

mod action;
mod builder;
mod encoder;
mod multi_party;
mod payer;
mod types;

pub use action::{ActionDescriptor, PermissionLevel};
pub use builder::TransactionBuilder;
pub use encoder::{BinaryTransactionEncoder, TransactionExtension};
pub use multi_party::MultiPartyTransactionBuilder;
pub use payer::{
    ATOMICHUB_SIGN_URL, CO_SIGNER_CONTRACT, HttpPayerSigner, NEFTYBLOCKS_MAINNET_URL,
    NEFTYBLOCKS_TESTNET_URL, PayerInjection, PayerProtocolAdapter, PayerSigner, SponsorPosition,
    parse_payer_response,
};
pub use types::{
    PackedTransaction, PendingTransaction, ReferenceBlock, TransactionHeader, TransactionInfo,
};
