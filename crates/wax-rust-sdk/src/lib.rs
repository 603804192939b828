//! # WAX Rust SDK
//!
//! Build, sign, sponsor and submit transactions on the WAX blockchain.
//!
//! Transactions are encoded in the chain's canonical binary layout and
//! signed by any mix of locally held keys and hosted wallet sessions. The
//! CPU and NET cost can be delegated to a sponsor that co-signs without ever
//! handing over its key.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wax_rust_sdk::{Wax, WaxConfig};
//! use wax_rust_sdk::identity::LocalIdentity;
//! use wax_rust_sdk::transaction::PayerInjection;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let wax = Wax::new(WaxConfig::mainnet())?;
//!     let alice = LocalIdentity::from_key_str(&std::env::var("WAX_KEY")?, "alice")?;
//!
//!     let token = wax.contract("eosio.token", &alice.clone().into())?;
//!     let transfer = token.call_json(wax.chain(), "transfer", &args).await?;
//!
//!     let result = wax
//!         .transaction(alice)
//!         .with_action(transfer)
//!         .pay_with(PayerInjection::atomichub(wax.config().network())?)?
//!         .push(None)
//!         .await?;
//!     println!("transaction id: {}", result.transaction_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Names, varints and chain ids
//! - [`crypto`] - secp256k1 keys, signatures and digests
//! - [`identity`] - Local and remote signing identities
//! - [`transaction`] - Encoding, builders and sponsorship
//! - [`api`] - Chain RPC client and submission classification
//! - [`contract`] - Uniform contract calls
//!
//! ## Errors
//!
//! Every operation returns [`WaxResult`]. Submission failures are
//! classified so callers can tell whether to rebuild
//! ([`WaxError::needs_rebuild`]), log in again
//! ([`WaxError::requires_reauthentication`]) or simply retry
//! ([`WaxError::is_retryable`]).

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod api;
pub mod config;
pub mod contract;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod retry;
pub mod transaction;
pub mod types;

mod wax;

// Re-export main entry points
pub use config::{Network, WaxConfig};
pub use error::{ChainErrorDetails, WaxError, WaxResult};
pub use wax::Wax;

// Re-export commonly used types
pub use identity::SigningIdentity;
pub use types::{ChainId, Name};
