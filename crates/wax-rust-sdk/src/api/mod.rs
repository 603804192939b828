//! Clients for the chain's HTTP API.
//!
//! - [`ChainClient`] - read-only RPC calls and raw transaction submission
//! - [`SubmissionClient`] - submission with result classification
//! - [`EndpointStrategy`] - node selection injected through the config

pub mod chain;
pub mod endpoint;
pub mod response;
pub mod submission;

pub use chain::ChainClient;
pub use endpoint::{EndpointStrategy, FixedEndpoint, RoundRobinEndpoints};
pub use response::{
    AccountsByAuthorizers, AuthorizedAccount, BlockInfo, ChainInfo, PushTransactionRequest,
    PushTransactionResponse, TransactionResult,
};
pub use submission::{SubmissionClient, classify};
