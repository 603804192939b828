//! Core chain types.
//!
//! Names, variable-length integers and chain identifiers: the primitives the
//! transaction encoder is built from.

mod chain_id;
mod name;
mod varint;

pub use chain_id::{CHAIN_ID_LENGTH, ChainId};
pub use name::{MAX_NAME_LENGTH, Name, NameCodec};
pub use varint::VarintCodec;
