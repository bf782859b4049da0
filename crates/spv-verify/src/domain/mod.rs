//! # Domain Module
//!
//! Headers, masternode-list records, proof value types, errors and the
//! header-chain store.

pub mod entities;
pub mod errors;
pub mod header_chain;
pub mod invariants;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use header_chain::{ChainSnapshot, HeaderChainStore};
pub use invariants::*;
pub use value_objects::*;
