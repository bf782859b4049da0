//! # Algorithms Module
//!
//! Merkle tree building, partial proof reconstruction, masternode-list
//! verification and header-batch helpers.

pub mod header_sync;
pub mod masternode_list;
pub mod merkle_tree;
pub mod partial_merkle;

pub use header_sync::{locator_heights, validate_header_batch};
pub use masternode_list::{
    compute_masternode_list_root, verify_coinbase_inclusion, MasternodeListVerifier,
};
pub use merkle_tree::build_root;
pub use partial_merkle::verify_partial_proof;
