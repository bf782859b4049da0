//! # SPV Verify
//!
//! Simplified Payment Verification for light clients of a proof-of-work
//! chain with a masternode layer.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Verify chain state without full blocks, using:
//! - Block headers (80 bytes, 112 with the coinbase-commitment extension)
//! - Partial Merkle proofs for transaction inclusion
//! - Masternode-list roots committed in coinbase transactions
//!
//! ## Trust Model
//!
//! | Check | Ties together |
//! |-------|---------------|
//! | Header linkage | each header to its stored parent |
//! | Partial Merkle proof | a transaction to a header's Merkle root |
//! | Masternode-list root | a set of entries to a proven coinbase |
//! | Checkpoints | the chain to trusted `(height, hash)` pairs |
//!
//! Proof-of-work and full consensus rules are out of scope: an accepted
//! header is well-formed and chain-linked, nothing more.
//!
//! ## Module Structure
//!
//! ```text
//! spv-verify/
//! ├── domain/          # Headers, entries, proofs, errors, HeaderChainStore
//! ├── algorithms/      # Merkle tree, partial proofs, masternode lists, sync helpers
//! ├── ports/           # API trait (inbound) + collaborator traits (outbound)
//! ├── adapters/        # InMemoryHeaderSource
//! ├── application/     # SpvService orchestrating everything
//! └── config.rs        # SpvConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::InMemoryHeaderSource;
pub use algorithms::{
    build_root, compute_masternode_list_root, locator_heights, validate_header_batch,
    verify_coinbase_inclusion, verify_partial_proof, MasternodeListVerifier,
};
pub use application::SpvService;
pub use config::{ForkChoice, SpvConfig};
pub use domain::{
    BlockHeader, ChainSnapshot, ChainTip, ChainUpdate, Checkpoint, Hash, HeaderChainError,
    HeaderChainStore, HeaderStatus, InclusionFailure, MasternodeListDiff, MasternodeListEntry,
    MasternodeListError, MatchedLeaf, MerkleTreeError, PartialMerkleError, PartialMerkleProof,
    ProofVerification, ReorgEvent, SpvError, SyncResult, TxInclusion, VerifiedMasternodeList,
    DEFAULT_RETENTION_DEPTH, MAX_PROOF_LEAVES,
};
pub use ports::{CoinbaseCommitmentDecoder, HeaderSource, SpvApi};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
