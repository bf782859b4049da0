//! # Domain Errors
//!
//! One error enum per component. Every error is terminal for the call that
//! raised it; nothing here is retried internally.

use shared_crypto::to_display_hex;
use thiserror::Error;

pub use shared_crypto::Hash;

/// Header-chain store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderChainError {
    /// Header failed structural decoding or field validation.
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// Previous-block hash does not reference a stored header.
    #[error("Unknown parent {} for header {}", to_display_hex(.parent), to_display_hex(.hash))]
    UnknownParent {
        /// Hash of the rejected header
        hash: Hash,
        /// The missing parent
        parent: Hash,
    },

    /// Header hash already present in the store.
    #[error("Duplicate header {}", to_display_hex(.0))]
    DuplicateHeader(Hash),

    /// Header at a checkpointed height does not match the checkpoint.
    #[error("Checkpoint mismatch at height {height}: expected {}, got {}", to_display_hex(.expected), to_display_hex(.got))]
    CheckpointMismatch {
        /// Checkpointed height
        height: u64,
        /// Hash required by the checkpoint
        expected: Hash,
        /// Hash of the offered header
        got: Hash,
    },

    /// Batch header does not build on the header before it.
    #[error("Batch is not contiguous at index {index}")]
    NonContiguousBatch {
        /// Index of the first header that breaks the sequence
        index: usize,
    },

    /// A stored header has no path back to the active chain.
    #[error("Broken ancestry: header {} is missing from the store", to_display_hex(.0))]
    BrokenAncestry(Hash),

    /// Store configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Merkle tree builder errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MerkleTreeError {
    /// No leaves were supplied.
    #[error("Cannot build a Merkle root from an empty leaf set")]
    EmptyLeafSet,

    /// More leaves than a `u32` leaf count can describe.
    #[error("Too many leaves for a partial Merkle proof: {count}")]
    TooManyLeaves {
        /// Number of leaves supplied
        count: usize,
    },
}

/// Partial Merkle proof errors.
///
/// For truncated proofs `needed` is a lower bound: traversal stopped at the
/// first missing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PartialMerkleError {
    /// Proof carries neither flags nor hashes.
    #[error("Empty partial Merkle proof")]
    EmptyProof,

    /// Leaf count is zero or above the configured bound.
    #[error("Leaf count {leaf_count} out of range (1..={max})")]
    LeafCountOutOfRange {
        /// Leaf count in the proof
        leaf_count: u32,
        /// Upper bound
        max: u32,
    },

    /// Traversal consumed a different number of flag bits than supplied.
    #[error("Flag count mismatch: traversal needs {needed}, proof supplies {supplied}")]
    FlagCountMismatch {
        /// Bits the traversal consumed (or at least needed)
        needed: usize,
        /// Bits in the proof
        supplied: usize,
    },

    /// Traversal consumed a different number of hashes than supplied.
    #[error("Hash count mismatch: traversal needs {needed}, proof supplies {supplied}")]
    HashCountMismatch {
        /// Hashes the traversal consumed (or at least needed)
        needed: usize,
        /// Hashes in the proof
        supplied: usize,
    },

    /// A right child equals its left sibling; such trees are ambiguous.
    #[error("Identical sibling hashes at height {height}, position {position}")]
    DuplicateSiblings {
        /// Tree height of the parent node
        height: u32,
        /// Position of the parent node within its level
        position: u32,
    },
}

/// Why a coinbase inclusion proof was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InclusionFailure {
    /// The proof itself is malformed.
    #[error(transparent)]
    Malformed(#[from] PartialMerkleError),

    /// Recomputed root differs from the header's transaction Merkle root.
    #[error("Recomputed root {} does not match header root {}", to_display_hex(.computed), to_display_hex(.expected))]
    RootMismatch {
        /// Header's transaction Merkle root
        expected: Hash,
        /// Root rebuilt from the proof
        computed: Hash,
    },

    /// The coinbase transaction is not the matched first leaf.
    #[error("Coinbase {} not matched at position 0", to_display_hex(.0))]
    CoinbaseNotMatched(Hash),
}

/// Masternode-list diff verification errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MasternodeListError {
    /// Two entries share a proRegTxHash.
    #[error("Duplicate masternode entry {}", to_display_hex(.0))]
    DuplicateEntry(Hash),

    /// The referenced header has not been accepted into the store.
    #[error("Header not found: {}", to_display_hex(.0))]
    HeaderNotFound(Hash),

    /// Coinbase inclusion proof does not tie the coinbase to the header.
    #[error("Invalid coinbase inclusion proof: {0}")]
    InvalidProof(InclusionFailure),

    /// Root computed from entries differs from the committed root.
    #[error("Masternode list root mismatch: computed {}, committed {}", to_display_hex(.computed), hex::encode(.committed))]
    RootMismatch {
        /// Root computed from the sorted entries
        computed: Hash,
        /// Commitment bytes as supplied
        committed: Vec<u8>,
    },

    /// The diff holds no entries.
    #[error(transparent)]
    Tree(#[from] MerkleTreeError),
}

/// Service-level error.
#[derive(Debug, Error)]
pub enum SpvError {
    /// Header-chain store rejection.
    #[error(transparent)]
    Chain(#[from] HeaderChainError),

    /// Malformed partial Merkle proof.
    #[error(transparent)]
    Proof(#[from] PartialMerkleError),

    /// Masternode-list verification failure.
    #[error(transparent)]
    MasternodeList(#[from] MasternodeListError),

    /// Block hash not present in the store.
    #[error("Header not found: {}", to_display_hex(.0))]
    HeaderNotFound(Hash),

    /// Header source failed to deliver.
    #[error("Header source {source_id} failed: {reason}")]
    Source {
        /// Source identifier
        source_id: String,
        /// Failure description
        reason: String,
    },

    /// Coinbase decoder could not extract the commitment.
    #[error("Coinbase decode failed: {0}")]
    Decode(String),

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
