//! # Domain Value Objects
//!
//! Immutable value types passed into and out of the engine.

use super::errors::Hash;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Trusted checkpoint: the header at `height` must hash to `hash`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Checkpoint {
    /// Block height of this checkpoint.
    pub height: u64,
    /// Block hash at this height.
    pub hash: Hash,
}

impl Checkpoint {
    /// Create a new checkpoint.
    pub fn new(height: u64, hash: Hash) -> Self {
        Self { height, hash }
    }
}

/// Current chain tip information.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainTip {
    /// Current tip block hash.
    pub hash: Hash,
    /// Current tip block height.
    pub height: u64,
    /// Cumulative work from genesis to the tip.
    pub chain_work: U256,
}

/// Where a stored header sits relative to the active chain.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum HeaderStatus {
    /// On the canonical chain.
    Active,
    /// Stored but on a competing branch.
    Sidechain,
}

/// Switch of the active chain to a competing branch.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReorgEvent {
    /// Last header shared by both branches.
    pub common_ancestor: Hash,
    /// Height of the common ancestor.
    pub common_height: u64,
    /// Headers that left the active chain, lowest first.
    pub disconnected: Vec<Hash>,
    /// Headers that joined the active chain, lowest first.
    pub connected: Vec<Hash>,
}

/// Effect of accepting one header.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChainUpdate {
    /// Header extended the active chain.
    Extended {
        /// New tip height
        height: u64,
    },
    /// Header was stored on a side branch.
    SideBranch {
        /// Height of the new header
        height: u64,
    },
    /// Header made its branch the active chain.
    Reorganized(ReorgEvent),
}

impl ChainUpdate {
    /// Whether the active chain changed.
    pub fn tip_changed(&self) -> bool {
        !matches!(self, ChainUpdate::SideBranch { .. })
    }
}

/// Compact partial Merkle tree, as carried by a Merkle block.
///
/// Flags and hashes are consumed depth-first from the root. A `false` flag
/// means the node's hash is supplied; a `true` flag means descend (or, at a
/// leaf, that the supplied hash is a matched leaf).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartialMerkleProof {
    /// Leaves in the full tree.
    pub leaf_count: u32,
    /// Traversal flags.
    pub flags: Vec<bool>,
    /// Supplied hashes in traversal order.
    pub hashes: Vec<Hash>,
}

impl PartialMerkleProof {
    /// Create from decoded parts.
    pub fn new(leaf_count: u32, flags: Vec<bool>, hashes: Vec<Hash>) -> Self {
        Self {
            leaf_count,
            flags,
            hashes,
        }
    }

    /// Decode flags from wire bytes (least significant bit first).
    ///
    /// Padding bits in the final byte are kept; verification tolerates
    /// them as long as they stay within that byte.
    pub fn from_flag_bytes(leaf_count: u32, flag_bytes: &[u8], hashes: Vec<Hash>) -> Self {
        let flags = flag_bytes
            .iter()
            .flat_map(|byte| (0..8).map(move |bit| byte & (1 << bit) != 0))
            .collect();
        Self::new(leaf_count, flags, hashes)
    }

    /// Encode flags to wire bytes (least significant bit first).
    pub fn flag_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.flags.len().div_ceil(8)];
        for (index, flag) in self.flags.iter().enumerate() {
            if *flag {
                out[index / 8] |= 1 << (index % 8);
            }
        }
        out
    }
}

/// A leaf the proof marked as matched.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MatchedLeaf {
    /// Leaf index in the full tree.
    pub position: u32,
    /// Leaf hash.
    pub hash: Hash,
}

impl MatchedLeaf {
    /// Create a matched leaf.
    pub fn new(position: u32, hash: Hash) -> Self {
        Self { position, hash }
    }
}

/// Outcome of reconstructing a partial Merkle tree.
///
/// The root is not judged here; callers compare it with a root they trust.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProofVerification {
    /// Root rebuilt from the proof.
    pub recomputed_root: Hash,
    /// Leaves marked as matched, in position order.
    pub matched_leaves: Vec<MatchedLeaf>,
    /// Whether every requested target appeared among the matches.
    pub targets_matched: bool,
}

impl ProofVerification {
    /// Whether `(position, hash)` was matched.
    pub fn contains(&self, position: u32, hash: &Hash) -> bool {
        self.matched_leaves
            .iter()
            .any(|leaf| leaf.position == position && leaf.hash == *hash)
    }

    /// Whether `hash` was matched at any position.
    pub fn contains_hash(&self, hash: &Hash) -> bool {
        self.matched_leaves.iter().any(|leaf| leaf.hash == *hash)
    }
}

/// Answer to a transaction inclusion query.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxInclusion {
    /// The proof ties the transaction to the header's Merkle root.
    pub included: bool,
    /// Height of the containing block.
    pub block_height: u64,
    /// Confirmations if the block is on the active chain.
    pub confirmations: Option<u64>,
}

/// Result of a sync operation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncResult {
    /// Number of headers accepted.
    pub headers_synced: u64,
    /// Reorganizations observed.
    pub reorgs: Vec<ReorgEvent>,
    /// Chain tip after sync.
    pub tip: ChainTip,
    /// Time taken in milliseconds.
    pub duration_ms: u64,
}
