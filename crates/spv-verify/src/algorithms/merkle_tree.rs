//! # Merkle Tree Builder
//!
//! Full binary Merkle tree over an ordered leaf list, bottom-up.
//!
//! Odd levels pair their last node with itself. This applies to a single
//! leaf as well, so `[A]` yields `hash(A || A)`.

use crate::domain::{Hash, MerkleTreeError};
use shared_crypto::hash_pair;

/// Compute the Merkle root of `leaves`.
///
/// Leaves are taken in the given order; sorting is the caller's job.
///
/// # Time Complexity: O(n)
pub fn build_root(leaves: &[Hash]) -> Result<Hash, MerkleTreeError> {
    if leaves.is_empty() {
        return Err(MerkleTreeError::EmptyLeafSet);
    }

    let mut level = next_level(leaves);
    while level.len() > 1 {
        level = next_level(&level);
    }

    Ok(level[0])
}

fn next_level(level: &[Hash]) -> Vec<Hash> {
    level
        .chunks(2)
        .map(|pair| {
            let left = &pair[0];
            let right = pair.get(1).unwrap_or(left); // Duplicate last if odd
            hash_pair(left, right)
        })
        .collect()
}
