//! # Partial Merkle Proofs
//!
//! Reconstruction (and construction) of the compact partial Merkle tree
//! carried by Merkle blocks.
//!
//! ## Traversal
//!
//! Depth-first from the root. Each visited node consumes one flag:
//! - flag `0`: consume one hash, the subtree is pruned
//! - flag `1` on an interior node: descend into both children
//! - flag `1` on a leaf: consume one hash, record it as matched
//!
//! A node with no right child reuses its left child, the same odd-node rule
//! as the full tree builder. Every supplied flag and hash must be consumed;
//! only padding inside the final flag byte is tolerated.

use crate::domain::{
    Hash, MatchedLeaf, MerkleTreeError, PartialMerkleError, PartialMerkleProof,
    ProofVerification,
};
use shared_crypto::hash_pair;

/// Number of nodes at `height` (0 = leaves) for a tree of `leaf_count` leaves.
fn tree_width(leaf_count: u32, height: u32) -> u32 {
    ((u64::from(leaf_count) + (1u64 << height) - 1) >> height) as u32
}

/// Height of the root for a tree of `leaf_count` leaves.
fn tree_height(leaf_count: u32) -> u32 {
    let mut height = 0;
    while tree_width(leaf_count, height) > 1 {
        height += 1;
    }
    height
}

/// Rebuild the root of a partial Merkle tree and collect matched leaves.
///
/// `targets` are the leaves the caller wants confirmed; the result reports
/// whether all of them were matched. The recomputed root is not compared
/// with anything here.
///
/// # Errors
/// - `EmptyProof` if the proof has no flags and no hashes
/// - `LeafCountOutOfRange` if `leaf_count` is 0 or above `max_leaves`
/// - `FlagCountMismatch` / `HashCountMismatch` if the proof is truncated or padded
/// - `DuplicateSiblings` if a right child repeats its left sibling
pub fn verify_partial_proof(
    proof: &PartialMerkleProof,
    targets: &[MatchedLeaf],
    max_leaves: u32,
) -> Result<ProofVerification, PartialMerkleError> {
    if proof.flags.is_empty() && proof.hashes.is_empty() {
        return Err(PartialMerkleError::EmptyProof);
    }
    if proof.leaf_count == 0 || proof.leaf_count > max_leaves {
        return Err(PartialMerkleError::LeafCountOutOfRange {
            leaf_count: proof.leaf_count,
            max: max_leaves,
        });
    }

    let mut extractor = Extractor {
        proof,
        bits_used: 0,
        hashes_used: 0,
        matched: Vec::new(),
    };
    let recomputed_root = extractor.traverse(tree_height(proof.leaf_count), 0)?;

    // Flags travel as bytes, so only whole unused bytes count as padding.
    if extractor.bits_used.div_ceil(8) != proof.flags.len().div_ceil(8) {
        return Err(PartialMerkleError::FlagCountMismatch {
            needed: extractor.bits_used,
            supplied: proof.flags.len(),
        });
    }
    if extractor.hashes_used != proof.hashes.len() {
        return Err(PartialMerkleError::HashCountMismatch {
            needed: extractor.hashes_used,
            supplied: proof.hashes.len(),
        });
    }

    let matched_leaves = extractor.matched;
    let targets_matched = targets.iter().all(|target| matched_leaves.contains(target));

    Ok(ProofVerification {
        recomputed_root,
        matched_leaves,
        targets_matched,
    })
}

struct Extractor<'a> {
    proof: &'a PartialMerkleProof,
    bits_used: usize,
    hashes_used: usize,
    matched: Vec<MatchedLeaf>,
}

impl Extractor<'_> {
    fn next_flag(&mut self) -> Result<bool, PartialMerkleError> {
        let flag = self.proof.flags.get(self.bits_used).copied().ok_or(
            PartialMerkleError::FlagCountMismatch {
                needed: self.bits_used + 1,
                supplied: self.proof.flags.len(),
            },
        )?;
        self.bits_used += 1;
        Ok(flag)
    }

    fn next_hash(&mut self) -> Result<Hash, PartialMerkleError> {
        let hash = self.proof.hashes.get(self.hashes_used).copied().ok_or(
            PartialMerkleError::HashCountMismatch {
                needed: self.hashes_used + 1,
                supplied: self.proof.hashes.len(),
            },
        )?;
        self.hashes_used += 1;
        Ok(hash)
    }

    fn traverse(&mut self, height: u32, position: u32) -> Result<Hash, PartialMerkleError> {
        let descend = self.next_flag()?;

        if height == 0 || !descend {
            let hash = self.next_hash()?;
            if height == 0 && descend {
                self.matched.push(MatchedLeaf::new(position, hash));
            }
            return Ok(hash);
        }

        let left = self.traverse(height - 1, position * 2)?;
        let right = if position * 2 + 1 < tree_width(self.proof.leaf_count, height - 1) {
            let right = self.traverse(height - 1, position * 2 + 1)?;
            if right == left {
                return Err(PartialMerkleError::DuplicateSiblings { height, position });
            }
            right
        } else {
            left
        };

        Ok(hash_pair(&left, &right))
    }
}

impl PartialMerkleProof {
    /// Build the compact proof for the leaves flagged in `matches`.
    ///
    /// `matches` shorter than `leaves` counts the missing positions as
    /// unmatched.
    ///
    /// # Errors
    /// - `EmptyLeafSet` if `leaves` is empty
    /// - `TooManyLeaves` if the count does not fit the proof's `u32` field
    pub fn build(leaves: &[Hash], matches: &[bool]) -> Result<Self, MerkleTreeError> {
        let leaf_count = checked_leaf_count(leaves.len())?;

        let mut builder = Builder {
            leaves,
            matches,
            leaf_count,
            flags: Vec::new(),
            hashes: Vec::new(),
        };
        builder.traverse(tree_height(leaf_count), 0);

        Ok(Self::new(leaf_count, builder.flags, builder.hashes))
    }
}

fn checked_leaf_count(len: usize) -> Result<u32, MerkleTreeError> {
    if len == 0 {
        return Err(MerkleTreeError::EmptyLeafSet);
    }
    u32::try_from(len).map_err(|_| MerkleTreeError::TooManyLeaves { count: len })
}

struct Builder<'a> {
    leaves: &'a [Hash],
    matches: &'a [bool],
    leaf_count: u32,
    flags: Vec<bool>,
    hashes: Vec<Hash>,
}

impl Builder<'_> {

    fn calc_hash(&self, height: u32, position: u32) -> Hash {
        if height == 0 {
            return self.leaves[position as usize];
        }
        let left = self.calc_hash(height - 1, position * 2);
        let right = if position * 2 + 1 < tree_width(self.leaf_count, height - 1) {
            self.calc_hash(height - 1, position * 2 + 1)
        } else {
            left
        };
        hash_pair(&left, &right)
    }

    fn traverse(&mut self, height: u32, position: u32) {
        let start = (position as usize) << height;
        let end = ((position as usize + 1) << height).min(self.leaves.len());
        let parent_of_match = (start..end).any(|i| self.matches.get(i).copied().unwrap_or(false));

        self.flags.push(parent_of_match);
        if height == 0 || !parent_of_match {
            self.hashes.push(self.calc_hash(height, position));
            return;
        }

        self.traverse(height - 1, position * 2);
        if position * 2 + 1 < tree_width(self.leaf_count, height - 1) {
            self.traverse(height - 1, position * 2 + 1);
        }
    }
}
