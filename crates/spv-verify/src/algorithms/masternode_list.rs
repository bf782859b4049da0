//! # Masternode List Verification
//!
//! Ties a masternode list to the chain: the entries' Merkle root must equal
//! the commitment carried by a coinbase that is provably included in an
//! accepted block.
//!
//! ## Checks, in order
//!
//! 1. Sort entries by `pro_reg_tx_hash` (uint256 order); duplicates reject.
//! 2. Hash entries and build the list root.
//! 3. Verify the coinbase inclusion proof against the header's Merkle root.
//! 4. Compare the supplied commitment (and the header's commitment
//!    extension, when present) with the computed root.

use super::merkle_tree::build_root;
use super::partial_merkle::verify_partial_proof;
use crate::domain::entities::entries_sorted;
use crate::domain::{
    invariant_unique_sorted_keys, Hash, HeaderChainStore, InclusionFailure, MasternodeListDiff,
    MasternodeListEntry, MasternodeListError, MatchedLeaf, PartialMerkleProof,
    VerifiedMasternodeList,
};
use shared_crypto::cmp_as_uint256;

/// Sort entries by key and compute the masternode-list root.
///
/// # Errors
/// - `DuplicateEntry` if two entries share a `pro_reg_tx_hash`
/// - `Tree(EmptyLeafSet)` if there are no entries
pub fn compute_masternode_list_root(
    entries: &[MasternodeListEntry],
) -> Result<(Vec<MasternodeListEntry>, Hash), MasternodeListError> {
    let mut sorted = entries.to_vec();
    if !entries_sorted(&sorted) {
        sorted.sort_unstable_by(|a, b| cmp_as_uint256(&a.pro_reg_tx_hash, &b.pro_reg_tx_hash));
    }
    invariant_unique_sorted_keys(sorted.iter().map(|entry| &entry.pro_reg_tx_hash))?;

    let leaves: Vec<Hash> = sorted.iter().map(MasternodeListEntry::entry_hash).collect();
    let root = build_root(&leaves)?;
    Ok((sorted, root))
}

/// Check that `coinbase_tx_hash` is the first transaction under `merkle_root`.
///
/// # Errors
/// - `Malformed` if the proof does not decode
/// - `RootMismatch` if the proof rebuilds a different root
/// - `CoinbaseNotMatched` if position 0 is not the matched coinbase
pub fn verify_coinbase_inclusion(
    proof: &PartialMerkleProof,
    coinbase_tx_hash: &Hash,
    merkle_root: &Hash,
    max_proof_leaves: u32,
) -> Result<(), InclusionFailure> {
    let target = MatchedLeaf::new(0, *coinbase_tx_hash);
    let result = verify_partial_proof(proof, &[target], max_proof_leaves)?;

    if result.recomputed_root != *merkle_root {
        return Err(InclusionFailure::RootMismatch {
            expected: *merkle_root,
            computed: result.recomputed_root,
        });
    }
    if !result.targets_matched {
        return Err(InclusionFailure::CoinbaseNotMatched(*coinbase_tx_hash));
    }
    Ok(())
}

/// Verifies masternode lists against headers held by a [`HeaderChainStore`].
pub struct MasternodeListVerifier<'a> {
    store: &'a HeaderChainStore,
    max_proof_leaves: u32,
}

impl<'a> MasternodeListVerifier<'a> {
    /// Verifier reading headers from `store`, with its configured proof bound.
    pub fn new(store: &'a HeaderChainStore) -> Self {
        Self {
            store,
            max_proof_leaves: store.config().max_proof_leaves,
        }
    }

    /// Verify `diff` as the masternode list committed in block `block_hash`.
    ///
    /// `commitment` is the root carried in the coinbase payload, decoded by
    /// the caller.
    ///
    /// # Errors
    /// - `DuplicateEntry` / `Tree` from root computation
    /// - `HeaderNotFound` if the block is not stored
    /// - `InvalidProof` if the coinbase is not proven included
    /// - `RootMismatch` if a commitment differs from the computed root
    pub fn verify(
        &self,
        diff: &MasternodeListDiff,
        block_hash: &Hash,
        coinbase_proof: &PartialMerkleProof,
        coinbase_tx_hash: &Hash,
        commitment: &[u8],
    ) -> Result<VerifiedMasternodeList, MasternodeListError> {
        let (entries, computed) = compute_masternode_list_root(&diff.entries)?;

        let snapshot = self.store.snapshot();
        let header = snapshot
            .header_by_hash(block_hash)
            .ok_or(MasternodeListError::HeaderNotFound(*block_hash))?;
        let height = snapshot
            .height_of(block_hash)
            .ok_or(MasternodeListError::HeaderNotFound(*block_hash))?;

        verify_coinbase_inclusion(
            coinbase_proof,
            coinbase_tx_hash,
            &header.merkle_root,
            self.max_proof_leaves,
        )
        .map_err(MasternodeListError::InvalidProof)?;

        if commitment != computed.as_slice() {
            return Err(MasternodeListError::RootMismatch {
                computed,
                committed: commitment.to_vec(),
            });
        }
        if let Some(extension) = header.coinbase_commitment {
            if extension != computed {
                return Err(MasternodeListError::RootMismatch {
                    computed,
                    committed: extension.to_vec(),
                });
            }
        }

        Ok(VerifiedMasternodeList {
            block_hash: *block_hash,
            height,
            merkle_root: computed,
            entries,
        })
    }
}
