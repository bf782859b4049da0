//! # Inbound Ports
//!
//! API trait defining what the SPV engine offers its callers.

use crate::domain::{
    BlockHeader, ChainTip, ChainUpdate, Hash, MasternodeListDiff, PartialMerkleProof, SpvError,
    TxInclusion, VerifiedMasternodeList,
};

/// SPV verification API - inbound port.
///
/// All calls are synchronous and complete with a result or an error; none
/// blocks on I/O.
pub trait SpvApi: Send + Sync {
    /// Ingest an ancestor-first batch of headers, all or nothing.
    fn add_headers(&self, headers: &[BlockHeader]) -> Result<Vec<ChainUpdate>, SpvError>;

    /// Check that `tx_hash` is included in block `block_hash`.
    fn verify_transaction(
        &self,
        block_hash: &Hash,
        tx_hash: &Hash,
        proof: &PartialMerkleProof,
    ) -> Result<TxInclusion, SpvError>;

    /// Verify a masternode list against the coinbase commitment of a block.
    fn verify_masternode_list(
        &self,
        diff: &MasternodeListDiff,
        block_hash: &Hash,
        coinbase_proof: &PartialMerkleProof,
        coinbase_tx_hash: &Hash,
        commitment: &[u8],
    ) -> Result<VerifiedMasternodeList, SpvError>;

    /// Get current chain tip.
    fn get_chain_tip(&self) -> ChainTip;
}
