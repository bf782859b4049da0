//! # SPV Service
//!
//! Application service wiring the header-chain store, the proof verifiers
//! and a cache of verified masternode lists.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::algorithms::{verify_partial_proof, MasternodeListVerifier};
use crate::config::SpvConfig;
use crate::domain::{
    BlockHeader, ChainTip, ChainUpdate, Hash, HeaderChainStore, MasternodeListDiff,
    PartialMerkleProof, SpvError, SyncResult, TxInclusion, VerifiedMasternodeList,
};
use crate::ports::{CoinbaseCommitmentDecoder, HeaderSource, SpvApi};
use shared_crypto::{sha256d, to_display_hex};

/// SPV service - orchestrates header ingestion and verification.
pub struct SpvService {
    /// Configuration.
    config: SpvConfig,
    /// Header chain, shareable with other readers.
    store: Arc<HeaderChainStore>,
    /// Verified masternode lists by block hash.
    verified_lists: Mutex<LruCache<Hash, VerifiedMasternodeList>>,
}

impl SpvService {
    /// Create a service with a fresh store rooted at the configured genesis.
    ///
    /// # Errors
    /// - `InvalidConfig` if validation fails
    /// - `Chain` if the genesis header is rejected
    pub fn new(config: SpvConfig) -> Result<Self, SpvError> {
        config.validate()?;
        let store = Arc::new(HeaderChainStore::new(config.clone())?);
        Ok(Self::with_store(store))
    }

    /// Create a service over an existing store, using its configuration.
    pub fn with_store(store: Arc<HeaderChainStore>) -> Self {
        let config = store.config().clone();
        let capacity =
            NonZeroUsize::new(config.verified_list_cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            store,
            verified_lists: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Shared handle to the header chain.
    pub fn store(&self) -> &Arc<HeaderChainStore> {
        &self.store
    }

    /// Pull headers from `source` until it has nothing new.
    ///
    /// Each round sends the current locator and ingests the reply as one
    /// atomic batch. While the source's branch is still a side branch here,
    /// the last header it sent leads the locator so the next round continues
    /// that branch. A failed round leaves earlier rounds applied.
    ///
    /// # Errors
    /// - `Source` if the source fails
    /// - `Chain` if the store rejects a batch
    pub fn sync_from(&self, source: &dyn HeaderSource) -> Result<SyncResult, SpvError> {
        let start = Instant::now();
        let batch_size = self.config.header_batch_size;
        let mut headers_synced = 0u64;
        let mut reorgs = Vec::new();
        let mut last_received: Option<Hash> = None;

        loop {
            let mut locator = self.store.locator();
            if let Some(last) = last_received {
                if locator.first() != Some(&last) {
                    locator.insert(0, last);
                }
            }
            let headers = source.get_headers(&locator, batch_size).map_err(|e| {
                warn!("[spv] Header source {} failed: {}", source.source_id(), e);
                e
            })?;
            let served = headers.len();

            // A source on a branch we hold as side chain resends known headers
            let known = headers
                .iter()
                .take_while(|header| self.store.contains(&header.hash()))
                .count();
            let fresh = &headers[known..];
            if fresh.is_empty() {
                break;
            }

            let updates = self.store.add_headers(fresh)?;
            headers_synced += fresh.len() as u64;
            last_received = fresh.last().map(BlockHeader::hash);
            reorgs.extend(updates.into_iter().filter_map(|update| match update {
                ChainUpdate::Reorganized(event) => Some(event),
                _ => None,
            }));

            info!(
                source = source.source_id(),
                batch = fresh.len(),
                height = self.store.get_height(),
                "[spv] Synced header batch"
            );

            if served < batch_size {
                break;
            }
        }

        Ok(SyncResult {
            headers_synced,
            reorgs,
            tip: self.store.chain_tip(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Decode the commitment from a raw coinbase, then verify the list.
    ///
    /// The coinbase hash is computed from `raw_coinbase`, so the proof and
    /// the decoded payload refer to the same transaction.
    ///
    /// # Errors
    /// - `Decode` (or whatever the decoder returns) if decoding fails
    /// - as [`SpvApi::verify_masternode_list`]
    pub fn verify_masternode_list_with_decoder(
        &self,
        diff: &MasternodeListDiff,
        block_hash: &Hash,
        coinbase_proof: &PartialMerkleProof,
        raw_coinbase: &[u8],
        decoder: &dyn CoinbaseCommitmentDecoder,
    ) -> Result<VerifiedMasternodeList, SpvError> {
        let coinbase_tx_hash = sha256d(raw_coinbase);
        let commitment = decoder.decode_commitment(raw_coinbase)?;
        self.verify_masternode_list(diff, block_hash, coinbase_proof, &coinbase_tx_hash, &commitment)
    }

    /// Previously verified list for `block_hash`, if still cached.
    pub fn cached_masternode_list(&self, block_hash: &Hash) -> Option<VerifiedMasternodeList> {
        self.verified_lists.lock().get(block_hash).cloned()
    }
}

impl SpvApi for SpvService {
    fn add_headers(&self, headers: &[BlockHeader]) -> Result<Vec<ChainUpdate>, SpvError> {
        Ok(self.store.add_headers(headers)?)
    }

    fn verify_transaction(
        &self,
        block_hash: &Hash,
        tx_hash: &Hash,
        proof: &PartialMerkleProof,
    ) -> Result<TxInclusion, SpvError> {
        let snapshot = self.store.snapshot();
        let header = snapshot
            .header_by_hash(block_hash)
            .ok_or(SpvError::HeaderNotFound(*block_hash))?;
        let block_height = snapshot
            .height_of(block_hash)
            .ok_or(SpvError::HeaderNotFound(*block_hash))?;

        let result = verify_partial_proof(proof, &[], self.config.max_proof_leaves)?;
        let included =
            result.recomputed_root == header.merkle_root && result.contains_hash(tx_hash);
        if !included {
            debug!(
                tx = %to_display_hex(tx_hash),
                block = %to_display_hex(block_hash),
                "[spv] Transaction not proven in block"
            );
        }

        Ok(TxInclusion {
            included,
            block_height,
            confirmations: snapshot.confirmations(block_hash),
        })
    }

    fn verify_masternode_list(
        &self,
        diff: &MasternodeListDiff,
        block_hash: &Hash,
        coinbase_proof: &PartialMerkleProof,
        coinbase_tx_hash: &Hash,
        commitment: &[u8],
    ) -> Result<VerifiedMasternodeList, SpvError> {
        let list = MasternodeListVerifier::new(&self.store).verify(
            diff,
            block_hash,
            coinbase_proof,
            coinbase_tx_hash,
            commitment,
        )?;

        info!(
            height = list.height,
            entries = list.len(),
            root = %to_display_hex(&list.merkle_root),
            "[spv] Masternode list verified"
        );
        self.verified_lists.lock().put(*block_hash, list.clone());
        Ok(list)
    }

    fn get_chain_tip(&self) -> ChainTip {
        self.store.chain_tip()
    }
}
