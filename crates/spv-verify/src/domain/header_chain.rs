//! # Header Chain Store
//!
//! Block headers keyed by hash, arranged as a tree rooted at the configured
//! genesis. One path through the tree is the active chain; the rest are side
//! branches kept until their fork point falls more than
//! `retention_depth` below the tip. Pruning runs once per write and spares
//! the branch that write extended.
//!
//! ## Concurrency
//!
//! State lives in `RwLock<Arc<ChainState>>`. Writers validate first, then
//! mutate through `Arc::make_mut` under the write lock, so a rejected header
//! never touches the state and readers never see half a reorganization.
//! [`ChainSnapshot`] holds an `Arc` of one version; a write while snapshots
//! are alive clones the state once.

use super::entities::BlockHeader;
use super::errors::{Hash, HeaderChainError};
use super::value_objects::{ChainTip, ChainUpdate, HeaderStatus, ReorgEvent};
use crate::algorithms::header_sync::{locator_heights, validate_header_batch};
use crate::config::{ForkChoice, SpvConfig};
use parking_lot::RwLock;
use primitive_types::U256;
use shared_crypto::{to_display_hex, NULL_HASH};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, trace};

#[derive(Clone, Debug)]
struct HeaderNode {
    header: BlockHeader,
    /// Distance from genesis. Fixed per header, whichever branch is active.
    height: u64,
    chain_work: U256,
}

/// A header that passed every check and only awaits insertion.
#[derive(Clone, Copy, Debug)]
struct Admission {
    hash: Hash,
    height: u64,
    chain_work: U256,
}

#[derive(Clone, Debug)]
struct ChainState {
    nodes: HashMap<Hash, HeaderNode>,
    /// Active chain, indexed by height.
    active: Vec<Hash>,
    sidechain: HashSet<Hash>,
}

impl ChainState {
    fn new(genesis: BlockHeader, genesis_hash: Hash, genesis_work: U256) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            genesis_hash,
            HeaderNode {
                header: genesis,
                height: 0,
                chain_work: genesis_work,
            },
        );
        Self {
            nodes,
            active: vec![genesis_hash],
            sidechain: HashSet::new(),
        }
    }

    fn tip_hash(&self) -> Hash {
        // active always starts with genesis
        self.active[self.active.len() - 1]
    }

    fn tip_node(&self) -> &HeaderNode {
        &self.nodes[&self.tip_hash()]
    }

    fn height(&self) -> u64 {
        (self.active.len() - 1) as u64
    }

    fn chain_tip(&self) -> ChainTip {
        let tip = self.tip_node();
        ChainTip {
            hash: self.tip_hash(),
            height: tip.height,
            chain_work: tip.chain_work,
        }
    }

    fn header_by_hash(&self, hash: &Hash) -> Option<&BlockHeader> {
        self.nodes.get(hash).map(|node| &node.header)
    }

    fn header_by_height(&self, height: u64) -> Option<&BlockHeader> {
        let hash = self.active.get(usize::try_from(height).ok()?)?;
        self.header_by_hash(hash)
    }

    fn height_of(&self, hash: &Hash) -> Option<u64> {
        self.nodes.get(hash).map(|node| node.height)
    }

    fn is_active(&self, hash: &Hash) -> bool {
        self.nodes.get(hash).is_some_and(|node| {
            usize::try_from(node.height)
                .ok()
                .and_then(|index| self.active.get(index))
                == Some(hash)
        })
    }

    fn status(&self, hash: &Hash) -> Option<HeaderStatus> {
        if self.is_active(hash) {
            Some(HeaderStatus::Active)
        } else if self.sidechain.contains(hash) {
            Some(HeaderStatus::Sidechain)
        } else {
            None
        }
    }

    fn confirmations(&self, hash: &Hash) -> Option<u64> {
        if !self.is_active(hash) {
            return None;
        }
        let height = self.height_of(hash)?;
        Some(self.height() - height + 1)
    }

    fn locator(&self) -> Vec<Hash> {
        locator_heights(self.height())
            .into_iter()
            .filter_map(|height| self.active.get(height as usize).copied())
            .collect()
    }

    /// Checks for a header whose parent must already be stored.
    fn admit(
        &self,
        config: &SpvConfig,
        header: &BlockHeader,
        hash: Hash,
        work: U256,
    ) -> Result<Admission, HeaderChainError> {
        if self.nodes.contains_key(&hash) {
            return Err(HeaderChainError::DuplicateHeader(hash));
        }
        // genesis is stored at construction, so anything else claiming to
        // start a chain is inconsistent
        if header.prev_hash == NULL_HASH {
            return Err(HeaderChainError::MalformedHeader(
                "null previous hash on non-genesis header".to_string(),
            ));
        }
        let parent = self
            .nodes
            .get(&header.prev_hash)
            .ok_or(HeaderChainError::UnknownParent {
                hash,
                parent: header.prev_hash,
            })?;
        // the parent's branch must reach the active chain before anything is written
        self.branch_of(&header.prev_hash)?;
        admit_child(config, hash, parent.height, parent.chain_work, work)
    }

    fn insert(
        &mut self,
        fork_choice: ForkChoice,
        header: BlockHeader,
        admission: Admission,
    ) -> Result<ChainUpdate, HeaderChainError> {
        let Admission {
            hash,
            height,
            chain_work,
        } = admission;
        let extends_tip = header.prev_hash == self.tip_hash();

        self.nodes.insert(
            hash,
            HeaderNode {
                header,
                height,
                chain_work,
            },
        );

        if extends_tip {
            self.active.push(hash);
            return Ok(ChainUpdate::Extended { height });
        }

        self.sidechain.insert(hash);
        if self.outranks_tip(fork_choice, height, chain_work) {
            Ok(ChainUpdate::Reorganized(self.reorganize(hash)?))
        } else {
            Ok(ChainUpdate::SideBranch { height })
        }
    }

    fn outranks_tip(&self, fork_choice: ForkChoice, height: u64, chain_work: U256) -> bool {
        let tip = self.tip_node();
        match fork_choice {
            ForkChoice::LongestChain => height > tip.height,
            ForkChoice::MostWork => chain_work > tip.chain_work,
        }
    }

    /// Side-branch hashes from `hash` down to the active chain, highest
    /// first, and the active header they fork from.
    fn branch_of(&self, hash: &Hash) -> Result<(Vec<Hash>, Hash), HeaderChainError> {
        let mut branch = Vec::new();
        let mut cursor = *hash;
        while !self.is_active(&cursor) {
            let node = self
                .nodes
                .get(&cursor)
                .ok_or(HeaderChainError::BrokenAncestry(cursor))?;
            branch.push(cursor);
            cursor = node.header.prev_hash;
        }
        Ok((branch, cursor))
    }

    /// Make the branch ending at `new_tip` the active chain.
    fn reorganize(&mut self, new_tip: Hash) -> Result<ReorgEvent, HeaderChainError> {
        let (mut connected, common_ancestor) = self.branch_of(&new_tip)?;
        connected.reverse();
        let common_height = self
            .height_of(&common_ancestor)
            .ok_or(HeaderChainError::BrokenAncestry(common_ancestor))?;

        let disconnected = self.active.split_off(common_height as usize + 1);
        for hash in &disconnected {
            self.sidechain.insert(*hash);
        }
        for hash in &connected {
            self.sidechain.remove(hash);
        }
        self.active.extend_from_slice(&connected);

        Ok(ReorgEvent {
            common_ancestor,
            common_height,
            disconnected,
            connected,
        })
    }

    /// Height where the branch holding `hash` leaves the active chain.
    fn fork_height(&self, hash: &Hash) -> Result<u64, HeaderChainError> {
        let (_, fork_point) = self.branch_of(hash)?;
        self.height_of(&fork_point)
            .ok_or(HeaderChainError::BrokenAncestry(fork_point))
    }

    /// Drop side branches forked more than `retention_depth` below the tip.
    ///
    /// The branch holding `latest` survives regardless, so a branch that is
    /// still being extended keeps its ancestors until it wins or goes quiet.
    fn prune(&mut self, retention_depth: u64, latest: &Hash) -> Result<usize, HeaderChainError> {
        let tip_height = self.height();
        if self.sidechain.is_empty() || tip_height <= retention_depth {
            return Ok(0);
        }
        let horizon = tip_height - retention_depth;
        let (live, _) = self.branch_of(latest)?;
        let live: HashSet<Hash> = live.into_iter().collect();

        let mut stale = Vec::new();
        for hash in &self.sidechain {
            if !live.contains(hash) && self.fork_height(hash)? < horizon {
                stale.push(*hash);
            }
        }
        for hash in &stale {
            self.sidechain.remove(hash);
            self.nodes.remove(hash);
        }
        Ok(stale.len())
    }
}

fn admit_child(
    config: &SpvConfig,
    hash: Hash,
    parent_height: u64,
    parent_work: U256,
    work: U256,
) -> Result<Admission, HeaderChainError> {
    let height = parent_height + 1;
    config.check_checkpoint(height, &hash)?;
    Ok(Admission {
        hash,
        height,
        chain_work: parent_work.saturating_add(work),
    })
}

/// Ordered store of accepted block headers.
///
/// Accepting a header means "well-formed and chain-linked", nothing more;
/// proof-of-work and consensus rules are checked elsewhere.
pub struct HeaderChainStore {
    config: SpvConfig,
    state: RwLock<Arc<ChainState>>,
}

impl HeaderChainStore {
    /// Create a store holding only the configured genesis header.
    ///
    /// # Errors
    /// - `InvalidConfig` if the configuration fails validation
    /// - `CheckpointMismatch` if a height-0 checkpoint disagrees with genesis
    pub fn new(config: SpvConfig) -> Result<Self, HeaderChainError> {
        config.check_values().map_err(HeaderChainError::InvalidConfig)?;
        let genesis = config.genesis.clone();
        let genesis_hash = genesis.hash();
        let genesis_work = genesis.work()?;
        config.check_checkpoint(0, &genesis_hash)?;

        Ok(Self {
            state: RwLock::new(Arc::new(ChainState::new(genesis, genesis_hash, genesis_work))),
            config,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &SpvConfig {
        &self.config
    }

    /// Accept one header.
    ///
    /// # Errors
    /// - `MalformedHeader` if field validation fails
    /// - `DuplicateHeader` if the hash is already stored
    /// - `UnknownParent` if the previous hash is not stored
    /// - `CheckpointMismatch` if a checkpoint pins a different hash at its height
    pub fn add_header(&self, header: BlockHeader) -> Result<ChainUpdate, HeaderChainError> {
        let hash = header.hash();
        let work = header.work()?;

        let mut guard = self.state.write();
        let admission = guard.admit(&self.config, &header, hash, work)?;

        let state = Arc::make_mut(&mut guard);
        let update = state.insert(self.config.fork_choice, header, admission)?;
        log_update(&hash, &update);
        log_pruned(state.prune(self.config.retention_depth, &hash)?);
        Ok(update)
    }

    /// Accept an ancestor-first batch, all or nothing.
    ///
    /// # Errors
    /// As [`add_header`](Self::add_header), plus `NonContiguousBatch` if a
    /// header does not build on its predecessor in the batch. On error no
    /// header of the batch is stored.
    pub fn add_headers(&self, headers: &[BlockHeader]) -> Result<Vec<ChainUpdate>, HeaderChainError> {
        let Some(first) = headers.first() else {
            return Ok(Vec::new());
        };
        let hashes = validate_header_batch(headers)?;
        let works = headers
            .iter()
            .map(BlockHeader::work)
            .collect::<Result<Vec<_>, _>>()?;

        let mut guard = self.state.write();

        let mut admissions = Vec::with_capacity(headers.len());
        let mut previous = guard.admit(&self.config, first, hashes[0], works[0])?;
        admissions.push(previous);
        for (hash, work) in hashes.iter().zip(&works).skip(1) {
            if guard.nodes.contains_key(hash) {
                return Err(HeaderChainError::DuplicateHeader(*hash));
            }
            previous = admit_child(&self.config, *hash, previous.height, previous.chain_work, *work)?;
            admissions.push(previous);
        }

        let state = Arc::make_mut(&mut guard);
        let mut updates = Vec::with_capacity(headers.len());
        for (header, admission) in headers.iter().zip(admissions) {
            let update = state.insert(self.config.fork_choice, header.clone(), admission)?;
            log_update(&admission.hash, &update);
            updates.push(update);
        }
        // once per batch, so no batch header is dropped before its branch is judged
        log_pruned(state.prune(self.config.retention_depth, &previous.hash)?);
        Ok(updates)
    }

    /// Header at the end of the active chain.
    pub fn get_tip(&self) -> BlockHeader {
        self.state.read().tip_node().header.clone()
    }

    /// Tip hash, height and cumulative work.
    pub fn chain_tip(&self) -> ChainTip {
        self.state.read().chain_tip()
    }

    /// Get header by hash (active or side branch).
    pub fn get_header_by_hash(&self, hash: &Hash) -> Option<BlockHeader> {
        self.state.read().header_by_hash(hash).cloned()
    }

    /// Get header by height on the active chain.
    pub fn get_header_by_height(&self, height: u64) -> Option<BlockHeader> {
        self.state.read().header_by_height(height).cloned()
    }

    /// Active chain length minus one.
    pub fn get_height(&self) -> u64 {
        self.state.read().height()
    }

    /// Active or side-branch status; `None` for unknown or pruned hashes.
    pub fn status(&self, hash: &Hash) -> Option<HeaderStatus> {
        self.state.read().status(hash)
    }

    /// Confirmations of an active header (the tip has one).
    pub fn confirmations(&self, hash: &Hash) -> Option<u64> {
        self.state.read().confirmations(hash)
    }

    /// Block locator for header sync, tip first, ending at genesis.
    pub fn locator(&self) -> Vec<Hash> {
        self.state.read().locator()
    }

    /// Whether a hash is stored.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.state.read().nodes.contains_key(hash)
    }

    /// Number of stored headers, side branches included.
    pub fn header_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    /// Consistent read-only view of the current version.
    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot {
            state: Arc::clone(&self.state.read()),
        }
    }
}

fn log_update(hash: &Hash, update: &ChainUpdate) {
    match update {
        ChainUpdate::Extended { height } => {
            trace!(height, hash = %to_display_hex(hash), "[spv] Header extended active chain");
        }
        ChainUpdate::SideBranch { height } => {
            debug!(height, hash = %to_display_hex(hash), "[spv] Header stored on side branch");
        }
        ChainUpdate::Reorganized(event) => {
            info!(
                common_height = event.common_height,
                disconnected = event.disconnected.len(),
                connected = event.connected.len(),
                new_tip = %to_display_hex(hash),
                "[spv] Chain reorganized"
            );
        }
    }
}

fn log_pruned(pruned: usize) {
    if pruned > 0 {
        debug!(pruned, "[spv] Pruned stale side-branch headers");
    }
}

/// Immutable view of one version of the header chain.
#[derive(Clone, Debug)]
pub struct ChainSnapshot {
    state: Arc<ChainState>,
}

impl ChainSnapshot {
    /// Header at the end of the active chain.
    pub fn tip(&self) -> &BlockHeader {
        &self.state.tip_node().header
    }

    /// Tip hash, height and cumulative work.
    pub fn chain_tip(&self) -> ChainTip {
        self.state.chain_tip()
    }

    /// Active chain length minus one.
    pub fn height(&self) -> u64 {
        self.state.height()
    }

    /// Get header by hash.
    pub fn header_by_hash(&self, hash: &Hash) -> Option<&BlockHeader> {
        self.state.header_by_hash(hash)
    }

    /// Get header by active-chain height.
    pub fn header_by_height(&self, height: u64) -> Option<&BlockHeader> {
        self.state.header_by_height(height)
    }

    /// Height of any stored header.
    pub fn height_of(&self, hash: &Hash) -> Option<u64> {
        self.state.height_of(hash)
    }

    /// Active or side-branch status.
    pub fn status(&self, hash: &Hash) -> Option<HeaderStatus> {
        self.state.status(hash)
    }

    /// Confirmations of an active header.
    pub fn confirmations(&self, hash: &Hash) -> Option<u64> {
        self.state.confirmations(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Checkpoint;

    const REGTEST_BITS: u32 = 0x207f_ffff;

    fn genesis() -> BlockHeader {
        BlockHeader::new(1, NULL_HASH, [1u8; 32], 1_000, REGTEST_BITS, 0)
    }

    fn child(parent: &BlockHeader, nonce: u32) -> BlockHeader {
        BlockHeader::new(1, parent.hash(), [2u8; 32], parent.time + 600, REGTEST_BITS, nonce)
    }

    fn store() -> HeaderChainStore {
        HeaderChainStore::new(SpvConfig::for_testing(genesis())).unwrap()
    }

    fn extend(store: &HeaderChainStore, from: &BlockHeader, count: usize, nonce: u32) -> Vec<BlockHeader> {
        let mut headers = Vec::new();
        let mut parent = from.clone();
        for _ in 0..count {
            let header = child(&parent, nonce);
            store.add_header(header.clone()).unwrap();
            parent = header.clone();
            headers.push(header);
        }
        headers
    }

    #[test]
    fn test_new_store_holds_genesis() {
        let store = store();
        assert_eq!(store.get_height(), 0);
        assert_eq!(store.get_tip(), genesis());
        assert_eq!(store.header_count(), 1);
        assert_eq!(store.status(&genesis().hash()), Some(HeaderStatus::Active));
    }

    #[test]
    fn test_extend_active_chain() {
        let store = store();
        let header = child(&genesis(), 0);
        let update = store.add_header(header.clone()).unwrap();
        assert_eq!(update, ChainUpdate::Extended { height: 1 });
        assert_eq!(store.get_tip(), header);
        assert_eq!(store.get_header_by_height(1), Some(header));
    }

    #[test]
    fn test_duplicate_rejected() {
        let store = store();
        let header = child(&genesis(), 0);
        store.add_header(header.clone()).unwrap();
        assert_eq!(
            store.add_header(header.clone()),
            Err(HeaderChainError::DuplicateHeader(header.hash()))
        );
        assert_eq!(
            store.add_header(genesis()),
            Err(HeaderChainError::DuplicateHeader(genesis().hash()))
        );
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let store = store();
        let orphan = BlockHeader::new(1, [9u8; 32], [2u8; 32], 2_000, REGTEST_BITS, 0);
        assert!(matches!(
            store.add_header(orphan),
            Err(HeaderChainError::UnknownParent { parent, .. }) if parent == [9u8; 32]
        ));
        assert_eq!(store.header_count(), 1);
    }

    #[test]
    fn test_malformed_checked_before_linkage() {
        let store = store();
        let mut bad = BlockHeader::new(1, [9u8; 32], [2u8; 32], 2_000, REGTEST_BITS, 0);
        bad.bits = 0;
        assert!(matches!(
            store.add_header(bad),
            Err(HeaderChainError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_second_genesis_is_malformed() {
        let store = store();
        let other = BlockHeader::new(1, NULL_HASH, [3u8; 32], 5, REGTEST_BITS, 1);
        assert!(matches!(
            store.add_header(other),
            Err(HeaderChainError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_side_branch_then_reorg() {
        let store = store();
        let main = extend(&store, &genesis(), 2, 0);

        let a2 = child(&genesis(), 7);
        assert_eq!(
            store.add_header(a2.clone()).unwrap(),
            ChainUpdate::SideBranch { height: 1 }
        );
        assert_eq!(store.status(&a2.hash()), Some(HeaderStatus::Sidechain));

        let b2 = child(&a2, 7);
        assert!(!store.add_header(b2.clone()).unwrap().tip_changed());

        let c2 = child(&b2, 7);
        let update = store.add_header(c2.clone()).unwrap();
        let ChainUpdate::Reorganized(event) = update else {
            panic!("expected reorg, got {update:?}");
        };
        assert_eq!(event.common_ancestor, genesis().hash());
        assert_eq!(event.common_height, 0);
        assert_eq!(event.disconnected, vec![main[0].hash(), main[1].hash()]);
        assert_eq!(event.connected, vec![a2.hash(), b2.hash(), c2.hash()]);
        assert_eq!(store.status(&main[1].hash()), Some(HeaderStatus::Sidechain));
        assert_eq!(store.status(&b2.hash()), Some(HeaderStatus::Active));
    }

    #[test]
    fn test_equal_height_keeps_first_seen() {
        let store = store();
        let first = extend(&store, &genesis(), 1, 0);
        let rival = child(&genesis(), 3);
        store.add_header(rival).unwrap();
        assert_eq!(store.get_tip(), first[0]);
    }

    #[test]
    fn test_most_work_prefers_harder_branch() {
        let config = SpvConfig::for_testing(genesis()).with_fork_choice(ForkChoice::MostWork);
        let store = HeaderChainStore::new(config).unwrap();
        extend(&store, &genesis(), 3, 0);

        let mut hard = child(&genesis(), 9);
        hard.bits = 0x1d00_ffff;
        let update = store.add_header(hard.clone()).unwrap();
        assert!(matches!(update, ChainUpdate::Reorganized(_)));
        assert_eq!(store.get_tip(), hard);
        assert_eq!(store.get_height(), 1);
    }

    #[test]
    fn test_prune_stale_side_branch() {
        let config = SpvConfig::for_testing(genesis()).with_retention_depth(3);
        let store = HeaderChainStore::new(config).unwrap();
        let main = extend(&store, &genesis(), 2, 0);

        let side = child(&main[0], 5);
        store.add_header(side.clone()).unwrap();
        assert_eq!(store.status(&side.hash()), Some(HeaderStatus::Sidechain));

        // fork point is height 1; tip at 5 puts it 4 deep
        extend(&store, &main[1], 3, 0);
        assert_eq!(store.get_height(), 5);
        assert_eq!(store.status(&side.hash()), None);
        assert!(store.get_header_by_hash(&side.hash()).is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SpvConfig::for_testing(genesis()).with_retention_depth(0);
        assert!(matches!(
            HeaderChainStore::new(config),
            Err(HeaderChainError::InvalidConfig(_))
        ));
        let config = SpvConfig::for_testing(genesis()).with_max_proof_leaves(0);
        assert!(HeaderChainStore::new(config).is_err());
    }

    #[test]
    fn test_growing_branch_survives_past_horizon() {
        let config = SpvConfig::for_testing(genesis()).with_retention_depth(3);
        let store = HeaderChainStore::new(config).unwrap();
        extend(&store, &genesis(), 6, 0);

        let mut parent = genesis();
        for _ in 0..6 {
            let header = child(&parent, 8);
            assert!(!store.add_header(header.clone()).unwrap().tip_changed());
            assert_eq!(store.status(&header.hash()), Some(HeaderStatus::Sidechain));
            parent = header;
        }

        let winner = child(&parent, 8);
        let update = store.add_header(winner.clone()).unwrap();
        let ChainUpdate::Reorganized(event) = update else {
            panic!("expected reorg, got {update:?}");
        };
        assert_eq!(event.common_ancestor, genesis().hash());
        assert_eq!(event.connected.len(), 7);
        assert_eq!(store.get_height(), 7);
        assert_eq!(store.status(&winner.hash()), Some(HeaderStatus::Active));
    }

    #[test]
    fn test_unreachable_ancestor_is_an_error() {
        let store = store();
        extend(&store, &genesis(), 2, 0);
        let side = child(&genesis(), 5);
        let side_child = child(&side, 5);
        store.add_headers(&[side.clone(), side_child.clone()]).unwrap();
        {
            let mut guard = store.state.write();
            Arc::make_mut(&mut guard).nodes.remove(&side.hash());
        }
        let count = store.header_count();

        assert_eq!(
            store.add_header(child(&side_child, 5)),
            Err(HeaderChainError::BrokenAncestry(side.hash()))
        );
        assert_eq!(store.header_count(), count);
        assert_eq!(store.get_height(), 2);
    }

    #[test]
    fn test_confirmations() {
        let store = store();
        let headers = extend(&store, &genesis(), 3, 0);
        assert_eq!(store.confirmations(&headers[2].hash()), Some(1));
        assert_eq!(store.confirmations(&headers[0].hash()), Some(3));
        assert_eq!(store.confirmations(&[8u8; 32]), None);
    }

    #[test]
    fn test_locator_ends_at_genesis() {
        let store = store();
        let headers = extend(&store, &genesis(), 30, 0);
        let locator = store.locator();
        assert_eq!(locator.first(), Some(&headers[29].hash()));
        assert_eq!(locator.last(), Some(&genesis().hash()));
        assert!(locator.len() < 30);
    }

    #[test]
    fn test_checkpoint_enforced() {
        let main_1 = child(&genesis(), 0);
        let config =
            SpvConfig::for_testing(genesis()).with_checkpoint(Checkpoint::new(1, main_1.hash()));
        let store = HeaderChainStore::new(config).unwrap();

        let rival = child(&genesis(), 1);
        assert!(matches!(
            store.add_header(rival),
            Err(HeaderChainError::CheckpointMismatch { height: 1, .. })
        ));
        assert!(store.add_header(main_1).is_ok());
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let store = store();
        let a = child(&genesis(), 0);
        let b = child(&a, 0);
        let stray = child(&genesis(), 4);

        let result = store.add_headers(&[a.clone(), b.clone(), stray]);
        assert_eq!(result, Err(HeaderChainError::NonContiguousBatch { index: 2 }));
        assert_eq!(store.header_count(), 1);

        let updates = store.add_headers(&[a, b]).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(store.get_height(), 2);
    }

    #[test]
    fn test_batch_duplicate_rejected_without_changes() {
        let store = store();
        let a = child(&genesis(), 0);
        store.add_header(a.clone()).unwrap();
        let b = child(&a, 0);
        assert_eq!(
            store.add_headers(&[a.clone(), b]),
            Err(HeaderChainError::DuplicateHeader(a.hash()))
        );
        assert_eq!(store.get_height(), 1);
    }

    #[test]
    fn test_snapshot_is_stable_across_writes() {
        let store = store();
        extend(&store, &genesis(), 2, 0);
        let snapshot = store.snapshot();
        extend(&store, &store.get_tip(), 2, 0);
        assert_eq!(snapshot.height(), 2);
        assert_eq!(store.get_height(), 4);
    }
}
