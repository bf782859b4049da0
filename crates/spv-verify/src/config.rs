//! # SPV Configuration
//!
//! Chain parameters and resource limits for the verification engine.

use crate::domain::{
    BlockHeader, Checkpoint, Hash, HeaderChainError, SpvError, DEFAULT_RETENTION_DEPTH,
    MAX_PROOF_LEAVES,
};
use serde::{Deserialize, Serialize};

/// Rule for picking the active chain among competing branches.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ForkChoice {
    /// Greatest height wins; ties keep the first-seen branch.
    #[default]
    LongestChain,
    /// Greatest cumulative work (from compact `bits`) wins.
    MostWork,
}

/// SPV engine configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpvConfig {
    /// Genesis header the chain is rooted at.
    pub genesis: BlockHeader,

    /// Side branches forked more than this many blocks below the tip are
    /// pruned.
    pub retention_depth: u64,

    /// Active-chain selection rule.
    pub fork_choice: ForkChoice,

    /// Upper bound for a partial proof's leaf count.
    pub max_proof_leaves: u32,

    /// Trusted checkpoints, enforced on ingestion.
    pub checkpoints: Vec<Checkpoint>,

    /// Headers requested per header-source round trip.
    pub header_batch_size: usize,

    /// Capacity of the verified masternode-list cache.
    pub verified_list_cache_size: usize,
}

impl SpvConfig {
    /// Configuration with defaults for the given genesis header.
    pub fn new(genesis: BlockHeader) -> Self {
        Self {
            genesis,
            retention_depth: DEFAULT_RETENTION_DEPTH,
            fork_choice: ForkChoice::LongestChain,
            max_proof_leaves: MAX_PROOF_LEAVES,
            checkpoints: Vec::new(),
            header_batch_size: 2000,
            verified_list_cache_size: 64,
        }
    }

    /// Create a config for testing (smaller values).
    pub fn for_testing(genesis: BlockHeader) -> Self {
        Self {
            header_batch_size: 10,
            verified_list_cache_size: 4,
            ..Self::new(genesis)
        }
    }

    /// Set the side-branch retention depth.
    pub fn with_retention_depth(mut self, depth: u64) -> Self {
        self.retention_depth = depth;
        self
    }

    /// Set the fork-choice rule.
    pub fn with_fork_choice(mut self, fork_choice: ForkChoice) -> Self {
        self.fork_choice = fork_choice;
        self
    }

    /// Set the proof leaf-count bound.
    pub fn with_max_proof_leaves(mut self, max: u32) -> Self {
        self.max_proof_leaves = max;
        self
    }

    /// Add a checkpoint.
    pub fn with_checkpoint(mut self, checkpoint: Checkpoint) -> Self {
        self.checkpoints.push(checkpoint);
        self
    }

    /// Set the header batch size.
    pub fn with_header_batch_size(mut self, size: usize) -> Self {
        self.header_batch_size = size;
        self
    }

    /// Set the verified-list cache capacity.
    pub fn with_verified_list_cache_size(mut self, size: usize) -> Self {
        self.verified_list_cache_size = size;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// - `InvalidConfig` naming the first rejected value
    pub fn validate(&self) -> Result<(), SpvError> {
        self.check_values().map_err(SpvError::InvalidConfig)
    }

    pub(crate) fn check_values(&self) -> Result<(), String> {
        if self.retention_depth == 0 {
            return Err("retention_depth must be > 0".into());
        }
        if self.max_proof_leaves == 0 {
            return Err("max_proof_leaves must be > 0".into());
        }
        if self.header_batch_size == 0 {
            return Err("header_batch_size must be > 0".into());
        }
        if self.verified_list_cache_size == 0 {
            return Err("verified_list_cache_size must be > 0".into());
        }
        self.genesis.validate().map_err(|e| format!("genesis: {e}"))?;

        let mut heights: Vec<u64> = self.checkpoints.iter().map(|cp| cp.height).collect();
        heights.sort_unstable();
        if heights.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err("checkpoints must have distinct heights".into());
        }
        Ok(())
    }

    /// Checkpoint pinned at `height`, if any.
    pub fn checkpoint_at(&self, height: u64) -> Option<&Checkpoint> {
        self.checkpoints.iter().find(|cp| cp.height == height)
    }

    /// Check `hash` against the checkpoint at `height`.
    ///
    /// # Errors
    /// - `CheckpointMismatch` if a checkpoint pins a different hash
    pub fn check_checkpoint(&self, height: u64, hash: &Hash) -> Result<(), HeaderChainError> {
        match self.checkpoint_at(height) {
            Some(cp) if cp.hash != *hash => Err(HeaderChainError::CheckpointMismatch {
                height,
                expected: cp.hash,
                got: *hash,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::NULL_HASH;

    fn genesis() -> BlockHeader {
        BlockHeader::new(1, NULL_HASH, [1u8; 32], 1_000, 0x207f_ffff, 0)
    }

    #[test]
    fn test_default_config() {
        let config = SpvConfig::new(genesis());
        assert_eq!(config.retention_depth, 100);
        assert_eq!(config.fork_choice, ForkChoice::LongestChain);
        assert_eq!(config.max_proof_leaves, 33_333);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_config() {
        let config = SpvConfig::for_testing(genesis());
        assert_eq!(config.header_batch_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_retention() {
        let config = SpvConfig::new(genesis()).with_retention_depth(0);
        assert!(matches!(config.validate(), Err(SpvError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_bad_genesis_bits() {
        let mut bad = genesis();
        bad.bits = 0;
        assert!(SpvConfig::new(bad).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_checkpoint_heights() {
        let config = SpvConfig::new(genesis())
            .with_checkpoint(Checkpoint::new(5, [1u8; 32]))
            .with_checkpoint(Checkpoint::new(5, [2u8; 32]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_check_checkpoint() {
        let config = SpvConfig::new(genesis()).with_checkpoint(Checkpoint::new(5, [1u8; 32]));
        assert!(config.check_checkpoint(5, &[1u8; 32]).is_ok());
        assert!(config.check_checkpoint(6, &[2u8; 32]).is_ok());
        assert!(matches!(
            config.check_checkpoint(5, &[2u8; 32]),
            Err(HeaderChainError::CheckpointMismatch { height: 5, .. })
        ));
    }
}
