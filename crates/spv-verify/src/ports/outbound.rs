//! # Outbound Ports
//!
//! Traits for the collaborators the engine relies on but does not
//! implement: header download and coinbase payload decoding.

use crate::domain::{BlockHeader, Hash, SpvError};

/// Header source - outbound port.
///
/// A peer, RPC client or checkpoint loader that serves headers following
/// a block locator.
pub trait HeaderSource: Send + Sync {
    /// Headers following the first locator hash the source knows,
    /// ancestor-first, at most `max`.
    ///
    /// If no locator hash is known, serve from the block after genesis.
    /// An empty result means the caller is caught up.
    fn get_headers(&self, locator: &[Hash], max: usize) -> Result<Vec<BlockHeader>, SpvError>;

    /// Get source identifier (for logging/debugging).
    fn source_id(&self) -> &str;
}

/// Coinbase commitment decoder - outbound port.
///
/// Extracts the masternode-list root from a coinbase special-transaction
/// payload. Payload formats are chain- and version-specific, so decoding
/// stays outside the verifier.
pub trait CoinbaseCommitmentDecoder: Send + Sync {
    /// Commitment bytes carried by the raw coinbase transaction.
    fn decode_commitment(&self, coinbase_tx: &[u8]) -> Result<Vec<u8>, SpvError>;
}
