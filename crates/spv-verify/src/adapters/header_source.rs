//! In-Memory Header Source Adapter
//!
//! Implements the `HeaderSource` port over a header chain held in memory.
//! Serves checkpoint bundles, fixtures, and tests that stand in for a peer.

use crate::domain::{BlockHeader, Hash, SpvError};
use crate::ports::outbound::HeaderSource;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

#[derive(Default)]
struct SourceChain {
    headers: Vec<BlockHeader>,
    index: HashMap<Hash, usize>,
}

impl SourceChain {
    fn new(headers: Vec<BlockHeader>) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(height, header)| (header.hash(), height))
            .collect();
        Self { headers, index }
    }
}

/// Header source backed by a linear chain, genesis first.
pub struct InMemoryHeaderSource {
    source_id: String,
    chain: RwLock<SourceChain>,
    available: AtomicBool,
}

impl InMemoryHeaderSource {
    /// Create a source serving `headers` (genesis first).
    pub fn new(source_id: impl Into<String>, headers: Vec<BlockHeader>) -> Self {
        Self {
            source_id: source_id.into(),
            chain: RwLock::new(SourceChain::new(headers)),
            available: AtomicBool::new(true),
        }
    }

    /// Append a header to the served chain.
    pub fn push(&self, header: BlockHeader) {
        let mut chain = self.chain.write();
        let height = chain.headers.len();
        chain.index.insert(header.hash(), height);
        chain.headers.push(header);
    }

    /// Replace the served chain, as a peer that switched branches would.
    pub fn replace_chain(&self, headers: Vec<BlockHeader>) {
        *self.chain.write() = SourceChain::new(headers);
    }

    /// Make subsequent requests fail (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Height of the served chain.
    pub fn height(&self) -> u64 {
        self.chain.read().headers.len().saturating_sub(1) as u64
    }
}

impl HeaderSource for InMemoryHeaderSource {
    fn get_headers(&self, locator: &[Hash], max: usize) -> Result<Vec<BlockHeader>, SpvError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(SpvError::Source {
                source_id: self.source_id.clone(),
                reason: "source unavailable".to_string(),
            });
        }

        let chain = self.chain.read();
        let fork = locator
            .iter()
            .find_map(|hash| chain.index.get(hash).copied())
            .unwrap_or(0);
        let start = (fork + 1).min(chain.headers.len());
        let end = start.saturating_add(max).min(chain.headers.len());

        debug!(
            "[spv] Serving {} headers from height {} via {}",
            end - start,
            start,
            self.source_id
        );
        Ok(chain.headers[start..end].to_vec())
    }

    fn source_id(&self) -> &str {
        &self.source_id
    }
}
