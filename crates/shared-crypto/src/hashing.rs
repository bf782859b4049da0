//! # Double SHA-256 Hashing
//!
//! The chain's hash primitive: `SHA256(SHA256(data))`. Leaf hashes, Merkle
//! interior nodes and block identities are all computed with it, so every
//! caller must go through this module to stay compatible with on-chain
//! commitments.

use sha2::{Digest, Sha256};
use std::cmp::Ordering;

/// 256-bit digest in internal (little-endian) byte order.
pub type Hash = [u8; 32];

/// All-zero hash, used as the previous-block hash of genesis.
pub const NULL_HASH: Hash = [0u8; 32];

/// Streaming double SHA-256 hasher.
#[derive(Clone, Default)]
pub struct Sha256dHasher {
    inner: Sha256,
}

impl Sha256dHasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Sha256::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return `SHA256(SHA256(data))`.
    pub fn finalize(self) -> Hash {
        let first = self.inner.finalize();
        to_hash(&Sha256::digest(first))
    }
}

/// Hash data with double SHA-256 (one-shot).
pub fn sha256d(data: &[u8]) -> Hash {
    to_hash(&Sha256::digest(Sha256::digest(data)))
}

fn to_hash(digest: &[u8]) -> Hash {
    let mut output = [0u8; 32];
    output.copy_from_slice(digest);
    output
}

/// Hash multiple inputs as one concatenated message.
pub fn sha256d_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = Sha256dHasher::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize()
}

/// Hash the concatenation `left || right` (Merkle interior node).
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256dHasher::new();
    hasher.update(left).update(right);
    hasher.finalize()
}

/// Compare two hashes as 256-bit little-endian integers.
///
/// This is the ordering the chain uses for hash-keyed sets such as the
/// masternode list; it differs from plain byte-wise comparison.
pub fn cmp_as_uint256(a: &Hash, b: &Hash) -> Ordering {
    a.iter().rev().cmp(b.iter().rev())
}

/// Hex in internal byte order.
pub fn to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// Hex in display order (byte-reversed), as block explorers print hashes.
pub fn to_display_hex(hash: &Hash) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}
