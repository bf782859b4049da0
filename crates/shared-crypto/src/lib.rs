//! # Shared Crypto - Chain Hashing Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Double SHA-256 | Block hashes, Merkle nodes, entry leaves |
//!
//! Every hash the SPV engine compares against on-chain data goes through
//! [`sha256d`]; a different digest would not match network commitments.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod hashing;

// Re-exports
pub use hashing::{
    cmp_as_uint256, hash_pair, sha256d, sha256d_many, to_display_hex, to_hex, Hash,
    Sha256dHasher, NULL_HASH,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
