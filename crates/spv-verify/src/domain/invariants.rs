//! # Domain Invariants
//!
//! Constants and rules that must always hold for headers, proofs and
//! masternode lists.

use super::errors::{Hash, HeaderChainError, MasternodeListError};
use primitive_types::U256;
use shared_crypto::cmp_as_uint256;
use std::cmp::Ordering;

/// Serialized size of the base header fields.
pub const HEADER_BASE_SIZE: usize = 80;

/// Serialized size of a header carrying the coinbase-commitment extension.
pub const HEADER_EXTENDED_SIZE: usize = HEADER_BASE_SIZE + 32;

/// Largest block the chain accepts, in bytes.
pub const MAX_BLOCK_SIZE: u32 = 2_000_000;

/// Smallest possible serialized transaction, in bytes.
pub const MIN_TRANSACTION_SIZE: u32 = 60;

/// Upper bound on transactions per block, and so on proof leaf counts.
pub const MAX_PROOF_LEAVES: u32 = MAX_BLOCK_SIZE / MIN_TRANSACTION_SIZE;

/// Default depth past which side branches are pruned.
pub const DEFAULT_RETENTION_DEPTH: u64 = 100;

/// Serialized size of one simplified masternode-list entry.
pub const MASTERNODE_ENTRY_SIZE: usize = 32 + 32 + 16 + 2 + 48 + 20 + 1;

/// Invariant: compact difficulty bits encode a positive target that fits in
/// 256 bits. Returns the expanded target.
pub fn invariant_compact_target(bits: u32) -> Result<U256, HeaderChainError> {
    let exponent = bits >> 24;
    let mantissa = bits & 0x007f_ffff;

    if mantissa != 0 && bits & 0x0080_0000 != 0 {
        return Err(HeaderChainError::MalformedHeader(format!(
            "negative target in bits {bits:#010x}"
        )));
    }
    let overflow = mantissa != 0
        && (exponent > 34
            || (mantissa > 0xff && exponent > 33)
            || (mantissa > 0xffff && exponent > 32));
    if overflow {
        return Err(HeaderChainError::MalformedHeader(format!(
            "target overflow in bits {bits:#010x}"
        )));
    }

    let target = if exponent <= 3 {
        U256::from(mantissa >> (8 * (3 - exponent)))
    } else {
        U256::from(mantissa) << (8 * (exponent - 3) as usize)
    };
    if target.is_zero() {
        return Err(HeaderChainError::MalformedHeader(format!(
            "zero target in bits {bits:#010x}"
        )));
    }
    Ok(target)
}

/// Invariant: header encoding has one of the two fixed sizes.
pub fn invariant_header_size(len: usize) -> Result<(), HeaderChainError> {
    if len != HEADER_BASE_SIZE && len != HEADER_EXTENDED_SIZE {
        return Err(HeaderChainError::MalformedHeader(format!(
            "expected {HEADER_BASE_SIZE} or {HEADER_EXTENDED_SIZE} bytes, got {len}"
        )));
    }
    Ok(())
}

/// Invariant: keys are strictly ascending by uint256 order.
///
/// Expects `keys` already sorted; equal neighbours are duplicates.
pub fn invariant_unique_sorted_keys<'a>(
    keys: impl IntoIterator<Item = &'a Hash>,
) -> Result<(), MasternodeListError> {
    let mut previous: Option<&Hash> = None;
    for key in keys {
        if let Some(prev) = previous {
            if cmp_as_uint256(prev, key) != Ordering::Less {
                return Err(MasternodeListError::DuplicateEntry(*key));
            }
        }
        previous = Some(key);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_proof_leaves() {
        assert_eq!(MAX_PROOF_LEAVES, 33_333);
    }

    #[test]
    fn test_compact_target_regtest_bits_pass() {
        assert!(invariant_compact_target(0x207f_ffff).is_ok());
        assert!(invariant_compact_target(0x1d00_ffff).is_ok());
    }

    #[test]
    fn test_compact_target_zero_fails() {
        assert!(invariant_compact_target(0x1d00_0000).is_err());
        // mantissa shifted out entirely
        assert!(invariant_compact_target(0x0100_3456).is_err());
    }

    #[test]
    fn test_compact_target_expansion() {
        let target = invariant_compact_target(0x1d00_ffff).unwrap();
        assert_eq!(target, U256::from(0xffffu64) << 208);
    }

    #[test]
    fn test_compact_target_negative_fails() {
        assert!(invariant_compact_target(0x0480_0001).is_err());
    }

    #[test]
    fn test_compact_target_overflow_fails() {
        assert!(invariant_compact_target(0x2301_0000).is_err());
        assert!(invariant_compact_target(0xff00_0001).is_err());
    }

    #[test]
    fn test_header_size() {
        assert!(invariant_header_size(80).is_ok());
        assert!(invariant_header_size(112).is_ok());
        assert!(invariant_header_size(81).is_err());
    }

    #[test]
    fn test_unique_sorted_keys() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        assert!(invariant_unique_sorted_keys([&a, &b]).is_ok());
        assert_eq!(
            invariant_unique_sorted_keys([&a, &a]),
            Err(MasternodeListError::DuplicateEntry(a))
        );
    }
}
