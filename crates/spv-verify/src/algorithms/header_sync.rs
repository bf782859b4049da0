//! # Header Sync
//!
//! Batch checks and block-locator construction for header download.

use crate::domain::{BlockHeader, Hash, HeaderChainError};

/// Entries in a locator before the step starts doubling.
const LOCATOR_DENSE_ENTRIES: usize = 10;

/// Check that each header builds on its predecessor in the batch.
///
/// Returns the header hashes, ancestor first. Linkage of the first header
/// to stored headers is the store's concern.
///
/// # Errors
/// - `NonContiguousBatch` naming the first header that does not link
pub fn validate_header_batch(headers: &[BlockHeader]) -> Result<Vec<Hash>, HeaderChainError> {
    let hashes: Vec<Hash> = headers.iter().map(BlockHeader::hash).collect();

    for (index, pair) in headers.windows(2).enumerate() {
        if pair[1].prev_hash != hashes[index] {
            return Err(HeaderChainError::NonContiguousBatch { index: index + 1 });
        }
    }

    Ok(hashes)
}

/// Heights for a block locator over an active chain of height `tip_height`.
///
/// The first ten entries step back one block at a time, then the step
/// doubles. Genesis (height 0) always closes the list.
pub fn locator_heights(tip_height: u64) -> Vec<u64> {
    let mut heights = Vec::new();
    let mut height = tip_height;
    let mut step = 1u64;

    loop {
        heights.push(height);
        if height == 0 {
            break;
        }
        if heights.len() >= LOCATOR_DENSE_ENTRIES {
            step = step.saturating_mul(2);
        }
        height = height.saturating_sub(step);
    }

    heights
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::NULL_HASH;

    fn chain(count: usize) -> Vec<BlockHeader> {
        let mut headers: Vec<BlockHeader> = Vec::with_capacity(count);
        for i in 0..count {
            let prev_hash = headers.last().map_or(NULL_HASH, BlockHeader::hash);
            headers.push(BlockHeader::new(1, prev_hash, [i as u8; 32], 1_000 + i as u32 * 600, 0x207f_ffff, 0));
        }
        headers
    }

    #[test]
    fn test_validate_header_batch_empty() {
        assert_eq!(validate_header_batch(&[]), Ok(vec![]));
    }

    #[test]
    fn test_validate_header_batch_returns_hashes() {
        let headers = chain(4);
        let hashes = validate_header_batch(&headers).unwrap();
        assert_eq!(hashes.len(), 4);
        assert_eq!(hashes[3], headers[3].hash());
    }

    #[test]
    fn test_validate_header_batch_broken_link() {
        let mut headers = chain(4);
        headers[2].prev_hash = [9u8; 32];
        assert_eq!(
            validate_header_batch(&headers),
            Err(HeaderChainError::NonContiguousBatch { index: 2 })
        );
    }

    #[test]
    fn test_locator_heights_short_chain() {
        assert_eq!(locator_heights(0), vec![0]);
        assert_eq!(locator_heights(3), vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_locator_heights_doubles_after_ten() {
        let heights = locator_heights(100);
        assert_eq!(&heights[..10], &[100, 99, 98, 97, 96, 95, 94, 93, 92, 91]);
        assert_eq!(heights[10], 89);
        assert_eq!(heights[11], 85);
        assert_eq!(heights.last(), Some(&0));
        assert!(heights.windows(2).all(|pair| pair[0] > pair[1]));
    }
}
