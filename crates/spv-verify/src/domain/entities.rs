//! # Domain Entities
//!
//! Block headers and masternode-list records, with their bit-exact wire
//! layouts.

use super::errors::{Hash, HeaderChainError};
use super::invariants::{
    invariant_compact_target, invariant_header_size, HEADER_BASE_SIZE, HEADER_EXTENDED_SIZE,
    MASTERNODE_ENTRY_SIZE,
};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use shared_crypto::{cmp_as_uint256, sha256d};

/// Block header.
///
/// Wire layout (little-endian integers): version, previous-block hash,
/// transaction Merkle root, time, bits, nonce, then the optional 32-byte
/// coinbase-commitment extension.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeader {
    /// Block version.
    pub version: i32,
    /// Hash of the previous block.
    pub prev_hash: Hash,
    /// Merkle root of the block's transactions.
    pub merkle_root: Hash,
    /// Unix timestamp.
    pub time: u32,
    /// Compact difficulty target.
    pub bits: u32,
    /// Proof-of-work nonce.
    pub nonce: u32,
    /// Chain-specific extension: hash committed by the coinbase (the
    /// masternode-list root as of this block).
    pub coinbase_commitment: Option<Hash>,
}

impl BlockHeader {
    /// Create a header without the commitment extension.
    pub fn new(
        version: i32,
        prev_hash: Hash,
        merkle_root: Hash,
        time: u32,
        bits: u32,
        nonce: u32,
    ) -> Self {
        Self {
            version,
            prev_hash,
            merkle_root,
            time,
            bits,
            nonce,
            coinbase_commitment: None,
        }
    }

    /// Attach the coinbase-commitment extension.
    pub fn with_commitment(mut self, commitment: Hash) -> Self {
        self.coinbase_commitment = Some(commitment);
        self
    }

    /// Serialize to the fixed wire layout (80 or 112 bytes).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_EXTENDED_SIZE);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.prev_hash);
        out.extend_from_slice(&self.merkle_root);
        out.extend_from_slice(&self.time.to_le_bytes());
        out.extend_from_slice(&self.bits.to_le_bytes());
        out.extend_from_slice(&self.nonce.to_le_bytes());
        if let Some(commitment) = &self.coinbase_commitment {
            out.extend_from_slice(commitment);
        }
        out
    }

    /// Decode from the wire layout and validate fields.
    ///
    /// # Errors
    /// - `MalformedHeader` if the length is not 80 or 112 bytes
    /// - `MalformedHeader` if the compact target is invalid
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HeaderChainError> {
        invariant_header_size(bytes.len())?;

        let header = Self {
            version: i32::from_le_bytes(read_array(bytes, 0)),
            prev_hash: read_array(bytes, 4),
            merkle_root: read_array(bytes, 36),
            time: u32::from_le_bytes(read_array(bytes, 68)),
            bits: u32::from_le_bytes(read_array(bytes, 72)),
            nonce: u32::from_le_bytes(read_array(bytes, 76)),
            coinbase_commitment: (bytes.len() == HEADER_EXTENDED_SIZE)
                .then(|| read_array(bytes, HEADER_BASE_SIZE)),
        };
        header.validate()?;
        Ok(header)
    }

    /// Block hash: double SHA-256 of the serialized header.
    pub fn hash(&self) -> Hash {
        sha256d(&self.to_bytes())
    }

    /// Structural field checks.
    pub fn validate(&self) -> Result<(), HeaderChainError> {
        invariant_compact_target(self.bits).map(|_| ())
    }

    /// Expected number of hashes to meet this header's target:
    /// `2^256 / (target + 1)`.
    pub fn work(&self) -> Result<U256, HeaderChainError> {
        let target = invariant_compact_target(self.bits)?;
        // 2^256 does not fit; (~target / (target + 1)) + 1 is equivalent.
        Ok((!target / (target + U256::one())) + U256::one())
    }
}

fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}

/// One row of the simplified masternode list.
///
/// Payload fields are hashed but not interpreted.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MasternodeListEntry {
    /// Registration transaction hash; unique key and sort key.
    pub pro_reg_tx_hash: Hash,
    /// Hash of the block that confirmed the registration.
    pub confirmed_hash: Hash,
    /// Service address as IPv6 (IPv4 is mapped).
    pub service_ip: [u8; 16],
    /// Service port.
    pub service_port: u16,
    /// BLS operator public key.
    #[serde_as(as = "[_; 48]")]
    pub operator_public_key: [u8; 48],
    /// Voting key id.
    pub voting_key_id: [u8; 20],
    /// Whether the masternode is currently valid (not PoSe-banned).
    pub is_valid: bool,
}

impl MasternodeListEntry {
    /// Canonical serialization. The port is big-endian, as network
    /// addresses are.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MASTERNODE_ENTRY_SIZE);
        out.extend_from_slice(&self.pro_reg_tx_hash);
        out.extend_from_slice(&self.confirmed_hash);
        out.extend_from_slice(&self.service_ip);
        out.extend_from_slice(&self.service_port.to_be_bytes());
        out.extend_from_slice(&self.operator_public_key);
        out.extend_from_slice(&self.voting_key_id);
        out.push(u8::from(self.is_valid));
        out
    }

    /// Merkle leaf for this entry.
    pub fn entry_hash(&self) -> Hash {
        sha256d(&self.to_bytes())
    }
}

/// The masternode list as of one block, as delivered by a proof source.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MasternodeListDiff {
    /// Entries in arbitrary order.
    pub entries: Vec<MasternodeListEntry>,
}

impl MasternodeListDiff {
    /// Create from entries.
    pub fn new(entries: Vec<MasternodeListEntry>) -> Self {
        Self { entries }
    }

    /// Whether entries are already in ascending key order.
    pub fn is_sorted(&self) -> bool {
        entries_sorted(&self.entries)
    }
}

/// Whether `entries` are in ascending `pro_reg_tx_hash` order.
pub(crate) fn entries_sorted(entries: &[MasternodeListEntry]) -> bool {
    entries
        .windows(2)
        .all(|pair| cmp_as_uint256(&pair[0].pro_reg_tx_hash, &pair[1].pro_reg_tx_hash).is_le())
}

/// A masternode list whose root was verified against a block's coinbase.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifiedMasternodeList {
    /// Block the list is valid as of.
    pub block_hash: Hash,
    /// Height of that block.
    pub height: u64,
    /// Verified masternode-list Merkle root.
    pub merkle_root: Hash,
    /// Entries in ascending `pro_reg_tx_hash` order.
    pub entries: Vec<MasternodeListEntry>,
}

impl VerifiedMasternodeList {
    /// Look up an entry by registration hash.
    pub fn get(&self, pro_reg_tx_hash: &Hash) -> Option<&MasternodeListEntry> {
        self.entries
            .binary_search_by(|entry| cmp_as_uint256(&entry.pro_reg_tx_hash, pro_reg_tx_hash))
            .ok()
            .map(|index| &self.entries[index])
    }

    /// Entries not currently banned.
    pub fn valid_entries(&self) -> impl Iterator<Item = &MasternodeListEntry> {
        self.entries.iter().filter(|entry| entry.is_valid)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
