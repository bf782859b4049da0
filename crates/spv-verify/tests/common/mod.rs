//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use spv_verify::{BlockHeader, Hash, MasternodeListEntry, SpvConfig};
use tracing_subscriber::EnvFilter;

pub const REGTEST_BITS: u32 = 0x207f_ffff;

/// Install a fmt subscriber honoring `RUST_LOG`; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn genesis() -> BlockHeader {
    BlockHeader::new(1, [0u8; 32], [1u8; 32], 1_700_000_000, REGTEST_BITS, 0)
}

pub fn test_config() -> SpvConfig {
    SpvConfig::for_testing(genesis())
}

/// `count` headers building on `parent`; `salt` separates competing branches.
pub fn branch(parent: &BlockHeader, count: usize, salt: u32) -> Vec<BlockHeader> {
    let mut headers: Vec<BlockHeader> = Vec::with_capacity(count);
    for _ in 0..count {
        let prev = headers.last().unwrap_or(parent);
        let next = BlockHeader::new(1, prev.hash(), [2u8; 32], prev.time + 150, REGTEST_BITS, salt);
        headers.push(next);
    }
    headers
}

/// Masternode entry `i` of the fixed three-entry list.
pub fn masternode_entry(i: u8) -> MasternodeListEntry {
    let mut pro_reg_tx_hash = [0xaa; 32];
    pro_reg_tx_hash[31] = i;
    let mut service_ip = [0u8; 16];
    service_ip[10..].copy_from_slice(&[0xff, 0xff, 10, 0, 0, i]);
    MasternodeListEntry {
        pro_reg_tx_hash,
        confirmed_hash: [0x20 + i; 32],
        service_ip,
        service_port: 9999,
        operator_public_key: [0x30 + i; 48],
        voting_key_id: [0x40 + i; 20],
        is_valid: true,
    }
}

pub fn hash_from_hex(s: &str) -> Hash {
    let bytes = hex::decode(s).expect("valid hex");
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&bytes);
    hash
}
