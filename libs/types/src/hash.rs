//! # Hash Engine - Deterministic 64-bit Hash Chaining
//!
//! ## Purpose
//!
//! Pure streaming FNV-1 (64-bit) combination used for every identity in the
//! pathway system: tag-set hashes, node hashes and pathway hashes. There is no
//! randomness and no per-process keying, so two hosts that see the same tags
//! compute bit-identical values and a backend can merge their reports.
//!
//! ## Architecture Role
//!
//! ```text
//! TagSet::build ──► continue_hash(seed, "key:value") ──► hash / aggregation / complete
//!                                                         │
//! PathwayContext ──► pathway_hash(parent, node) ◄─────────┘
//! ```
//!
//! Changing any constant or the byte order fed to [`pathway_hash`] is a breaking
//! wire-format change.

/// FNV-1 64-bit offset basis, the seed of every fresh chain
pub const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

/// FNV-1 64-bit prime
pub const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Continue an FNV-1 chain from `seed` over raw bytes
#[inline]
pub fn continue_hash_bytes(seed: u64, bytes: &[u8]) -> u64 {
    bytes.iter().fold(seed, |hash, &byte| {
        hash.wrapping_mul(FNV_PRIME) ^ u64::from(byte)
    })
}

/// Continue an FNV-1 chain from `seed` over the UTF-8 bytes of `text`
///
/// This is the `combine(seed, text)` primitive used by tag hashing.
#[inline]
pub fn continue_hash(seed: u64, text: &str) -> u64 {
    continue_hash_bytes(seed, text.as_bytes())
}

/// Hash `bytes` as a fresh chain starting at [`FNV_OFFSET_BASIS`]
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    continue_hash_bytes(FNV_OFFSET_BASIS, bytes)
}

/// Seed identifying the reporting process: `service:<service>` then `env:<env>`
///
/// Node hashes chain from this seed instead of the bare offset basis, so the
/// same edge reported by two services lands in two distinct pathways.
pub fn base_hash(service: &str, env: Option<&str>) -> u64 {
    let mut seed = FNV_OFFSET_BASIS;
    if !service.is_empty() {
        seed = continue_hash(seed, &format!("service:{service}"));
    }
    if let Some(env) = env.filter(|env| !env.is_empty()) {
        seed = continue_hash(seed, &format!("env:{env}"));
    }
    seed
}

/// Combine a node hash with its parent pathway hash
///
/// The 16-byte input is `node` then `parent`, both little-endian. A parent of 0
/// marks the first edge of a pathway.
#[inline]
pub fn pathway_hash(parent: u64, node: u64) -> u64 {
    let mut buf = [0u8; 16];
    buf[..8].copy_from_slice(&node.to_le_bytes());
    buf[8..].copy_from_slice(&parent.to_le_bytes());
    hash_bytes(&buf)
}
