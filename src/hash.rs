//! Hash functions used by the choosers.
//!
//! Every function here is a pure bytes-to-integer mapping. The ring choosers
//! pin exact algorithms because their output is an interop contract with
//! deployed continuums; the 64-bit helpers are interchangeable as long as a
//! given chooser instance is built and queried with the same function.

use fnv::FnvHasher;
use siphasher::sip::SipHasher24;
use std::hash::Hasher;

/// LevelDB's bloom-filter hash, a murmur-lite over 32 bits.
///
/// Seed `0xbc9f1d34`, multiplier `0xc6a4a793`. This is the vnode and key
/// hash of the 160-vnode consistent-hash ring and must not change.
pub fn leveldb_bloom(data: &[u8]) -> u32 {
    const SEED: u32 = 0xbc9f1d34;
    const M: u32 = 0xc6a4a793;

    let mut h = SEED ^ (data.len() as u32).wrapping_mul(M);

    let mut b = data;
    while b.len() >= 4 {
        h = h.wrapping_add(u32::from_le_bytes([b[0], b[1], b[2], b[3]]));
        h = h.wrapping_mul(M);
        h ^= h >> 16;
        b = &b[4..];
    }

    if b.len() == 3 {
        h = h.wrapping_add((b[2] as u32) << 16);
    }
    if b.len() >= 2 {
        h = h.wrapping_add((b[1] as u32) << 8);
    }
    if !b.is_empty() {
        h = h.wrapping_add(b[0] as u32);
        h = h.wrapping_mul(M);
        h ^= h >> 24;
    }

    h
}

/// 64-bit FNV-1a.
pub fn fnv1a(data: &[u8]) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(data);
    hasher.finish()
}

/// SipHash-2-4 with both keys zero.
pub fn siphash(data: &[u8]) -> u64 {
    siphash_seeded(data, 0)
}

/// SipHash-2-4 keyed from a single 64-bit seed.
pub fn siphash_seeded(data: &[u8], seed: u64) -> u64 {
    let mut hasher = SipHasher24::new_with_keys(seed, seed);
    hasher.write(data);
    hasher.finish()
}
