//! Jump consistent hash (Lamping–Veach).
//!
//! Stateless after configuration: no ring, no table, just the ordered bucket
//! list and an O(log N) arithmetic walk per lookup. Appending a bucket moves
//! only ~1/(N+1) of keys; removing any bucket other than the last reshuffles
//! broadly, so bucket lists should grow append-only.

use crate::chooser::Chooser;
use crate::error::KvError;

pub struct Jump {
    hash: fn(&[u8]) -> u64,
    buckets: Vec<String>,
}

impl Jump {
    /// A chooser keyed by the given 64-bit hash. Pick the hash to match
    /// whatever peers share the continuum; [`crate::hash::fnv1a`] reproduces
    /// the carbon-c-relay `jump_fnv1a` mapping.
    pub fn new(hash: fn(&[u8]) -> u64) -> Self {
        Jump {
            hash,
            buckets: Vec::new(),
        }
    }
}

/// The Lamping–Veach jump loop: maps a 64-bit key hash to a slot in
/// `[0, n)` with minimal movement as `n` grows.
fn jump_bucket(mut key: u64, n: usize) -> usize {
    let n = n as i64;
    let mut b: i64 = -1;
    let mut j: i64 = 0;
    while j < n {
        b = j;
        key = key.wrapping_mul(2862933555777941757).wrapping_add(1);
        j = ((b.wrapping_add(1) as f64) * ((1u64 << 31) as f64 / ((key >> 33) + 1) as f64)) as i64;
    }
    b as usize
}

impl Chooser for Jump {
    fn set_buckets(&mut self, buckets: &[String]) -> Result<(), KvError> {
        if buckets.is_empty() {
            return Err(KvError::NoBuckets);
        }
        self.buckets = buckets.to_vec();
        Ok(())
    }

    fn choose(&self, key: &str) -> &str {
        let h = (self.hash)(key.as_bytes());
        &self.buckets[jump_bucket(h, self.buckets.len())]
    }

    fn buckets(&self) -> &[String] {
        &self.buckets
    }
}
