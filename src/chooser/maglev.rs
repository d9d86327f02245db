//! Maglev hashing.
//!
//! Builds a lookup table of prime size M (the least prime at or above
//! 100·N). Each bucket owns a permutation of table slots derived from an
//! offset and a skip; slots are claimed round-robin until the table is full,
//! so every bucket holds M/N slots within one. Lookups are a single hash and
//! a table index. Adding or removing one bucket disturbs only ~1/N of slots.

use crate::chooser::Chooser;
use crate::error::KvError;
use crate::hash::siphash_seeded;

const OFFSET_SEED: u64 = 0xdeadbeefcafebabe;
const SKIP_SEED: u64 = 0xfaceb00cbeefcafe;

/// Table slots per bucket; M is the least prime at or above this times N.
const TABLE_FACTOR: usize = 100;

pub struct Maglev {
    buckets: Vec<String>,
    table: Vec<usize>,
}

impl Maglev {
    pub fn new() -> Self {
        Maglev {
            buckets: Vec::new(),
            table: Vec::new(),
        }
    }

    fn table_size(n: usize) -> usize {
        let mut m = TABLE_FACTOR * n;
        while !primal::is_prime(m as u64) {
            m += 1;
        }
        m
    }
}

impl Default for Maglev {
    fn default() -> Self {
        Self::new()
    }
}

impl Chooser for Maglev {
    fn set_buckets(&mut self, buckets: &[String]) -> Result<(), KvError> {
        if buckets.is_empty() {
            return Err(KvError::NoBuckets);
        }

        let n = buckets.len();
        let m = Self::table_size(n);

        // Walking by repeated `+skip mod M` visits `(offset + j*skip) mod M`
        // in order without wide multiplication.
        let mut cursor: Vec<usize> = Vec::with_capacity(n);
        let mut skip: Vec<usize> = Vec::with_capacity(n);
        for name in buckets {
            let h1 = siphash_seeded(name.as_bytes(), OFFSET_SEED);
            let h2 = siphash_seeded(name.as_bytes(), SKIP_SEED);
            cursor.push((h1 % m as u64) as usize);
            skip.push((h2 % (m as u64 - 1)) as usize + 1);
        }

        const EMPTY: usize = usize::MAX;
        let mut table = vec![EMPTY; m];
        let mut filled = 0;
        'fill: loop {
            for bucket in 0..n {
                let mut slot = cursor[bucket];
                while table[slot] != EMPTY {
                    slot = (slot + skip[bucket]) % m;
                }
                table[slot] = bucket;
                cursor[bucket] = (slot + skip[bucket]) % m;
                filled += 1;
                if filled == m {
                    break 'fill;
                }
            }
        }

        self.table = table;
        self.buckets = buckets.to_vec();
        Ok(())
    }

    fn choose(&self, key: &str) -> &str {
        let h = siphash_seeded(key.as_bytes(), OFFSET_SEED);
        let slot = (h % self.table.len() as u64) as usize;
        &self.buckets[self.table[slot]]
    }

    fn buckets(&self) -> &[String] {
        &self.buckets
    }
}
