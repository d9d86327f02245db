//! Rendezvous (highest random weight) hashing.
//!
//! Every bucket scores each key with a combined hash; the highest score
//! wins. O(N) per lookup, no tables, and the best movement behavior of the
//! family: adding or removing any bucket relocates only the keys that bucket
//! wins or loses.

use crate::chooser::Chooser;
use crate::error::KvError;
use crate::hash::{siphash, siphash_seeded};

pub struct Rendezvous {
    buckets: Vec<String>,
    // per-bucket seed folded into every key score
    seeds: Vec<u64>,
}

impl Rendezvous {
    pub fn new() -> Self {
        Rendezvous {
            buckets: Vec::new(),
            seeds: Vec::new(),
        }
    }
}

impl Default for Rendezvous {
    fn default() -> Self {
        Self::new()
    }
}

impl Chooser for Rendezvous {
    fn set_buckets(&mut self, buckets: &[String]) -> Result<(), KvError> {
        if buckets.is_empty() {
            return Err(KvError::NoBuckets);
        }
        self.seeds = buckets.iter().map(|b| siphash(b.as_bytes())).collect();
        self.buckets = buckets.to_vec();
        Ok(())
    }

    fn choose(&self, key: &str) -> &str {
        let mut best = 0;
        let mut best_score = siphash_seeded(key.as_bytes(), self.seeds[0]);
        for (idx, &seed) in self.seeds.iter().enumerate().skip(1) {
            let score = siphash_seeded(key.as_bytes(), seed);
            // Equal scores resolve to the lexicographically larger name.
            if score > best_score
                || (score == best_score && self.buckets[idx] > self.buckets[best])
            {
                best = idx;
                best_score = score;
            }
        }
        &self.buckets[best]
    }

    fn buckets(&self) -> &[String] {
        &self.buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_only_moves_keys_of_the_removed_bucket() {
        let buckets: Vec<String> = (0..10).map(|i| format!("node-{i}")).collect();
        let mut full = Rendezvous::new();
        full.set_buckets(&buckets).unwrap();

        // drop node-4 from the middle
        let reduced: Vec<String> = buckets.iter().filter(|b| *b != "node-4").cloned().collect();
        let mut partial = Rendezvous::new();
        partial.set_buckets(&reduced).unwrap();

        for i in 0..3000 {
            let key = format!("object/{i}");
            let before = full.choose(&key).to_string();
            if before != "node-4" {
                assert_eq!(partial.choose(&key), before, "key {key} moved needlessly");
            }
        }
    }

    #[test]
    fn insertion_order_is_irrelevant() {
        let forward: Vec<String> = (0..6).map(|i| format!("n{i}")).collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        let mut a = Rendezvous::new();
        a.set_buckets(&forward).unwrap();
        let mut b = Rendezvous::new();
        b.set_buckets(&reversed).unwrap();

        for i in 0..500 {
            let key = format!("k{i}");
            assert_eq!(a.choose(&key), b.choose(&key));
        }
    }
}
