//! Multi-probe consistent hashing.
//!
//! Buckets sit at fixed positions on a 64-bit circle. A lookup derives K
//! probe positions from two key hashes (`hk_j = h1 + j·h2`) and assigns the
//! key to the bucket closest to any probe in circular distance, ties going
//! to the lowest bucket index. More probes flatten the load: peak/mean is
//! roughly `1 + 1/sqrt(K)`, so the default K of 21 keeps the hottest bucket
//! within ~25% of the mean without any per-bucket table.

use crate::chooser::Chooser;
use crate::error::KvError;
use crate::hash::siphash_seeded;

/// Default probe count.
pub const DEFAULT_PROBES: usize = 21;

const DEFAULT_KEY_SEED: u64 = 0x9ae16a3b2f90404f;
const DEFAULT_STEP_SEED: u64 = 0xc3a5c85c97cb3127;

pub struct MultiProbe {
    probes: usize,
    key_seed: u64,
    step_seed: u64,
    buckets: Vec<String>,
    positions: Vec<u64>,
}

impl MultiProbe {
    pub fn new(probes: usize) -> Self {
        Self::with_seeds(probes, DEFAULT_KEY_SEED, DEFAULT_STEP_SEED)
    }

    /// Both ends of a shared continuum must agree on the seeds as well as
    /// the probe count.
    pub fn with_seeds(probes: usize, key_seed: u64, step_seed: u64) -> Self {
        MultiProbe {
            probes: probes.max(1),
            key_seed,
            step_seed,
            buckets: Vec::new(),
            positions: Vec::new(),
        }
    }
}

fn circular_distance(a: u64, b: u64) -> u64 {
    a.wrapping_sub(b).min(b.wrapping_sub(a))
}

impl Chooser for MultiProbe {
    fn set_buckets(&mut self, buckets: &[String]) -> Result<(), KvError> {
        if buckets.is_empty() {
            return Err(KvError::NoBuckets);
        }
        self.positions = buckets
            .iter()
            .map(|b| siphash_seeded(b.as_bytes(), self.step_seed))
            .collect();
        self.buckets = buckets.to_vec();
        Ok(())
    }

    fn choose(&self, key: &str) -> &str {
        let h1 = siphash_seeded(key.as_bytes(), self.key_seed);
        let h2 = siphash_seeded(key.as_bytes(), self.step_seed);

        let mut best = 0;
        let mut best_distance = u64::MAX;
        for probe in 0..self.probes {
            let hk = h1.wrapping_add((probe as u64).wrapping_mul(h2));
            for (idx, &pos) in self.positions.iter().enumerate() {
                let d = circular_distance(hk, pos);
                // ties go to the lowest bucket index
                if d < best_distance {
                    best = idx;
                    best_distance = d;
                }
            }
        }
        &self.buckets[best]
    }

    fn buckets(&self) -> &[String] {
        &self.buckets
    }
}
