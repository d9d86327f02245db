//! Consistent-hash ring with LevelDB-bloom vnode hashing.
//!
//! Each bucket contributes [`VNODES`] points to a 32-bit ring, hashed from
//! the label `"<i><bucket>"`. A key maps to the first ring point at or after
//! its own hash, wrapping past the top. The labels, hash and lookup rule are
//! byte-compatible with existing 160-vnode memcached continuums, so a bucket
//! list shared with a deployed fleet routes identically.

use crate::chooser::Chooser;
use crate::error::KvError;
use crate::hash::leveldb_bloom;

/// Ring points contributed by each bucket.
pub const VNODES: usize = 160;

pub struct Ring {
    // (point, bucket index) sorted by point, ties by bucket name
    points: Vec<(u32, usize)>,
    buckets: Vec<String>,
}

impl Ring {
    pub fn new() -> Self {
        Ring {
            points: Vec::new(),
            buckets: Vec::new(),
        }
    }
}

impl Default for Ring {
    fn default() -> Self {
        Self::new()
    }
}

impl Chooser for Ring {
    fn set_buckets(&mut self, buckets: &[String]) -> Result<(), KvError> {
        if buckets.is_empty() {
            return Err(KvError::NoBuckets);
        }

        let mut points = Vec::with_capacity(buckets.len() * VNODES);
        for (idx, name) in buckets.iter().enumerate() {
            for vnode in 0..VNODES {
                points.push((leveldb_bloom(format!("{vnode}{name}").as_bytes()), idx));
            }
        }
        // Equal points resolve to the lexicographically earlier bucket.
        points.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| buckets[a.1].cmp(&buckets[b.1])));

        self.points = points;
        self.buckets = buckets.to_vec();
        Ok(())
    }

    fn choose(&self, key: &str) -> &str {
        let h = leveldb_bloom(key.as_bytes());
        let mut idx = self.points.partition_point(|p| p.0 < h);
        if idx == self.points.len() {
            idx = 0;
        }
        &self.buckets[self.points[idx].1]
    }

    fn buckets(&self) -> &[String] {
        &self.buckets
    }
}
