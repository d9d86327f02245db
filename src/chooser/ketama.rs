//! Ketama consistent hashing.
//!
//! The canonical memcached continuum: each bucket hashes 40 labels
//! `"<bucket>-<k>"` through MD5 and every 16-byte digest contributes four
//! little-endian 32-bit ring points, 160 points per bucket. Keys hash to the
//! little-endian u32 of the first four bytes of their MD5 digest. Mapping is
//! bit-for-bit identical to libketama for the same bucket list, which is the
//! point: clients written against the C library and this one route keys to
//! the same servers.

use crate::chooser::Chooser;
use crate::error::KvError;

const LABELS_PER_BUCKET: usize = 40;

pub struct Ketama {
    points: Vec<(u32, usize)>,
    buckets: Vec<String>,
}

impl Ketama {
    pub fn new() -> Self {
        Ketama {
            points: Vec::new(),
            buckets: Vec::new(),
        }
    }

    fn key_hash(key: &[u8]) -> u32 {
        let digest = md5::compute(key);
        u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
    }
}

impl Default for Ketama {
    fn default() -> Self {
        Self::new()
    }
}

impl Chooser for Ketama {
    fn set_buckets(&mut self, buckets: &[String]) -> Result<(), KvError> {
        if buckets.is_empty() {
            return Err(KvError::NoBuckets);
        }

        let mut points = Vec::with_capacity(buckets.len() * LABELS_PER_BUCKET * 4);
        for (idx, name) in buckets.iter().enumerate() {
            for label in 0..LABELS_PER_BUCKET {
                let digest = md5::compute(format!("{name}-{label}").as_bytes());
                for chunk in 0..4 {
                    let at = chunk * 4;
                    let point = u32::from_le_bytes([
                        digest[at],
                        digest[at + 1],
                        digest[at + 2],
                        digest[at + 3],
                    ]);
                    points.push((point, idx));
                }
            }
        }
        // Stable sort: equal points keep build order, so rebuilds are
        // deterministic.
        points.sort_by_key(|p| p.0);

        self.points = points;
        self.buckets = buckets.to_vec();
        Ok(())
    }

    fn choose(&self, key: &str) -> &str {
        let h = Self::key_hash(key.as_bytes());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_libketama_reference_vectors() {
        let buckets: Vec<String> = (0..10).map(|i| format!("shard{i}")).collect();
        let mut ketama = Ketama::new();
        ketama.set_buckets(&buckets).unwrap();

        let fixture = [
            ("test0", "shard5"),
            ("test1", "shard3"),
            ("test2", "shard2"),
            ("test3", "shard9"),
            ("test4", "shard3"),
            ("test5", "shard5"),
            ("test6", "shard5"),
            ("test7", "shard3"),
            ("test8", "shard7"),
            ("test9", "shard8"),
            ("test10", "shard2"),
            ("test11", "shard0"),
            ("hello", "shard0"),
            ("world", "shard3"),
            ("foo", "shard0"),
            ("bar", "shard2"),
        ];
        for (key, want) in fixture {
            assert_eq!(ketama.choose(key), want, "key {key}");
        }
    }

    #[test]
    fn four_points_per_digest() {
        let mut ketama = Ketama::new();
        ketama.set_buckets(&["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(ketama.points.len(), 2 * LABELS_PER_BUCKET * 4);
    }
}
