//! Walks through an online resharding: populate a 4-shard store, migrate to
//! an 8-shard continuum with no read gap, then retire the old shards.

use sharded_kv::chooser::{Chooser, Ring};
use sharded_kv::storage::Memory;
use sharded_kv::{Shard, ShardedKv, Storage};
use std::sync::Arc;

const KEYS: usize = 10_000;

fn ring_over(names: &[String]) -> Result<Box<dyn Chooser>, Box<dyn std::error::Error>> {
    let mut ring = Ring::new();
    ring.set_buckets(names)?;
    Ok(Box::new(ring))
}

fn verify_all(kv: &ShardedKv, stage: &str) -> Result<(), Box<dyn std::error::Error>> {
    for i in 0..KEYS {
        let got = kv.get(&format!("item:{i}"))?;
        assert_eq!(
            got.as_deref(),
            Some(format!("payload-{i}").as_bytes()),
            "item:{i} missing {stage}"
        );
    }
    println!("  all {KEYS} keys readable {stage}");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let old_names: Vec<String> = (0..4).map(|i| format!("old{i}")).collect();
    let shards: Vec<Shard> = old_names
        .iter()
        .map(|n| Shard::new(n.clone(), Arc::new(Memory::new()) as Arc<dyn Storage>))
        .collect();
    let kv = ShardedKv::new(ring_over(&old_names)?, shards);

    println!("Populating {KEYS} keys over {} shards...", old_names.len());
    for i in 0..KEYS {
        kv.set(&format!("item:{i}"), format!("payload-{i}").as_bytes())?;
    }
    verify_all(&kv, "before migration")?;

    // 1. register the new topology
    let new_names: Vec<String> = (0..8).map(|i| format!("new{i}")).collect();
    for name in &new_names {
        kv.add_shard(name.clone(), Arc::new(Memory::new()));
    }

    // 2. begin the migration: reads now check new-then-old, writes go new
    kv.begin_migration(ring_over(&new_names)?);
    println!("Migration begun to {} shards", new_names.len());
    verify_all(&kv, "mid-migration (read-through)")?;

    // 3. backfill by rewriting every key through the router
    for i in 0..KEYS {
        kv.set(&format!("item:{i}"), format!("payload-{i}").as_bytes())?;
    }
    println!("Backfill complete");

    // 4. promote the new continuum and retire the old shards
    kv.end_migration();
    for name in &old_names {
        kv.delete_shard(name);
    }
    println!("Old shards retired");
    verify_all(&kv, "after migration")?;

    Ok(())
}
