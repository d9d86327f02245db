use sharded_kv::chooser::{Chooser, Ring};
use sharded_kv::storage::Memory;
use sharded_kv::{Shard, ShardedKv, Storage};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Sharded KV Demo");
    println!("===============");

    let names: Vec<String> = (0..4).map(|i| format!("shard{i}")).collect();
    let shards: Vec<Shard> = names
        .iter()
        .map(|n| Shard::new(n.clone(), Arc::new(Memory::new()) as Arc<dyn Storage>))
        .collect();

    let mut ring = Ring::new();
    ring.set_buckets(&names)?;
    println!("Built a {}-shard ring continuum", names.len());

    let kv = ShardedKv::new(Box::new(ring), shards);

    for i in 0..1000 {
        kv.set(&format!("user:{i}"), format!("profile-{i}").as_bytes())?;
    }
    println!("Stored 1000 keys across the shards");

    for key in ["user:0", "user:42", "user:999", "user:missing"] {
        match kv.get(key)? {
            Some(value) => println!("  {key}: {}", String::from_utf8_lossy(&value)),
            None => println!("  {key}: (not found)"),
        }
    }

    let existed = kv.delete("user:42")?;
    println!("Deleted user:42 (existed: {existed})");
    assert_eq!(kv.get("user:42")?, None);

    Ok(())
}
