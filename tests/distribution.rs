//! Distribution quality and movement properties of the choosers.
//!
//! Each check hashes 10^4 keys per bucket and compares the hottest bucket
//! against the mean. The larger sweeps take seconds and are ignored by
//! default; run them with `cargo test --release -- --ignored`.

use sharded_kv::chooser::{Chooser, Jump, Ketama, Maglev, MultiProbe, Rendezvous, Ring, Weighted};
use sharded_kv::hash::{fnv1a, siphash};
use std::collections::HashMap;

fn bucket_names(shards: usize) -> Vec<String> {
    (0..shards).map(|i| format!("shard-{i}")).collect()
}

fn peak_to_mean(chooser: &mut dyn Chooser, shards: usize) -> f64 {
    let buckets = bucket_names(shards);
    chooser.set_buckets(&buckets).unwrap();

    let mut hits: HashMap<String, usize> = HashMap::new();
    let total = shards * 10_000;
    for i in 0..total {
        *hits.entry(chooser.choose(&format!("key{i}")).to_string()).or_default() += 1;
    }

    assert!(hits.len() <= shards);
    let peak = *hits.values().max().unwrap();
    peak as f64 / (total as f64 / shards as f64)
}

fn check_distribution(chooser: &mut dyn Chooser, shards: usize, limit: f64) {
    let ratio = peak_to_mean(chooser, shards);
    assert!(
        ratio <= limit,
        "peak/mean {ratio:.3} over {shards} shards exceeds {limit}"
    );
}

// ring-family choosers must stay within 1.5, the table- and probe-based
// schemes within their scheme-specific bounds

#[test]
fn ring_distribution_8() {
    check_distribution(&mut Ring::new(), 8, 1.5);
}

#[test]
fn ring_distribution_32() {
    check_distribution(&mut Ring::new(), 32, 1.5);
}

#[test]
#[ignore = "multi-second sweep; run with --ignored"]
fn ring_distribution_128() {
    check_distribution(&mut Ring::new(), 128, 1.5);
}

#[test]
#[ignore = "multi-second sweep; run with --ignored"]
fn ring_distribution_512() {
    check_distribution(&mut Ring::new(), 512, 1.5);
}

#[test]
fn ketama_distribution_8() {
    check_distribution(&mut Ketama::new(), 8, 1.5);
}

#[test]
fn ketama_distribution_32() {
    check_distribution(&mut Ketama::new(), 32, 1.5);
}

#[test]
#[ignore = "multi-second sweep; run with --ignored"]
fn ketama_distribution_128() {
    check_distribution(&mut Ketama::new(), 128, 1.5);
}

#[test]
#[ignore = "multi-second sweep; run with --ignored"]
fn ketama_distribution_512() {
    check_distribution(&mut Ketama::new(), 512, 1.5);
}

#[test]
fn maglev_distribution_8() {
    check_distribution(&mut Maglev::new(), 8, 1.5);
}

#[test]
fn maglev_distribution_32() {
    check_distribution(&mut Maglev::new(), 32, 1.5);
}

#[test]
#[ignore = "multi-second sweep; run with --ignored"]
fn maglev_distribution_128() {
    check_distribution(&mut Maglev::new(), 128, 1.5);
}

#[test]
#[ignore = "multi-second sweep; run with --ignored"]
fn maglev_distribution_512() {
    check_distribution(&mut Maglev::new(), 512, 1.5);
}

#[test]
fn rendezvous_distribution_8() {
    check_distribution(&mut Rendezvous::new(), 8, 1.5);
}

#[test]
fn rendezvous_distribution_32() {
    check_distribution(&mut Rendezvous::new(), 32, 1.5);
}

#[test]
#[ignore = "multi-second sweep; run with --ignored"]
fn rendezvous_distribution_128() {
    check_distribution(&mut Rendezvous::new(), 128, 1.5);
}

#[test]
#[ignore = "multi-second sweep; run with --ignored"]
fn rendezvous_distribution_512() {
    check_distribution(&mut Rendezvous::new(), 512, 1.5);
}

#[test]
fn jump_distribution_8() {
    check_distribution(&mut Jump::new(siphash), 8, 2.0);
}

#[test]
fn jump_distribution_32() {
    check_distribution(&mut Jump::new(siphash), 32, 2.0);
}

#[test]
#[ignore = "multi-second sweep; run with --ignored"]
fn jump_distribution_128() {
    check_distribution(&mut Jump::new(siphash), 128, 2.0);
}

#[test]
#[ignore = "multi-second sweep; run with --ignored"]
fn jump_distribution_512() {
    check_distribution(&mut Jump::new(siphash), 512, 2.0);
}

#[test]
fn multiprobe_distribution_8() {
    check_distribution(&mut MultiProbe::new(21), 8, 2.0);
}

#[test]
fn multiprobe_distribution_32() {
    check_distribution(&mut MultiProbe::new(21), 32, 2.0);
}

#[test]
#[ignore = "multi-second sweep; run with --ignored"]
fn multiprobe_distribution_128() {
    check_distribution(&mut MultiProbe::new(21), 128, 2.0);
}

#[test]
#[ignore = "multi-second sweep; run with --ignored"]
fn multiprobe_distribution_512() {
    check_distribution(&mut MultiProbe::new(21), 512, 2.0);
}

#[test]
fn jump_append_moves_one_in_n_plus_one() {
    // appending the ninth bucket must move 1/9 of keys, within 10%
    let eight = bucket_names(8);
    let nine = bucket_names(9);

    let mut before = Jump::new(fnv1a);
    before.set_buckets(&eight).unwrap();
    let mut after = Jump::new(fnv1a);
    after.set_buckets(&nine).unwrap();

    let total = 80_000;
    let mut moved = 0;
    for i in 0..total {
        let key = format!("key{i}");
        if before.choose(&key) != after.choose(&key) {
            moved += 1;
        }
    }

    let fraction = moved as f64 / total as f64;
    let ideal = 1.0 / 9.0;
    assert!(
        (fraction - ideal).abs() <= ideal * 0.1,
        "moved fraction {fraction:.4}, expected {ideal:.4} +/- 10%"
    );
    // everything that moved must have moved to the appended bucket
    for i in 0..5000 {
        let key = format!("key{i}");
        if before.choose(&key) != after.choose(&key) {
            assert_eq!(after.choose(&key), "shard-8");
        }
    }
}

#[test]
fn weighted_shares_converge_to_weight_over_total() {
    let weights: HashMap<&str, u32> = [("small", 1), ("medium", 3), ("large", 4)].into();
    let mut chooser = Weighted::new(Jump::new(siphash), move |name| weights[name]);
    chooser
        .set_buckets(&["small".into(), "medium".into(), "large".into()])
        .unwrap();

    let total = 80_000;
    let mut hits: HashMap<String, usize> = HashMap::new();
    for i in 0..total {
        *hits.entry(chooser.choose(&format!("key{i}")).to_string()).or_default() += 1;
    }

    for (name, weight) in [("small", 1.0), ("medium", 3.0), ("large", 4.0)] {
        let want = weight / 8.0;
        let got = hits[name] as f64 / total as f64;
        assert!(
            (got - want).abs() < want * 0.1,
            "{name}: share {got:.4}, want ~{want:.4}"
        );
    }
}
