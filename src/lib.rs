//! # sharded-kv
//!
//! A client-side sharded key-value store: one logical KV interface that
//! distributes keys across named backend shards with a pluggable consistent
//! hashing scheme, supports online resharding between two shard sets with no
//! downtime, and composes with replicated and fail-fast storage wrappers for
//! fault tolerance and tail-latency control.
//!
//! ## Pieces
//!
//! - [`ShardedKv`]: the router. Implements the same [`Storage`] contract as
//!   the backends it routes to, so routers nest and wrappers stack under a
//!   shard name.
//! - [`chooser`]: interchangeable key-to-bucket mappers: a 160-vnode
//!   consistent-hash ring, Ketama, Jump, Rendezvous, Maglev, Multi-Probe,
//!   and an integer-weighting wrapper. The two ring schemes are
//!   byte-compatible with their widely deployed C counterparts.
//! - [`storage`]: the contract plus backends and wrappers: in-memory and
//!   filesystem backends, [`storage::Replica`] (hedged reads, parallel
//!   fan-out writes), [`storage::Backoff`] (four-state fail-fast health
//!   machine), and a public conformance suite for third-party backends.
//!
//! ## Example
//!
//! ```rust
//! use sharded_kv::chooser::{Chooser, Ring};
//! use sharded_kv::storage::Memory;
//! use sharded_kv::{Shard, ShardedKv, Storage};
//! use std::sync::Arc;
//!
//! let names: Vec<String> = (0..4).map(|i| format!("shard{i}")).collect();
//! let shards = names
//!     .iter()
//!     .map(|n| Shard::new(n.clone(), Arc::new(Memory::new()) as Arc<dyn Storage>))
//!     .collect();
//!
//! let mut ring = Ring::new();
//! ring.set_buckets(&names)?;
//!
//! let kv = ShardedKv::new(Box::new(ring), shards);
//! kv.set("user:42", b"alice")?;
//! assert_eq!(kv.get("user:42")?.as_deref(), Some(&b"alice"[..]));
//! # Ok::<(), sharded_kv::KvError>(())
//! ```
//!
//! ## Resharding
//!
//! Online migration moves a router from one continuum to another without a
//! read gap: register the new shards with [`ShardedKv::add_shard`], install
//! a chooser over the new bucket list with [`ShardedKv::begin_migration`]
//! (reads now check the new topology first and fall through to the old;
//! writes go to the new), optionally backfill by re-setting keys, then
//! [`ShardedKv::end_migration`] and drop the old shards. The window is
//! eventually consistent; see the [`router`] module docs.

pub mod chooser;
pub mod error;
pub mod hash;
pub mod router;
pub mod storage;

pub use chooser::Chooser;
pub use error::{KvError, MultiError};
pub use router::{Shard, ShardedKv};
pub use storage::Storage;
