//! The shard router: one logical KV interface over many named backends.
//!
//! A router owns a map from shard name to backend and a primary continuum (a
//! configured [`Chooser`]). During a resharding it additionally holds a
//! migration continuum and routes per operation:
//!
//! - reads consult the migration shard first and fall through to the primary
//!   on a miss, so resharded and not-yet-resharded data are both visible;
//! - writes go only to the migration shard, draining the old topology;
//! - deletes hit both shards so neither copy survives.
//!
//! The migration window is eventually consistent: a concurrent delete and
//! read of the same key may observe stale data on the primary until the
//! migration side holds it. Callers needing stronger guarantees must fence
//! migrations themselves.
//!
//! The internal mutex is only ever held to snapshot the routed shard names
//! and clone backend handles, never across a backend call, so slow shards
//! do not serialize unrelated traffic.

use crate::chooser::Chooser;
use crate::error::KvError;
use crate::storage::Storage;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// A named backend, as handed to [`ShardedKv::new`].
pub struct Shard {
    pub name: String,
    pub backend: Arc<dyn Storage>,
}

impl Shard {
    pub fn new(name: impl Into<String>, backend: Arc<dyn Storage>) -> Self {
        Shard {
            name: name.into(),
            backend,
        }
    }
}

struct Topology {
    primary: Box<dyn Chooser>,
    migration: Option<Box<dyn Chooser>>,
    backends: HashMap<String, Arc<dyn Storage>>,
}

impl Topology {
    /// Resolve the backend for the shard `chooser` routes `key` to.
    ///
    /// Panics if the chosen shard has no registered backend: every bucket a
    /// continuum can return must have been added via `add_shard` first.
    fn resolve(&self, chooser: &dyn Chooser, key: &str) -> Arc<dyn Storage> {
        let shard = chooser.choose(key);
        match self.backends.get(shard) {
            Some(backend) => Arc::clone(backend),
            None => panic!("no backend registered for shard {shard:?}"),
        }
    }
}

pub struct ShardedKv {
    topology: Mutex<Topology>,
}

impl ShardedKv {
    /// A router over `shards` with `chooser` as the primary continuum.
    ///
    /// The chooser must already be configured (via
    /// [`Chooser::set_buckets`]) with bucket names matching the shard names.
    pub fn new(chooser: Box<dyn Chooser>, shards: Vec<Shard>) -> Self {
        let backends = shards
            .into_iter()
            .map(|s| (s.name, s.backend))
            .collect::<HashMap<_, _>>();
        ShardedKv {
            topology: Mutex::new(Topology {
                primary: chooser,
                migration: None,
                backends,
            }),
        }
    }

    /// Snapshot the backend(s) responsible for `key`: `(migration, primary)`.
    fn route(&self, key: &str) -> (Option<Arc<dyn Storage>>, Arc<dyn Storage>) {
        let topology = self.topology.lock();
        let migration = topology
            .migration
            .as_ref()
            .map(|chooser| topology.resolve(chooser.as_ref(), key));
        let primary = topology.resolve(topology.primary.as_ref(), key);
        (migration, primary)
    }

    /// Register a backend under a shard name, replacing any previous one.
    pub fn add_shard(&self, name: impl Into<String>, backend: Arc<dyn Storage>) {
        let name = name.into();
        log::debug!("adding shard {name}");
        self.topology.lock().backends.insert(name, backend);
    }

    /// Drop a shard's backend. The shard must no longer be reachable from
    /// either continuum; removing a still-routed shard leaves the router
    /// panicking on the keys mapping to it.
    pub fn delete_shard(&self, name: &str) {
        log::debug!("deleting shard {name}");
        self.topology.lock().backends.remove(name);
    }

    /// Install `chooser` as the migration continuum. Its buckets must all
    /// have been registered via [`add_shard`](Self::add_shard) already.
    pub fn begin_migration(&self, chooser: Box<dyn Chooser>) {
        log::info!("beginning migration to {} shards", chooser.buckets().len());
        self.topology.lock().migration = Some(chooser);
    }

    /// Promote the migration continuum to primary. No-op if no migration is
    /// in progress.
    pub fn end_migration(&self) {
        let mut topology = self.topology.lock();
        if let Some(migration) = topology.migration.take() {
            log::info!("migration complete, {} shards primary", migration.buckets().len());
            topology.primary = migration;
        }
    }
}

impl Storage for ShardedKv {
    /// During a migration, a value found on the migration shard wins; a miss
    /// falls through to the primary. An error from the migration shard is
    /// returned as-is: it is a fault, not a miss.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        let (migration, primary) = self.route(key);
        if let Some(backend) = migration {
            if let Some(value) = backend.get(key)? {
                return Ok(Some(value));
            }
        }
        primary.get(key)
    }

    /// Writes land on the migration shard when one is configured: new data
    /// goes to the new topology while reads still cover the old one.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
        let (migration, primary) = self.route(key);
        migration.unwrap_or(primary).set(key, value)
    }

    /// Deletes run against both topologies; the result is true if either
    /// held the key. The first error aborts.
    fn delete(&self, key: &str) -> Result<bool, KvError> {
        let (migration, primary) = self.route(key);
        let mut existed = false;
        if let Some(backend) = migration {
            existed = backend.delete(key)?;
        }
        let ok = primary.delete(key)?;
        Ok(ok || existed)
    }

    fn reset_connection(&self, key: &str) -> Result<(), KvError> {
        let (migration, primary) = self.route(key);
        if let Some(backend) = migration {
            backend.reset_connection(key)?;
        }
        primary.reset_connection(key)
    }
}
