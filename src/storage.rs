//! The storage contract and the backends and wrappers implementing it.
//!
//! Everything that stores or forwards key-value pairs implements [`Storage`]:
//! concrete backends ([`Memory`], [`Fs`]), the fault-tolerance wrappers
//! ([`Backoff`], [`Replica`]), and the router itself. Wrappers compose: a
//! shard is commonly a `Replica` over several `Backoff`-wrapped connections.

use crate::error::KvError;
use std::sync::Arc;

pub mod backoff;
pub mod fs;
pub mod memory;
pub mod replica;
pub mod storagetest;

pub use backoff::Backoff;
pub use fs::Fs;
pub use memory::Memory;
pub use replica::Replica;

/// A key-value backend.
///
/// All operations are safe to invoke concurrently. Calls may block for as
/// long as the underlying medium takes; callers must not invoke them while
/// holding locks they cannot afford to park.
pub trait Storage: Send + Sync {
    /// Fetch a key. `Ok(None)` means the key does not exist and is not an
    /// error; `Err` implies no value was retrieved.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError>;

    /// Store a value, overwriting any existing one.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError>;

    /// Remove a key. The returned bool is best-effort "the key existed";
    /// backends that cannot know report their closest approximation.
    fn delete(&self, key: &str) -> Result<bool, KvError>;

    /// Advisory: drop and re-establish whatever connection serves `key`.
    /// No-op for connectionless backends.
    fn reset_connection(&self, key: &str) -> Result<(), KvError>;
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool, KvError> {
        (**self).delete(key)
    }

    fn reset_connection(&self, key: &str) -> Result<(), KvError> {
        (**self).reset_connection(key)
    }
}
