//! Conformance suite for [`Storage`] implementations, plus the test doubles
//! the wrapper tests are built from. Public so backend authors outside this
//! crate can run the same probes against their own implementations.

use crate::error::KvError;
use crate::storage::Storage;
use std::time::Duration;

/// Exercise the full storage contract against `storage`.
///
/// Probes, in order: a miss, a set, a hit, deleting a missing key, deleting
/// the stored key, and the post-delete miss. Panics on the first violation.
pub fn storage_suite(storage: &dyn Storage) {
    let miss = storage.get("hello").expect("get of a missing key must not error");
    assert!(miss.is_none(), "missing key returned a value: {miss:?}");

    storage.set("hello", b"wowza").expect("set failed");

    let hit = storage.get("hello").expect("get of a stored key errored");
    assert_eq!(hit.as_deref(), Some(&b"wowza"[..]), "stored value came back wrong");

    let deleted = storage.delete("doesnotexist").expect("delete of a missing key errored");
    assert!(!deleted, "deleting a missing key reported existence");

    let deleted = storage.delete("hello").expect("delete of a stored key errored");
    assert!(deleted, "deleting a stored key reported no existence");

    let miss = storage.get("hello").expect("get after delete errored");
    assert!(miss.is_none(), "key survived deletion: {miss:?}");
}

/// A backend whose every operation fails.
pub struct ErrStore;

impl ErrStore {
    fn fail() -> KvError {
        KvError::Backend("errstore: simulated failure".into())
    }
}

impl Storage for ErrStore {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, KvError> {
        Err(Self::fail())
    }

    fn set(&self, _key: &str, _value: &[u8]) -> Result<(), KvError> {
        Err(Self::fail())
    }

    fn delete(&self, _key: &str) -> Result<bool, KvError> {
        Err(Self::fail())
    }

    fn reset_connection(&self, _key: &str) -> Result<(), KvError> {
        Err(Self::fail())
    }
}

/// The /dev/null of backends: accepts everything, remembers nothing.
pub struct Discard;

impl Storage for Discard {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, KvError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &[u8]) -> Result<(), KvError> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> Result<bool, KvError> {
        Ok(false)
    }

    fn reset_connection(&self, _key: &str) -> Result<(), KvError> {
        Ok(())
    }
}

/// Delays every operation of an inner backend; for exercising hedged reads.
pub struct SlowStore<S> {
    inner: S,
    latency: Duration,
}

impl<S: Storage> SlowStore<S> {
    pub fn new(inner: S, latency: Duration) -> Self {
        SlowStore { inner, latency }
    }
}

impl<S: Storage> Storage for SlowStore<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        std::thread::sleep(self.latency);
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
        std::thread::sleep(self.latency);
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool, KvError> {
        std::thread::sleep(self.latency);
        self.inner.delete(key)
    }

    fn reset_connection(&self, key: &str) -> Result<(), KvError> {
        self.inner.reset_connection(key)
    }
}
