//! Filesystem backend: one file per key under a root directory.
//!
//! Intended for tests and single-machine setups; keys are used as file names
//! verbatim, so callers are responsible for keeping them path-safe.

use crate::error::KvError;
use crate::storage::Storage;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct Fs {
    dir: PathBuf,
}

impl Fs {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Fs { dir: dir.into() }
    }
}

impl Storage for Fs {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        match std::fs::read(self.dir.join(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
        std::fs::write(self.dir.join(key), value)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, KvError> {
        match std::fs::remove_file(self.dir.join(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn reset_connection(&self, _key: &str) -> Result<(), KvError> {
        Ok(())
    }
}
