//! In-memory backend, the reference implementation of the storage contract.

use crate::error::KvError;
use crate::storage::Storage;
use parking_lot::Mutex;
use std::collections::HashMap;

pub struct Memory {
    map: Mutex<HashMap<String, Vec<u8>>>,
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            map: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.map.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.lock().is_empty()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for Memory {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        Ok(self.map.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
        self.map.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, KvError> {
        Ok(self.map.lock().remove(key).is_some())
    }

    fn reset_connection(&self, _key: &str) -> Result<(), KvError> {
        Ok(())
    }
}
