//! In-memory [`KvStore`] backed by `Arc<Mutex<HashMap>>`.
//!
//! Suitable for tests and local development. Nothing survives a restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::KvError;
use crate::record::validate_key;
use crate::store::KvStore;

/// Thread-safe in-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }
}

impl KvStore for MemoryStore {
    async fn save(&self, key: &str, value: &str) -> Result<(), KvError> {
        validate_key(key)?;
        self.inner
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>, KvError> {
        validate_key(key)?;
        Ok(self.inner.lock().unwrap().get(key).cloned())
    }
}
