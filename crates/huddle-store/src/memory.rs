use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::kv::KeyValueStore;

type Entries = HashMap<String, (String, DateTime<Utc>)>;

/// Volatile key/value store. Nothing survives the process.
///
/// Clones share the same entries, so a caller can keep a handle to inspect
/// what a cache owner wrote.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<Mutex<Entries>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        // A panic while holding the guard cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).map(|(v, _)| v.clone()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries()
            .insert(key.to_string(), (value.to_string(), Utc::now()));
        Ok(())
    }

    fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.entries().get(key).map(|(_, at)| *at))
    }
}
