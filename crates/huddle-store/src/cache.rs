//! Offline cache of the last remote message snapshot.
//!
//! The whole ordered message list is serialized as one JSON array under
//! [`MESSAGE_CACHE_KEY`]. Every write replaces the previous snapshot; there
//! are no partial updates.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use huddle_shared::constants::MESSAGE_CACHE_KEY;
use huddle_shared::Message;

use crate::error::Result;
use crate::kv::KeyValueStore;

pub struct MessageCache<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> MessageCache<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, MESSAGE_CACHE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Read the cached snapshot. `Ok(None)` when nothing was cached yet.
    pub fn try_load(&self) -> Result<Option<Vec<Message>>> {
        match self.store.get(&self.key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Replace the cached snapshot with `messages`, preserving their order.
    pub fn try_store(&mut self, messages: &[Message]) -> Result<()> {
        let raw = serde_json::to_string(messages)?;
        self.store.set(&self.key, &raw)
    }

    /// Read the cached snapshot, degrading to an empty list on absence or
    /// failure.
    pub fn load(&self) -> Vec<Message> {
        match self.try_load() {
            Ok(Some(messages)) => {
                debug!(count = messages.len(), "loaded cached messages");
                messages
            }
            Ok(None) => {
                debug!("no cached messages yet");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "failed to read message cache");
                Vec::new()
            }
        }
    }

    /// Best-effort write. Returns whether the snapshot was persisted.
    pub fn store(&mut self, messages: &[Message]) -> bool {
        match self.try_store(messages) {
            Ok(()) => {
                debug!(count = messages.len(), "cached message snapshot");
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to write message cache");
                false
            }
        }
    }

    /// When the snapshot was last written, if ever.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.store.updated_at(&self.key).unwrap_or_else(|e| {
            warn!(error = %e, "failed to read cache timestamp");
            None
        })
    }
}
