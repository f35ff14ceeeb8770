//! In-process remote store.
//!
//! Keeps collections in memory, assigns document ids on write and pushes a
//! fresh ordered snapshot to every listener of a collection after each
//! change. Clones share the same state, so several sessions in one process
//! see each other's messages.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use futures::future::{self, BoxFuture, FutureExt};
use tracing::{debug, info, warn};

use huddle_shared::{Message, MessageDraft, MessageId};

use crate::error::RemoteError;
use crate::remote::{OrderBy, RemoteStore, SnapshotSink, Subscription};

struct Listener {
    collection: String,
    order: OrderBy,
    sink: SnapshotSink,
}

struct Inner {
    collections: HashMap<String, Vec<Message>>,
    listeners: HashMap<u64, Listener>,
    next_listener: u64,
    network_enabled: bool,
    appends: usize,
}

impl Inner {
    fn snapshot(&self, collection: &str, order: &OrderBy) -> Vec<Message> {
        let mut docs = self.collections.get(collection).cloned().unwrap_or_default();
        order.apply(&mut docs);
        docs
    }

    /// Push the current contents of `collection` to its listeners, pruning
    /// listeners whose consumer went away.
    fn notify(&mut self, collection: &str) {
        let mut dead = Vec::new();
        for (key, listener) in &self.listeners {
            if listener.collection != collection {
                continue;
            }
            let docs = self.snapshot(collection, &listener.order);
            if !listener.sink.deliver(docs) {
                dead.push(*key);
            }
        }
        for key in dead {
            debug!(listener = key, "pruning closed listener");
            self.listeners.remove(&key);
        }
    }
}

#[derive(Clone)]
pub struct MemoryRemote {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                collections: HashMap::new(),
                listeners: HashMap::new(),
                next_listener: 0,
                network_enabled: true,
                appends: 0,
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, RemoteError> {
        self.inner.lock().map_err(|_| RemoteError::Poisoned)
    }

    /// Store a document that already has an id, as if written by another
    /// client. Listeners are notified.
    pub fn insert(&self, collection: &str, message: Message) -> Result<(), RemoteError> {
        let mut guard = self.lock()?;
        let docs = guard.collections.entry(collection.to_string()).or_default();
        docs.retain(|m| m.id != message.id);
        docs.push(message);
        guard.notify(collection);
        Ok(())
    }

    /// Current documents of `collection`, in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<Message> {
        self.lock()
            .map(|g| g.collections.get(collection).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Report a failure to every listener of `collection` and drop them.
    pub fn fail_listeners(&self, collection: &str, error: &str) {
        let Ok(mut guard) = self.lock() else { return };
        guard.listeners.retain(|key, listener| {
            if listener.collection != collection {
                return true;
            }
            warn!(listener = *key, error, "failing listener");
            listener.sink.fail(error);
            false
        });
    }

    /// Number of registered listeners across all collections.
    pub fn listener_count(&self) -> usize {
        self.lock().map(|g| g.listeners.len()).unwrap_or(0)
    }

    /// Number of accepted appends.
    pub fn append_count(&self) -> usize {
        self.lock().map(|g| g.appends).unwrap_or(0)
    }

    pub fn network_enabled(&self) -> bool {
        self.lock().map(|g| g.network_enabled).unwrap_or(false)
    }

    fn append_now(&self, collection: &str, draft: MessageDraft) -> Result<MessageId, RemoteError> {
        let mut guard = self.lock()?;
        if !guard.network_enabled {
            return Err(RemoteError::NetworkDisabled);
        }

        let id = MessageId::generate();
        let message = Message::from_draft(id.clone(), draft);
        guard
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(message);
        guard.appends += 1;
        guard.notify(collection);

        debug!(collection, id = %id, "document appended");
        Ok(id)
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore for MemoryRemote {
    fn subscribe(
        &self,
        collection: &str,
        order: OrderBy,
        sink: SnapshotSink,
    ) -> Result<Subscription, RemoteError> {
        let mut guard = self.lock()?;
        let key = guard.next_listener;
        guard.next_listener += 1;

        let subscription_id = sink.id();
        sink.deliver(guard.snapshot(collection, &order));
        guard.listeners.insert(
            key,
            Listener {
                collection: collection.to_string(),
                order,
                sink,
            },
        );

        debug!(collection, listener = key, subscription = %subscription_id, "listener registered");

        let weak: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        Ok(Subscription::new(subscription_id, move || {
            if let Some(inner) = weak.upgrade() {
                if let Ok(mut guard) = inner.lock() {
                    guard.listeners.remove(&key);
                }
            }
        }))
    }

    fn append(
        &self,
        collection: &str,
        draft: MessageDraft,
    ) -> BoxFuture<'static, Result<MessageId, RemoteError>> {
        future::ready(self.append_now(collection, draft)).boxed()
    }

    fn set_network_enabled(&self, enabled: bool) {
        if let Ok(mut guard) = self.lock() {
            if guard.network_enabled != enabled {
                info!(enabled, "remote network toggled");
            }
            guard.network_enabled = enabled;
        }
    }
}
