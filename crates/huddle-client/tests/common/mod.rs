#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use futures::future::{self, BoxFuture, FutureExt};
use tokio::sync::watch;

use huddle_client::{
    ChatView, OrderBy, RemoteError, RemoteStore, SnapshotSink, Subscription, SubscriptionId,
};
use huddle_shared::{ChatUser, Message, MessageDraft, MessageId, UserId};
use huddle_store::{KeyValueStore, StoreError};

pub const WAIT: Duration = Duration::from_secs(2);

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn message(id: &str, text: &str, secs: i64) -> Message {
    let draft = MessageDraft {
        created_at: at(secs),
        ..MessageDraft::text(ChatUser::new(UserId::from("other"), "Bob"), text)
    };
    Message::from_draft(MessageId::from(id), draft)
}

pub fn ids(messages: &[Message]) -> Vec<&str> {
    messages.iter().map(|m| m.id.as_str()).collect()
}

/// Wait until the published view satisfies `pred`.
pub async fn wait_for(
    rx: &mut watch::Receiver<ChatView>,
    pred: impl Fn(&ChatView) -> bool,
) -> ChatView {
    let view = tokio::time::timeout(WAIT, rx.wait_for(|v| pred(v)))
        .await
        .expect("timed out waiting for view")
        .expect("session dropped its view");
    view.clone()
}

/// Poll `cond` until it holds or the wait budget runs out.
pub async fn eventually(cond: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !cond() {
        assert!(tokio::time::Instant::now() < deadline, "condition never held");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

// ---------------------------------------------------------------------------
// Scripted remote
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Script {
    sinks: Vec<SnapshotSink>,
    unsubscribes: Vec<SubscriptionId>,
    appended: Vec<MessageDraft>,
    network_toggles: Vec<bool>,
}

/// Remote that records every call and only delivers what the test pushes.
/// Sinks are kept after unsubscribe so tests can fire stale deliveries.
#[derive(Clone, Default)]
pub struct ScriptedRemote {
    script: Arc<Mutex<Script>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self, index: usize) -> SnapshotSink {
        self.script.lock().unwrap().sinks[index].clone()
    }

    pub fn subscribe_count(&self) -> usize {
        self.script.lock().unwrap().sinks.len()
    }

    pub fn unsubscribes(&self) -> Vec<SubscriptionId> {
        self.script.lock().unwrap().unsubscribes.clone()
    }

    /// Subscriptions opened and not yet released.
    pub fn live_count(&self) -> usize {
        let script = self.script.lock().unwrap();
        script.sinks.len() - script.unsubscribes.len()
    }

    pub fn appended(&self) -> Vec<MessageDraft> {
        self.script.lock().unwrap().appended.clone()
    }
}

impl RemoteStore for ScriptedRemote {
    fn subscribe(
        &self,
        _collection: &str,
        _order: OrderBy,
        sink: SnapshotSink,
    ) -> Result<Subscription, RemoteError> {
        let id = sink.id();
        self.script.lock().unwrap().sinks.push(sink);
        let script = self.script.clone();
        Ok(Subscription::new(id, move || {
            script.lock().unwrap().unsubscribes.push(id);
        }))
    }

    fn append(
        &self,
        _collection: &str,
        draft: MessageDraft,
    ) -> BoxFuture<'static, Result<MessageId, RemoteError>> {
        self.script.lock().unwrap().appended.push(draft);
        future::ready(Ok(MessageId::generate())).boxed()
    }

    fn set_network_enabled(&self, enabled: bool) {
        self.script.lock().unwrap().network_toggles.push(enabled);
    }
}

// ---------------------------------------------------------------------------
// Recording key/value store
// ---------------------------------------------------------------------------

/// Key/value store that keeps every write, or fails every call.
#[derive(Clone, Default)]
pub struct RecordingStore {
    writes: Arc<Mutex<Vec<String>>>,
    broken: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl KeyValueStore for RecordingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        if self.broken {
            return Err(StoreError::Migration("unavailable".into()));
        }
        Ok(self.writes.lock().unwrap().last().cloned())
    }

    fn set(&mut self, _key: &str, value: &str) -> Result<(), StoreError> {
        if self.broken {
            return Err(StoreError::Migration("unavailable".into()));
        }
        self.writes.lock().unwrap().push(value.to_string());
        Ok(())
    }

    fn updated_at(&self, _key: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(None)
    }
}
