//! Chat session actor.
//!
//! One task per open chat screen. It owns the message list, the single live
//! remote subscription and the cache, and reacts to three inputs: the
//! connectivity signal, snapshot deliveries and commands from the
//! [`SessionHandle`]. Every state change is published as a [`ChatView`].
//!
//! While online the session is `Subscribed`: each snapshot replaces the list,
//! is written to the cache and then published. While offline (or before the
//! first reachability report) it is `CacheOnly`: the cached snapshot is shown
//! and the composer is hidden. Any live subscription is released before a
//! connectivity change is acted upon, and again when the session ends.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use huddle_net::Connectivity;
use huddle_shared::constants::MESSAGES_COLLECTION;
use huddle_shared::{ChatUser, Message, MessageDraft, MessageId, SessionParams};
use huddle_store::{KeyValueStore, MessageCache};

use crate::error::{RemoteError, SyncError};
use crate::remote::{
    Delivery, OrderBy, RemoteStore, SnapshotEvent, SnapshotSink, Subscription, SubscriptionId,
};
use crate::view::{ChatView, SyncState};

/// Which collection a session mirrors and how it is ordered.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub collection: String,
    pub order: OrderBy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            collection: MESSAGES_COLLECTION.to_string(),
            order: OrderBy::newest_first(),
        }
    }
}

enum SessionCommand {
    Send {
        draft: MessageDraft,
        reply: oneshot::Sender<Result<MessageId, SyncError>>,
    },
    Close,
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Owner's end of a running chat session. Dropping it ends the session.
pub struct SessionHandle {
    user: ChatUser,
    cmd_tx: mpsc::Sender<SessionCommand>,
    view_rx: watch::Receiver<ChatView>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// The author attached to messages composed through [`Self::send_text`].
    pub fn user(&self) -> &ChatUser {
        &self.user
    }

    /// Latest published view.
    pub fn view(&self) -> ChatView {
        self.view_rx.borrow().clone()
    }

    /// A receiver that wakes on every published view.
    pub fn watch(&self) -> watch::Receiver<ChatView> {
        self.view_rx.clone()
    }

    /// Append a message to the remote collection.
    ///
    /// Only accepted while the composer is visible. The message is not
    /// inserted locally; it shows up with the next remote snapshot.
    pub async fn send(&self, draft: MessageDraft) -> Result<MessageId, SyncError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(SessionCommand::Send { draft, reply })
            .await
            .map_err(|_| SyncError::SessionClosed)?;
        rx.await.map_err(|_| SyncError::SessionClosed)?
    }

    pub async fn send_text(&self, text: impl Into<String>) -> Result<MessageId, SyncError> {
        self.send(MessageDraft::text(self.user.clone(), text)).await
    }

    /// End the session and wait until its subscription is released.
    pub async fn close(self) {
        let _ = self.cmd_tx.send(SessionCommand::Close).await;
        if let Err(e) = self.task.await {
            warn!(error = %e, "chat session task failed");
        }
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// Start a chat session for `params`.
///
/// The session inspects `connectivity` immediately and then follows every
/// change until the returned handle is closed or dropped.
pub fn spawn_session<S: KeyValueStore>(
    params: SessionParams,
    remote: Arc<dyn RemoteStore>,
    cache: MessageCache<S>,
    connectivity: watch::Receiver<Connectivity>,
    config: SessionConfig,
) -> SessionHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (delivery_tx, delivery_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(ChatView::new(params.name.clone()));
    let user = params.chat_user();

    let session = ChatSession {
        params,
        remote,
        cache: Arc::new(Mutex::new(cache)),
        config,
        connectivity,
        connectivity_open: true,
        cmd_rx,
        delivery_tx,
        delivery_rx,
        view_tx,
        state: SyncState::Uninitialized,
        current: Connectivity::Unknown,
        messages: Vec::new(),
        cached_at: None,
        live: None,
        next_subscription: 0,
    };

    let task = tokio::spawn(session.run());

    SessionHandle {
        user,
        cmd_tx,
        view_rx,
        task,
    }
}

struct ChatSession<S> {
    params: SessionParams,
    remote: Arc<dyn RemoteStore>,
    cache: Arc<Mutex<MessageCache<S>>>,
    config: SessionConfig,

    connectivity: watch::Receiver<Connectivity>,
    connectivity_open: bool,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    delivery_tx: mpsc::UnboundedSender<Delivery>,
    delivery_rx: mpsc::UnboundedReceiver<Delivery>,
    view_tx: watch::Sender<ChatView>,

    state: SyncState,
    current: Connectivity,
    messages: Vec<Message>,
    cached_at: Option<DateTime<Utc>>,
    live: Option<Subscription>,
    next_subscription: u64,
}

impl<S: KeyValueStore> ChatSession<S> {
    async fn run(mut self) {
        info!(user = %self.params.user_id.short(), name = %self.params.name, "chat session opened");

        let initial = *self.connectivity.borrow_and_update();
        self.apply_connectivity(initial).await;

        loop {
            tokio::select! {
                biased;

                cmd = self.cmd_rx.recv() => match cmd {
                    Some(SessionCommand::Send { draft, reply }) => self.handle_send(draft, reply),
                    Some(SessionCommand::Close) | None => break,
                },

                changed = self.connectivity.changed(), if self.connectivity_open => {
                    if changed.is_err() {
                        debug!("connectivity signal closed; keeping current state");
                        self.connectivity_open = false;
                        continue;
                    }
                    let next = *self.connectivity.borrow_and_update();
                    self.apply_connectivity(next).await;
                }

                Some(delivery) = self.delivery_rx.recv() => self.handle_delivery(delivery).await,
            }
        }

        self.teardown();
    }

    /// Release the live subscription, then pick the source for `connectivity`.
    async fn apply_connectivity(&mut self, connectivity: Connectivity) {
        self.release_subscription();
        self.current = connectivity;

        if connectivity.is_online() {
            match self.subscribe() {
                Ok(subscription) => {
                    info!(subscription = %subscription.id(), "subscribed to remote messages");
                    self.live = Some(subscription);
                    self.state = SyncState::Subscribed;
                    self.cached_at = None;
                    self.publish();
                    return;
                }
                Err(e) => {
                    // Not retried; show what the cache has until the next change.
                    warn!(error = %e, "remote subscription failed, falling back to cache");
                }
            }
        }

        self.state = SyncState::CacheOnly;
        let (messages, cached_at) = load_cache(self.cache.clone()).await;
        info!(count = messages.len(), ?connectivity, "serving cached messages");
        self.messages = messages;
        self.cached_at = cached_at;
        self.publish();
    }

    fn subscribe(&mut self) -> Result<Subscription, RemoteError> {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        let sink = SnapshotSink::new(id, self.delivery_tx.clone());
        self.remote
            .subscribe(&self.config.collection, self.config.order.clone(), sink)
    }

    fn release_subscription(&mut self) {
        if let Some(mut subscription) = self.live.take() {
            subscription.unsubscribe();
        }
    }

    fn live_id(&self) -> Option<SubscriptionId> {
        self.live.as_ref().map(Subscription::id)
    }

    async fn handle_delivery(&mut self, delivery: Delivery) {
        if self.live_id() != Some(delivery.subscription) {
            debug!(subscription = %delivery.subscription, "discarding stale delivery");
            return;
        }

        match delivery.event {
            SnapshotEvent::Snapshot(messages) => {
                debug!(
                    count = messages.len(),
                    subscription = %delivery.subscription,
                    "remote snapshot"
                );
                self.messages = messages;
                store_cache(self.cache.clone(), self.messages.clone()).await;
                self.publish();
            }
            SnapshotEvent::Error(error) => {
                warn!(
                    subscription = %delivery.subscription,
                    error = %error,
                    "remote subscription error"
                );
            }
        }
    }

    fn handle_send(
        &mut self,
        draft: MessageDraft,
        reply: oneshot::Sender<Result<MessageId, SyncError>>,
    ) {
        if self.state != SyncState::Subscribed {
            let _ = reply.send(Err(SyncError::ComposerHidden));
            return;
        }
        if draft.is_empty() {
            let _ = reply.send(Err(SyncError::EmptyMessage));
            return;
        }

        debug!(len = draft.text.len(), "appending message");
        let write = self.remote.append(&self.config.collection, draft);
        tokio::spawn(async move {
            let result = write.await.map_err(SyncError::from);
            if let Err(e) = &result {
                warn!(error = %e, "message write failed");
            }
            let _ = reply.send(result);
        });
    }

    fn publish(&self) {
        let view = ChatView {
            title: self.params.name.clone(),
            state: self.state,
            connectivity: self.current,
            messages: self.messages.clone(),
            composer_visible: self.state == SyncState::Subscribed,
            cached_at: self.cached_at,
        };
        self.view_tx.send_replace(view);
    }

    fn teardown(&mut self) {
        self.release_subscription();
        self.state = SyncState::TornDown;
        self.publish();
        info!("chat session closed");
    }
}

// Cache access runs on the blocking pool; failures degrade to an empty list
// or a skipped write.

async fn load_cache<S: KeyValueStore>(
    cache: Arc<Mutex<MessageCache<S>>>,
) -> (Vec<Message>, Option<DateTime<Utc>>) {
    let loaded = tokio::task::spawn_blocking(move || {
        let Ok(cache) = cache.lock() else {
            warn!("message cache lock poisoned");
            return (Vec::new(), None);
        };
        (cache.load(), cache.last_updated())
    })
    .await;

    loaded.unwrap_or_else(|e| {
        warn!(error = %e, "cache read task failed");
        (Vec::new(), None)
    })
}

async fn store_cache<S: KeyValueStore>(
    cache: Arc<Mutex<MessageCache<S>>>,
    messages: Vec<Message>,
) {
    let written = tokio::task::spawn_blocking(move || {
        let Ok(mut cache) = cache.lock() else {
            warn!("message cache lock poisoned");
            return false;
        };
        cache.store(&messages)
    })
    .await;

    if let Err(e) = written {
        warn!(error = %e, "cache write task failed");
    }
}
