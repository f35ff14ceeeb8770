//! Remote document store abstraction.
//!
//! A store hands out full, ordered snapshots of a collection to subscribers
//! and accepts fire-and-forget appends. Snapshots travel through a
//! [`SnapshotSink`] tagged with the [`SubscriptionId`] that requested them,
//! so a consumer can drop deliveries from subscriptions it already closed.

pub mod memory;

use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tracing::debug;

use huddle_shared::constants::CREATED_AT_FIELD;
use huddle_shared::{Message, MessageDraft, MessageId};

use crate::error::RemoteError;

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Ordering requested for a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    /// `createdAt` descending, the order chat snapshots are fetched in.
    pub fn newest_first() -> Self {
        Self {
            field: CREATED_AT_FIELD.to_string(),
            direction: Direction::Descending,
        }
    }

    /// Sort `messages` in place. Only `createdAt` is a known field; other
    /// fields keep insertion order.
    pub fn apply(&self, messages: &mut [Message]) {
        if self.field != CREATED_AT_FIELD {
            return;
        }
        match self.direction {
            Direction::Ascending => messages.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            Direction::Descending => messages.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
    }
}

impl Default for OrderBy {
    fn default() -> Self {
        Self::newest_first()
    }
}

// ---------------------------------------------------------------------------
// Snapshot delivery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotEvent {
    /// Complete ordered contents of the collection.
    Snapshot(Vec<Message>),
    /// The listener failed; no further snapshots will follow.
    Error(String),
}

/// A snapshot event tagged with the subscription that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub subscription: SubscriptionId,
    pub event: SnapshotEvent,
}

/// Where a store pushes snapshots for one subscription.
#[derive(Debug, Clone)]
pub struct SnapshotSink {
    id: SubscriptionId,
    tx: mpsc::UnboundedSender<Delivery>,
}

impl SnapshotSink {
    pub fn new(id: SubscriptionId, tx: mpsc::UnboundedSender<Delivery>) -> Self {
        Self { id, tx }
    }

    /// A sink paired with its own receiver.
    pub fn channel(id: SubscriptionId) -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(id, tx), rx)
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Push a full snapshot. Returns `false` once the consumer is gone.
    pub fn deliver(&self, messages: Vec<Message>) -> bool {
        self.send(SnapshotEvent::Snapshot(messages))
    }

    /// Report a listener failure. Returns `false` once the consumer is gone.
    pub fn fail(&self, error: impl Into<String>) -> bool {
        self.send(SnapshotEvent::Error(error.into()))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, event: SnapshotEvent) -> bool {
        self.tx
            .send(Delivery {
                subscription: self.id,
                event,
            })
            .is_ok()
    }
}

// ---------------------------------------------------------------------------
// Subscription handle
// ---------------------------------------------------------------------------

type Cancel = Box<dyn FnOnce() + Send + Sync>;

/// Live listener registration. Unsubscribing more than once is a no-op, and
/// dropping the handle unsubscribes.
pub struct Subscription {
    id: SubscriptionId,
    cancel: Option<Cancel>,
}

impl Subscription {
    pub fn new(id: SubscriptionId, cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// Release the listener. Returns `true` only for the call that actually
    /// released it.
    pub fn unsubscribe(&mut self) -> bool {
        match self.cancel.take() {
            Some(cancel) => {
                cancel();
                debug!(subscription = %self.id, "unsubscribed");
                true
            }
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// A hosted real-time document database, seen as an ordered message log.
pub trait RemoteStore: Send + Sync + 'static {
    /// Start listening to `collection`. The store pushes the current
    /// contents right away and again after every change.
    fn subscribe(
        &self,
        collection: &str,
        order: OrderBy,
        sink: SnapshotSink,
    ) -> Result<Subscription, RemoteError>;

    /// Append a new document. Resolves to the id the store assigned.
    fn append(
        &self,
        collection: &str,
        draft: MessageDraft,
    ) -> BoxFuture<'static, Result<MessageId, RemoteError>>;

    /// Disable or resume outbound network traffic.
    fn set_network_enabled(&self, enabled: bool);
}
