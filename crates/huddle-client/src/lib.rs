//! Message synchronisation for a Huddle chat session.
//!
//! A [`session::ChatSession`] mirrors a remote, ordered message collection
//! into a published [`view::ChatView`] and the local cache while online, and
//! serves the cached snapshot while offline. The [`bridge`] feeds platform
//! reachability into the shared connectivity signal.

pub mod bridge;
pub mod error;
pub mod events;
pub mod remote;
pub mod session;
pub mod view;

pub use bridge::spawn_connectivity_bridge;
pub use error::{RemoteError, SyncError};
pub use events::Notice;
pub use remote::memory::MemoryRemote;
pub use remote::{OrderBy, RemoteStore, SnapshotEvent, SnapshotSink, Subscription, SubscriptionId};
pub use session::{spawn_session, SessionConfig, SessionHandle};
pub use view::{ChatView, SyncState};
