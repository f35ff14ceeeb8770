mod common;

use std::sync::Arc;

use huddle_client::{
    spawn_session, MemoryRemote, SessionConfig, SessionHandle, SyncError, SyncState,
};
use huddle_net::ConnectivityMonitor;
use huddle_shared::constants::MESSAGES_COLLECTION;
use huddle_shared::{BackgroundColor, MessageDraft, SessionParams, UserId};
use huddle_store::{Database, KeyValueStore, MemoryStore, MessageCache};

use common::*;

fn params() -> SessionParams {
    SessionParams::new("Ada", BackgroundColor::Purple, Some(UserId::from("ada"))).unwrap()
}

fn start<S: KeyValueStore>(
    monitor: &ConnectivityMonitor,
    remote: Arc<dyn huddle_client::RemoteStore>,
    store: S,
) -> SessionHandle {
    spawn_session(
        params(),
        remote,
        MessageCache::new(store),
        monitor.subscribe(),
        SessionConfig::default(),
    )
}

#[tokio::test]
async fn online_offline_online_scenario() {
    let monitor = ConnectivityMonitor::new();
    let remote = MemoryRemote::new();
    let store = MemoryStore::new();
    let reader = MessageCache::new(store.clone());

    let m1 = message("1", "hi", 1);
    remote.insert(MESSAGES_COLLECTION, m1.clone()).unwrap();

    monitor.on_connectivity_change(true);
    let session = start(&monitor, Arc::new(remote.clone()), store);
    let mut views = session.watch();

    // Online: the remote snapshot is shown and cached.
    let view = wait_for(&mut views, |v| {
        v.state == SyncState::Subscribed && v.messages.len() == 1
    })
    .await;
    assert_eq!(ids(&view.messages), vec!["1"]);
    assert!(view.composer_visible);
    assert_eq!(reader.load(), vec![m1.clone()]);
    assert_eq!(remote.listener_count(), 1);

    // Offline: served from cache, composer hidden, listener released.
    monitor.on_connectivity_change(false);
    let view = wait_for(&mut views, |v| v.state == SyncState::CacheOnly).await;
    assert_eq!(ids(&view.messages), vec!["1"]);
    assert!(!view.composer_visible);
    assert!(view.cached_at.is_some());
    assert_eq!(remote.listener_count(), 0);

    // Someone else wrote while we were away.
    let m2 = message("2", "welcome back", 2);
    remote.insert(MESSAGES_COLLECTION, m2.clone()).unwrap();

    // Online again: both messages, newest first, cache overwritten.
    monitor.on_connectivity_change(true);
    let view = wait_for(&mut views, |v| {
        v.state == SyncState::Subscribed && v.messages.len() == 2
    })
    .await;
    assert_eq!(ids(&view.messages), vec!["2", "1"]);
    assert!(view.composer_visible);
    assert_eq!(reader.load(), vec![m2, m1]);
    assert_eq!(remote.listener_count(), 1);

    session.close().await;
    assert_eq!(remote.listener_count(), 0);
}

#[tokio::test]
async fn at_most_one_subscription_across_flapping() {
    let monitor = ConnectivityMonitor::new();
    let remote = ScriptedRemote::new();
    monitor.on_connectivity_change(true);
    let session = start(&monitor, Arc::new(remote.clone()), MemoryStore::new());
    let mut views = session.watch();

    wait_for(&mut views, |v| v.state == SyncState::Subscribed).await;
    for _ in 0..3 {
        monitor.on_connectivity_change(false);
        wait_for(&mut views, |v| v.state == SyncState::CacheOnly).await;
        assert_eq!(remote.live_count(), 0);

        monitor.on_connectivity_change(true);
        wait_for(&mut views, |v| v.state == SyncState::Subscribed).await;
        assert_eq!(remote.live_count(), 1);
    }

    session.close().await;

    // Each subscription was released exactly once.
    let mut released = remote.unsubscribes();
    assert_eq!(released.len(), remote.subscribe_count());
    released.dedup();
    assert_eq!(released.len(), remote.subscribe_count());
}

#[tokio::test]
async fn stale_deliveries_are_discarded() {
    let monitor = ConnectivityMonitor::new();
    let remote = ScriptedRemote::new();
    let store = RecordingStore::new();
    monitor.on_connectivity_change(true);
    let session = start(&monitor, Arc::new(remote.clone()), store.clone());
    let mut views = session.watch();

    wait_for(&mut views, |v| v.state == SyncState::Subscribed).await;
    monitor.on_connectivity_change(false);
    wait_for(&mut views, |v| v.state == SyncState::CacheOnly).await;
    monitor.on_connectivity_change(true);
    wait_for(&mut views, |v| v.state == SyncState::Subscribed).await;
    assert_eq!(remote.subscribe_count(), 2);

    // The first subscription is closed; its late snapshot must not land.
    remote.sink(0).deliver(vec![message("stale", "old news", 1)]);
    remote.sink(1).deliver(vec![message("fresh", "current", 2)]);

    let view = wait_for(&mut views, |v| !v.messages.is_empty()).await;
    assert_eq!(ids(&view.messages), vec!["fresh"]);
    assert!(store.writes().iter().all(|w| !w.contains("stale")));
    assert_eq!(store.writes().len(), 1);

    session.close().await;
}

#[tokio::test]
async fn offline_mount_with_empty_cache_shows_nothing() {
    let monitor = ConnectivityMonitor::new();
    monitor.on_connectivity_change(false);
    let remote = ScriptedRemote::new();
    let session = start(&monitor, Arc::new(remote.clone()), MemoryStore::new());
    let mut views = session.watch();

    let view = wait_for(&mut views, |v| v.state == SyncState::CacheOnly).await;
    assert!(view.messages.is_empty());
    assert!(!view.composer_visible);
    assert!(view.cached_at.is_none());
    assert_eq!(remote.subscribe_count(), 0);

    session.close().await;
}

#[tokio::test]
async fn unknown_connectivity_serves_cache() {
    let monitor = ConnectivityMonitor::new();
    let store = MemoryStore::new();
    MessageCache::new(store.clone()).store(&[message("1", "cached", 1)]);

    let remote = ScriptedRemote::new();
    let session = start(&monitor, Arc::new(remote.clone()), store);
    let mut views = session.watch();

    let view = wait_for(&mut views, |v| v.state == SyncState::CacheOnly).await;
    assert_eq!(ids(&view.messages), vec!["1"]);
    assert_eq!(remote.subscribe_count(), 0);

    session.close().await;
}

#[tokio::test]
async fn broken_cache_degrades_to_empty_list() {
    let monitor = ConnectivityMonitor::new();
    monitor.on_connectivity_change(true);
    let remote = ScriptedRemote::new();
    let session = start(&monitor, Arc::new(remote.clone()), RecordingStore::broken());
    let mut views = session.watch();

    wait_for(&mut views, |v| v.state == SyncState::Subscribed).await;
    remote.sink(0).deliver(vec![message("1", "hi", 1)]);
    let view = wait_for(&mut views, |v| v.messages.len() == 1).await;
    assert!(view.composer_visible);

    monitor.on_connectivity_change(false);
    let view = wait_for(&mut views, |v| v.state == SyncState::CacheOnly).await;
    assert!(view.messages.is_empty());

    session.close().await;
}

#[tokio::test]
async fn send_appends_once_without_optimistic_insert() {
    let monitor = ConnectivityMonitor::new();
    monitor.on_connectivity_change(true);
    let remote = ScriptedRemote::new();
    let session = start(&monitor, Arc::new(remote.clone()), MemoryStore::new());
    let mut views = session.watch();

    wait_for(&mut views, |v| v.state == SyncState::Subscribed).await;
    session.send_text("hello").await.unwrap();

    let appended = remote.appended();
    assert_eq!(appended.len(), 1);
    assert_eq!(appended[0].text, "hello");
    assert_eq!(appended[0].user.id, UserId::from("ada"));
    assert!(session.view().messages.is_empty());

    session.close().await;
}

#[tokio::test]
async fn sent_message_arrives_through_snapshot() {
    let monitor = ConnectivityMonitor::new();
    monitor.on_connectivity_change(true);
    let remote = MemoryRemote::new();
    let session = start(&monitor, Arc::new(remote.clone()), MemoryStore::new());
    let mut views = session.watch();

    wait_for(&mut views, |v| v.state == SyncState::Subscribed).await;
    let id = session.send_text("round trip").await.unwrap();

    let view = wait_for(&mut views, |v| v.messages.iter().any(|m| m.id == id)).await;
    assert_eq!(view.messages[0].text, "round trip");
    assert_eq!(remote.append_count(), 1);

    session.close().await;
}

#[tokio::test]
async fn send_is_rejected_while_offline() {
    let monitor = ConnectivityMonitor::new();
    monitor.on_connectivity_change(false);
    let remote = ScriptedRemote::new();
    let session = start(&monitor, Arc::new(remote.clone()), MemoryStore::new());
    let mut views = session.watch();

    wait_for(&mut views, |v| v.state == SyncState::CacheOnly).await;
    assert_eq!(session.send_text("anyone?").await, Err(SyncError::ComposerHidden));
    assert!(remote.appended().is_empty());

    session.close().await;
}

#[tokio::test]
async fn empty_drafts_are_rejected() {
    let monitor = ConnectivityMonitor::new();
    monitor.on_connectivity_change(true);
    let remote = ScriptedRemote::new();
    let session = start(&monitor, Arc::new(remote.clone()), MemoryStore::new());
    let mut views = session.watch();

    wait_for(&mut views, |v| v.state == SyncState::Subscribed).await;
    let draft = MessageDraft::text(session.user().clone(), "   ");
    assert_eq!(session.send(draft).await, Err(SyncError::EmptyMessage));
    assert!(remote.appended().is_empty());

    session.close().await;
}

#[tokio::test]
async fn write_failure_is_reported_to_sender() {
    let monitor = ConnectivityMonitor::new();
    monitor.on_connectivity_change(true);
    let remote = MemoryRemote::new();
    let session = start(&monitor, Arc::new(remote.clone()), MemoryStore::new());
    let mut views = session.watch();

    wait_for(&mut views, |v| v.state == SyncState::Subscribed).await;
    huddle_client::RemoteStore::set_network_enabled(&remote, false);

    let result = session.send_text("lost").await;
    assert_eq!(
        result,
        Err(SyncError::Remote(huddle_client::RemoteError::NetworkDisabled))
    );
    assert!(session.view().messages.is_empty());

    session.close().await;
}

#[tokio::test]
async fn subscription_error_keeps_last_messages() {
    let monitor = ConnectivityMonitor::new();
    monitor.on_connectivity_change(true);
    let remote = ScriptedRemote::new();
    let store = RecordingStore::new();
    let session = start(&monitor, Arc::new(remote.clone()), store.clone());
    let mut views = session.watch();

    wait_for(&mut views, |v| v.state == SyncState::Subscribed).await;
    remote.sink(0).deliver(vec![message("1", "hi", 1)]);
    wait_for(&mut views, |v| v.messages.len() == 1).await;
    assert_eq!(store.writes().len(), 1);

    // Deliveries are handled in order, so once the snapshot after the error
    // has been cached the error has been handled too.
    remote.sink(0).fail("permission denied");
    remote.sink(0).deliver(vec![message("1", "hi", 1)]);
    eventually(|| store.writes().len() == 2).await;

    let view = session.view();
    assert_eq!(ids(&view.messages), vec!["1"]);
    assert_eq!(view.state, SyncState::Subscribed);
    assert!(view.composer_visible);
    // Not retried: no new subscription and the failed one is still held.
    assert_eq!(remote.subscribe_count(), 1);
    assert!(remote.unsubscribes().is_empty());

    session.close().await;
}

#[tokio::test]
async fn failed_listener_is_replaced_on_reconnect() {
    let monitor = ConnectivityMonitor::new();
    monitor.on_connectivity_change(true);
    let remote = MemoryRemote::new();
    remote.insert(MESSAGES_COLLECTION, message("1", "hi", 1)).unwrap();
    let session = start(&monitor, Arc::new(remote.clone()), MemoryStore::new());
    let mut views = session.watch();

    wait_for(&mut views, |v| v.messages.len() == 1).await;
    remote.fail_listeners(MESSAGES_COLLECTION, "permission denied");
    remote.insert(MESSAGES_COLLECTION, message("2", "later", 2)).unwrap();

    monitor.on_connectivity_change(false);
    let view = wait_for(&mut views, |v| v.state == SyncState::CacheOnly).await;
    assert_eq!(ids(&view.messages), vec!["1"]);

    monitor.on_connectivity_change(true);
    let view = wait_for(&mut views, |v| {
        v.state == SyncState::Subscribed && v.messages.len() == 2
    })
    .await;
    assert_eq!(ids(&view.messages), vec!["2", "1"]);
    assert_eq!(remote.listener_count(), 1);

    session.close().await;
}

#[tokio::test]
async fn close_releases_subscription_and_publishes_teardown() {
    let monitor = ConnectivityMonitor::new();
    monitor.on_connectivity_change(true);
    let remote = MemoryRemote::new();
    let session = start(&monitor, Arc::new(remote.clone()), MemoryStore::new());
    let mut views = session.watch();

    wait_for(&mut views, |v| v.state == SyncState::Subscribed).await;
    assert_eq!(remote.listener_count(), 1);

    session.close().await;
    assert_eq!(remote.listener_count(), 0);
    assert_eq!(views.borrow().state, SyncState::TornDown);
}

#[tokio::test]
async fn dropping_the_handle_ends_the_session() {
    let monitor = ConnectivityMonitor::new();
    monitor.on_connectivity_change(true);
    let remote = MemoryRemote::new();
    let session = start(&monitor, Arc::new(remote.clone()), MemoryStore::new());
    let mut views = session.watch();

    wait_for(&mut views, |v| v.state == SyncState::Subscribed).await;
    drop(session);

    eventually(|| remote.listener_count() == 0).await;
}

#[tokio::test]
async fn snapshot_survives_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huddle.db");

    let monitor = ConnectivityMonitor::new();
    monitor.on_connectivity_change(true);
    let remote = MemoryRemote::new();
    for i in 1..=3 {
        remote
            .insert(MESSAGES_COLLECTION, message(&i.to_string(), "msg", i))
            .unwrap();
    }

    let session = start(&monitor, Arc::new(remote.clone()), Database::open_at(&path).unwrap());
    let mut views = session.watch();
    let online = wait_for(&mut views, |v| v.messages.len() == 3).await;
    session.close().await;

    // A fresh process, offline from the start.
    let offline_monitor = ConnectivityMonitor::new();
    offline_monitor.on_connectivity_change(false);
    let session = start(
        &offline_monitor,
        Arc::new(ScriptedRemote::new()),
        Database::open_at(&path).unwrap(),
    );
    let mut views = session.watch();
    let offline = wait_for(&mut views, |v| v.state == SyncState::CacheOnly).await;

    assert_eq!(offline.messages, online.messages);
    assert_eq!(ids(&offline.messages), vec!["3", "2", "1"]);
    session.close().await;
}
