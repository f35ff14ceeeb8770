//! Connectivity bridge.
//!
//! Drains a platform reachability stream into the shared
//! [`ConnectivityMonitor`] and applies the process-wide side effects of a
//! transition: outbound remote writes are disabled while offline, and the
//! user gets one notice per loss of connection.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use huddle_net::{ConnectivityMonitor, Transition};

use crate::events::Notice;
use crate::remote::RemoteStore;

/// Spawn the bridge loop. It ends when the reachability stream closes.
pub fn spawn_connectivity_bridge(
    reachability: mpsc::Receiver<bool>,
    monitor: Arc<ConnectivityMonitor>,
    remote: Arc<dyn RemoteStore>,
    notices: mpsc::UnboundedSender<Notice>,
) -> JoinHandle<()> {
    tokio::spawn(run_connectivity_bridge(reachability, monitor, remote, notices))
}

pub async fn run_connectivity_bridge(
    mut reachability: mpsc::Receiver<bool>,
    monitor: Arc<ConnectivityMonitor>,
    remote: Arc<dyn RemoteStore>,
    notices: mpsc::UnboundedSender<Notice>,
) {
    let mut lost = false;

    info!("connectivity bridge started");

    while let Some(is_connected) = reachability.recv().await {
        // Writes must be enabled before sessions see Online and show the composer.
        if is_connected {
            remote.set_network_enabled(true);
        }

        match monitor.on_connectivity_change(is_connected) {
            Transition::WentOffline => {
                remote.set_network_enabled(false);
                lost = true;
                let _ = notices.send(Notice::ConnectionLost);
            }
            Transition::WentOnline => {
                if std::mem::take(&mut lost) {
                    let _ = notices.send(Notice::ConnectionRestored);
                }
            }
            Transition::Unchanged => {}
        }
    }

    debug!("reachability stream closed");
}
