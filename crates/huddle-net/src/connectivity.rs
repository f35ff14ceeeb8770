//! Process-wide connectivity signal.
//!
//! The monitor owns a [`tokio::sync::watch`] channel carrying the current
//! [`Connectivity`]. Chat sessions and the composer subscribe to it and react
//! the next time they are scheduled.

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

/// Tri-state reachability. `Unknown` until the first platform report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    #[default]
    Unknown,
    Online,
    Offline,
}

impl Connectivity {
    pub fn is_online(self) -> bool {
        self == Connectivity::Online
    }

    pub fn from_reachable(is_connected: bool) -> Self {
        if is_connected {
            Connectivity::Online
        } else {
            Connectivity::Offline
        }
    }
}

/// Result of feeding a reachability report into the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WentOnline,
    WentOffline,
    Unchanged,
}

pub struct ConnectivityMonitor {
    tx: watch::Sender<Connectivity>,
}

impl ConnectivityMonitor {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Connectivity::Unknown);
        Self { tx }
    }

    /// Record a reachability report from the platform.
    pub fn on_connectivity_change(&self, is_connected: bool) -> Transition {
        let next = Connectivity::from_reachable(is_connected);
        let mut prev = next;
        self.tx.send_if_modified(|current| {
            prev = std::mem::replace(current, next);
            prev != next
        });

        let transition = match (prev, next) {
            (a, b) if a == b => Transition::Unchanged,
            (_, Connectivity::Online) => Transition::WentOnline,
            (_, Connectivity::Offline) => Transition::WentOffline,
            (_, Connectivity::Unknown) => Transition::Unchanged,
        };

        match transition {
            Transition::Unchanged => debug!(state = ?next, "connectivity unchanged"),
            _ => info!(from = ?prev, to = ?next, "connectivity changed"),
        }

        transition
    }

    pub fn current(&self) -> Connectivity {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unknown() {
        let monitor = ConnectivityMonitor::new();
        assert_eq!(monitor.current(), Connectivity::Unknown);
        assert!(!monitor.current().is_online());
    }

    #[test]
    fn reports_transitions_once() {
        let monitor = ConnectivityMonitor::new();

        assert_eq!(monitor.on_connectivity_change(true), Transition::WentOnline);
        assert_eq!(monitor.on_connectivity_change(true), Transition::Unchanged);
        assert_eq!(monitor.on_connectivity_change(false), Transition::WentOffline);
        assert_eq!(monitor.on_connectivity_change(false), Transition::Unchanged);
        assert_eq!(monitor.current(), Connectivity::Offline);
    }

    #[test]
    fn unknown_to_offline_is_a_transition() {
        let monitor = ConnectivityMonitor::new();
        assert_eq!(monitor.on_connectivity_change(false), Transition::WentOffline);
    }

    #[tokio::test]
    async fn subscribers_observe_changes() {
        let monitor = ConnectivityMonitor::new();
        let mut rx = monitor.subscribe();

        monitor.on_connectivity_change(true);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Connectivity::Online);
    }

    #[test]
    fn repeated_report_does_not_wake_subscribers() {
        let monitor = ConnectivityMonitor::new();
        let mut rx = monitor.subscribe();

        monitor.on_connectivity_change(true);
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        monitor.on_connectivity_change(true);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(monitor.current(), Connectivity::Online);
    }
}
