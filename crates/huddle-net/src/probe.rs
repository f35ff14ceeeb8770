//! TCP reachability probe.
//!
//! Periodically opens a TCP connection to a well-known address and reports
//! whether it succeeded. Only changes are reported; the first result is
//! always sent.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info};

use huddle_shared::constants::{
    DEFAULT_PROBE_ADDR, DEFAULT_PROBE_INTERVAL_SECS, DEFAULT_PROBE_TIMEOUT_MS,
};

/// Configuration for the reachability probe.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// `host:port` to connect to.
    pub addr: String,
    /// Delay between probes.
    pub interval: Duration,
    /// Per-attempt connect timeout.
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_PROBE_ADDR.to_string(),
            interval: Duration::from_secs(DEFAULT_PROBE_INTERVAL_SECS),
            timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
        }
    }
}

/// Try one connection.
pub async fn probe_once(addr: &str, limit: Duration) -> bool {
    match timeout(limit, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            debug!(addr, error = %e, "reachability probe failed");
            false
        }
        Err(_) => {
            debug!(addr, "reachability probe timed out");
            false
        }
    }
}

/// Spawn the probe loop in a background tokio task.
///
/// The task ends when the receiver is dropped.
pub fn spawn_probe(config: ProbeConfig) -> (mpsc::Receiver<bool>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(8);

    let handle = tokio::spawn(async move {
        info!(addr = %config.addr, interval = ?config.interval, "reachability probe started");

        let mut ticker = interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last: Option<bool> = None;

        loop {
            ticker.tick().await;
            if tx.is_closed() {
                break;
            }
            let reachable = probe_once(&config.addr, config.timeout).await;
            if last == Some(reachable) {
                continue;
            }
            last = Some(reachable);
            if tx.send(reachable).await.is_err() {
                break;
            }
        }

        debug!("reachability probe stopped");
    });

    (rx, handle)
}
