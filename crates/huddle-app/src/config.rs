//! Front-end configuration loaded from environment variables.
//!
//! All settings have defaults so the client starts with zero configuration.

use std::path::PathBuf;
use std::time::Duration;

use huddle_net::ProbeConfig;
use huddle_shared::constants::MESSAGES_COLLECTION;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite file holding the offline message cache.
    /// Env: `HUDDLE_DB_PATH`
    /// Default: the platform data directory (`huddle.db`).
    pub db_path: Option<PathBuf>,

    /// Reachability probe target and timing.
    /// Env: `HUDDLE_PROBE_ADDR`, `HUDDLE_PROBE_INTERVAL_SECS`,
    /// `HUDDLE_PROBE_TIMEOUT_MS`
    pub probe: ProbeConfig,

    /// Skip the probe and drive connectivity with `/offline` and `/online`.
    /// Env: `HUDDLE_MANUAL_CONNECTIVITY` (true/false)
    /// Default: `false`
    pub manual_connectivity: bool,

    /// Remote collection the chat mirrors.
    /// Env: `HUDDLE_COLLECTION`
    /// Default: `messages`
    pub collection: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            probe: ProbeConfig::default(),
            manual_connectivity: false,
            collection: MESSAGES_COLLECTION.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("HUDDLE_DB_PATH").filter(|p| !p.is_empty()) {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(addr) = lookup("HUDDLE_PROBE_ADDR").filter(|a| !a.is_empty()) {
            config.probe.addr = addr;
        }

        if let Some(val) = lookup("HUDDLE_PROBE_INTERVAL_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => config.probe.interval = Duration::from_secs(secs),
                _ => tracing::warn!(
                    value = %val,
                    "Invalid HUDDLE_PROBE_INTERVAL_SECS, using default"
                ),
            }
        }

        if let Some(val) = lookup("HUDDLE_PROBE_TIMEOUT_MS") {
            match val.parse::<u64>() {
                Ok(ms) if ms > 0 => config.probe.timeout = Duration::from_millis(ms),
                _ => tracing::warn!(value = %val, "Invalid HUDDLE_PROBE_TIMEOUT_MS, using default"),
            }
        }

        if let Some(val) = lookup("HUDDLE_MANUAL_CONNECTIVITY") {
            config.manual_connectivity = val != "false" && val != "0";
        }

        if let Some(name) = lookup("HUDDLE_COLLECTION").filter(|n| !n.is_empty()) {
            config.collection = name;
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}
