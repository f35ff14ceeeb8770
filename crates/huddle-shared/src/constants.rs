/// Application name
pub const APP_NAME: &str = "Huddle";

/// Remote collection holding the chat log
pub const MESSAGES_COLLECTION: &str = "messages";

/// Key under which the last remote snapshot is cached locally
pub const MESSAGE_CACHE_KEY: &str = "messages";

/// Field the remote collection is ordered by
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Notice shown once when the device goes offline
pub const CONNECTION_LOST_NOTICE: &str = "Connection lost!";

/// Bubble colour for messages authored by other users
pub const REMOTE_BUBBLE_COLOR: &str = "#FFF";

/// Default reachability probe target (host:port)
pub const DEFAULT_PROBE_ADDR: &str = "1.1.1.1:443";

/// Default reachability probe interval in seconds
pub const DEFAULT_PROBE_INTERVAL_SECS: u64 = 5;

/// Default per-attempt probe timeout in milliseconds
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1500;
