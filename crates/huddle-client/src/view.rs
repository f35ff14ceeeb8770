use chrono::{DateTime, Utc};
use serde::Serialize;

use huddle_net::Connectivity;
use huddle_shared::Message;

/// Where a chat session currently takes its messages from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncState {
    Uninitialized,
    Subscribed,
    CacheOnly,
    TornDown,
}

/// Everything a front-end needs to render the chat screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    /// Screen header, the user's display name.
    pub title: String,
    pub state: SyncState,
    pub connectivity: Connectivity,
    /// Messages in stored order, newest first.
    pub messages: Vec<Message>,
    pub composer_visible: bool,
    /// When the snapshot being shown offline was cached.
    pub cached_at: Option<DateTime<Utc>>,
}

impl ChatView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            state: SyncState::Uninitialized,
            connectivity: Connectivity::Unknown,
            messages: Vec::new(),
            composer_visible: false,
            cached_at: None,
        }
    }

    /// Messages oldest first, newest at the bottom of the screen.
    pub fn display_order(&self) -> Vec<&Message> {
        let mut ordered: Vec<&Message> = self.messages.iter().collect();
        ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        ordered
    }
}
