//! Turns successive [`ChatView`]s into terminal lines.
//!
//! The session republishes the whole list on every change, so the transcript
//! remembers which messages it already printed and only emits new ones.

use std::collections::HashSet;

use huddle_client::{ChatView, SyncState};
use huddle_shared::constants::REMOTE_BUBBLE_COLOR;
use huddle_shared::{BackgroundColor, ChatUser, Message, MessageId};

pub struct Transcript {
    user: ChatUser,
    color: BackgroundColor,
    shown: HashSet<MessageId>,
    state: SyncState,
}

impl Transcript {
    pub fn new(user: ChatUser, color: BackgroundColor) -> Self {
        Self {
            user,
            color,
            shown: HashSet::new(),
            state: SyncState::Uninitialized,
        }
    }

    /// Header printed once when the chat screen opens.
    pub fn header(&self) -> String {
        format!(
            "== {} == (background {} {}, your bubbles {}, others {})",
            self.user.name,
            self.color,
            self.color.hex(),
            self.color.own_bubble_hex(),
            REMOTE_BUBBLE_COLOR
        )
    }

    /// Lines to print for `view`, given everything printed so far.
    pub fn update(&mut self, view: &ChatView) -> Vec<String> {
        let mut lines = Vec::new();

        if view.state != self.state {
            self.state = view.state;
            if let Some(line) = state_banner(view) {
                lines.push(line);
            }
        }

        for message in view.display_order() {
            if self.shown.insert(message.id.clone()) {
                lines.push(self.format_message(message));
            }
        }

        lines
    }

    fn format_message(&self, message: &Message) -> String {
        let time = message.created_at.format("%H:%M");
        if message.system {
            return format!("[{time}] * {}", message.text);
        }

        let author = if message.is_from(&self.user) {
            "you".to_string()
        } else {
            message.user.name.clone()
        };
        let mut line = format!("[{time}] {author}: {}", message.text);
        if let Some(image) = &message.image {
            line.push_str(&format!(" [image {image}]"));
        }
        if let Some(loc) = &message.location {
            line.push_str(&format!(" [location {:.5}, {:.5}]", loc.latitude, loc.longitude));
        }
        line
    }
}

fn state_banner(view: &ChatView) -> Option<String> {
    match view.state {
        SyncState::Uninitialized => None,
        SyncState::Subscribed => Some("-- live --".to_string()),
        SyncState::CacheOnly => Some(match view.cached_at {
            Some(at) => format!(
                "-- offline: showing messages cached {}, composer hidden --",
                at.format("%Y-%m-%d %H:%M")
            ),
            None => "-- offline: composer hidden --".to_string(),
        }),
        SyncState::TornDown => Some("-- chat closed --".to_string()),
    }
}
