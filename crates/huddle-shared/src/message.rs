//! The chat message model.
//!
//! Field names on the wire follow the chat widget's conventions (`_id`,
//! `createdAt`, `user._id`) so that cached snapshots and remote documents
//! share one JSON shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ChatUser, MessageId};

/// A geographic point attached to a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// A persisted chat message. Immutable once the remote store has assigned
/// its id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: MessageId,
    #[serde(default)]
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub user: ChatUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub system: bool,
}

impl Message {
    /// Materialise a draft with the id the remote store assigned to it.
    pub fn from_draft(id: MessageId, draft: MessageDraft) -> Self {
        Self {
            id,
            text: draft.text,
            created_at: draft.created_at,
            user: draft.user,
            image: draft.image,
            location: draft.location,
            system: draft.system,
        }
    }

    /// Whether the local user authored this message (right-hand bubble).
    pub fn is_from(&self, user: &ChatUser) -> bool {
        self.user.id == user.id
    }
}

/// A message composed locally that has not been written yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageDraft {
    #[serde(default)]
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub user: ChatUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub system: bool,
}

impl MessageDraft {
    /// Plain text message stamped with the current time.
    pub fn text(user: ChatUser, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            created_at: Utc::now(),
            user,
            image: None,
            location: None,
            system: false,
        }
    }

    pub fn with_image(mut self, uri: impl Into<String>) -> Self {
        self.image = Some(uri.into());
        self
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = Some(Location {
            latitude,
            longitude,
        });
        self
    }

    /// A draft is sendable when it carries text or an attachment.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.image.is_none() && self.location.is_none()
    }
}
