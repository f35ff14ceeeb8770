use serde::{Deserialize, Serialize};

use crate::error::SharedError;
use crate::theme::BackgroundColor;
use crate::types::{ChatUser, UserId};

/// Identity handed from the start screen to a chat session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionParams {
    pub name: String,
    pub color: BackgroundColor,
    pub user_id: UserId,
}

impl SessionParams {
    /// Validate the start-screen input. A missing user id is replaced by a
    /// fresh anonymous one.
    pub fn new(
        name: &str,
        color: BackgroundColor,
        user_id: Option<UserId>,
    ) -> Result<Self, SharedError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SharedError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            color,
            user_id: user_id.unwrap_or_default(),
        })
    }

    /// The author attached to every message this session composes.
    pub fn chat_user(&self) -> ChatUser {
        ChatUser::new(self.user_id.clone(), self.name.clone())
    }
}
