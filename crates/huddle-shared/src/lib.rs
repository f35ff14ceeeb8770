//! Types shared by every Huddle crate: the chat message model, session
//! parameters, the background palette and common constants.

pub mod constants;
pub mod error;
pub mod message;
pub mod session;
pub mod theme;
pub mod types;

pub use error::SharedError;
pub use message::{Location, Message, MessageDraft};
pub use session::SessionParams;
pub use theme::BackgroundColor;
pub use types::{ChatUser, MessageId, UserId};
