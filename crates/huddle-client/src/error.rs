use thiserror::Error;

/// Failures reported by a remote document store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Network access is disabled")]
    NetworkDisabled,

    #[error("Remote state lock poisoned")]
    Poisoned,
}

/// Failures surfaced to the caller of a chat session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Composer is hidden while offline")]
    ComposerHidden,

    #[error("Message has no text or attachment")]
    EmptyMessage,

    #[error("Chat session is closed")]
    SessionClosed,

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
}
