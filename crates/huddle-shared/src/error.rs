use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Display name must not be empty")]
    EmptyName,

    #[error("Unknown background colour: {0}")]
    UnknownColor(String),
}
