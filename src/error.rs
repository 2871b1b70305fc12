//! Error types for telegram-viewer

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned HTTP {0}")]
    Status(u16),

    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error came from talking to the server (as opposed to
    /// understanding what it sent back).
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Status(_) | Error::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
