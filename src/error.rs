use thiserror::Error;

/// Faults raised by key-value store adapters.
///
/// These never escape the cache engine: every read degrades to a miss and
/// every write is swallowed after a warning. The variants exist so adapters
/// can report *what* failed in logs, not so callers can branch on them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store command failed: {0}")]
    Command(String),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn command(message: impl Into<String>) -> Self {
        Self::Command(message.into())
    }
}
