use thiserror::Error;

/// Failures while pulling a feed over the network and parsing it.
///
/// These are recoverable: the feed contributes nothing for this attempt and
/// is fetched again on the next load.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Feed parsing failed: {0}")]
    Parse(String),

    #[error("Fetch task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum NewsfeedError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Input validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Network/parse errors
    #[error("Feed fetch failed: {0}")]
    Fetch(#[from] FetchError),

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // User input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl NewsfeedError {
    /// Fetch errors are recoverable; everything else is surfaced to the caller.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, NewsfeedError::Fetch(_))
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            NewsfeedError::Database(_) | NewsfeedError::Serialization(_)
        )
    }
}

pub type NewsfeedResult<T> = Result<T, NewsfeedError>;
