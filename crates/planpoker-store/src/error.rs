use std::error::Error;

/// Errors that can occur in the store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The path is malformed, or a multi-path update contains
    /// overlapping paths.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The backend could not serve the request.
    #[error("store unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },

    /// The store was shut down with
    /// [`MemoryStore::close`](crate::MemoryStore::close) or the backend's
    /// equivalent.
    #[error("store closed")]
    Closed,
}

impl StoreError {
    /// Construct an unavailable error with no underlying cause.
    pub fn unavailable_msg(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            source: None,
        }
    }
}
