//! Error types for the media library

use thiserror::Error;

/// Result type for library operations
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Library errors
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The media catalog could not be queried
    ///
    /// Callers keep whatever cache state they already had; this is never
    /// fatal.
    #[error("Media catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Snapshot persistence failed
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] aria_storage::StorageError),
}

impl LibraryError {
    /// Create a catalog unavailable error
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::CatalogUnavailable(msg.into())
    }
}
