//! Error types for playback management

use aria_core::types::TrackId;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// The media backend could not prepare a track
    #[error("Track load failed for {track_id}: {reason}")]
    TrackLoadFailed {
        /// Track that failed to load
        track_id: TrackId,
        /// Backend-reported cause
        reason: String,
    },

    /// The player service task has shut down
    #[error("Player service stopped")]
    ServiceStopped,
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
